//! Sentences, tokens and the tokenization rules shared by inputs and triggers.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::word::Word;

// =============================================================================
// Tokenization
// =============================================================================

/// Characters dropped from tokens before they are compared.
const FORBIDDEN_CHARS: &[char] = &[
    '!', '"', '§', '%', '&', '/', '(', ')', '=', '?', '²', '³', '{', '[', ']', '}', '\\', '*',
    '+', '~', '#', '|', '°', '^',
];

/// Characters that only have meaning inside a parameter marker.
const PARAMETER_CHARS: &[char] = &['<', '$', '>'];

/// A token is a maximal run of characters that are neither whitespace nor
/// one of `. , ; :`.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s.,;:]+").expect("Invalid token regex"));

static PARAMETER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<[^<>]*>>").expect("Invalid parameter regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("Invalid whitespace regex"));

/// One token of an input text together with its byte span in that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Split user input into comparable tokens.
///
/// Forbidden and parameter characters are removed from each token; tokens
/// that end up empty are dropped. Spans still refer to the raw text.
pub fn tokenize(text: &str) -> Vec<Token> {
    TOKEN_RE
        .find_iter(text)
        .filter_map(|m| {
            let cleaned: String = m
                .as_str()
                .chars()
                .filter(|c| !FORBIDDEN_CHARS.contains(c) && !PARAMETER_CHARS.contains(c))
                .collect();
            (!cleaned.is_empty()).then(|| Token {
                text: cleaned,
                start: m.start(),
                end: m.end(),
            })
        })
        .collect()
}

/// Split a trigger pattern into tokens, keeping parameter markers such as
/// `<<e$0>>` intact.
pub fn split_trigger(pattern: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(pattern)
        .map(|m| {
            m.as_str()
                .chars()
                .filter(|c| !FORBIDDEN_CHARS.contains(c))
                .collect::<String>()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

/// Remove every `<<...>>` marker and collapse the whitespace left behind.
pub fn strip_parameters(text: &str) -> String {
    let without = PARAMETER_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(&without, " ").trim().to_string()
}

// =============================================================================
// Sentence
// =============================================================================

/// Grammatical mood of a sentence, derived from its final character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentenceKind {
    #[default]
    Statement,
    Question,
    Command,
}

impl SentenceKind {
    pub fn classify(text: &str) -> Self {
        let trimmed = text.trim_end();
        if trimmed.ends_with('?') {
            SentenceKind::Question
        } else if trimmed.ends_with('!') {
            SentenceKind::Command
        } else {
            SentenceKind::Statement
        }
    }
}

impl fmt::Display for SentenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentenceKind::Statement => write!(f, "statement"),
            SentenceKind::Question => write!(f, "question"),
            SentenceKind::Command => write!(f, "command"),
        }
    }
}

/// An analyzed piece of text: the raw text, its tokens, its kind and one
/// lexical record per token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    text: String,
    tokens: Vec<Token>,
    kind: SentenceKind,
    words: Vec<Word>,
}

impl Sentence {
    /// Tokenize `text` and attach an unknown-word record to every token.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let tokens = tokenize(&text);
        let words = tokens.iter().map(|t| Word::unknown(t.text.as_str())).collect();
        Self {
            kind: SentenceKind::classify(&text),
            text,
            tokens,
            words,
        }
    }

    /// Replace the lexical records. `words` should hold one entry per token.
    pub fn with_words(mut self, words: Vec<Word>) -> Self {
        if words.len() != self.tokens.len() {
            tracing::warn!(
                tokens = self.tokens.len(),
                words = words.len(),
                "Word list does not line up with tokens"
            );
        }
        self.words = words;
        self
    }

    pub fn with_kind(mut self, kind: SentenceKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn kind(&self) -> SentenceKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Position of the first token at or after `offset` that equals `literal`.
    pub fn position_of(&self, literal: &str, offset: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(offset)
            .find(|(_, t)| t.text == literal)
            .map(|(i, _)| i)
    }

    /// Trimmed raw text between two byte offsets, `None` when nothing is left.
    pub fn excerpt(&self, start: usize, end: usize) -> Option<&str> {
        let slice = self.text.get(start..end)?.trim();
        (!slice.is_empty()).then_some(slice)
    }
}
