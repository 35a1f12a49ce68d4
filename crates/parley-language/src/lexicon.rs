//! Dictionary-backed language.
//!
//! Words are looked up case-insensitively in an in-memory lexicon that maps
//! each form to its normal form, part of speech and synonyms. Lexicons can be
//! built in code or loaded from TOML:
//!
//! ```toml
//! name = "household"
//! locale = "en"
//!
//! [[word]]
//! form = "lamps"
//! normal = "lamp"
//! pos = "noun"
//! synonyms = ["light", "bulb"]
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::error::LanguageError;
use crate::language::Language;
use crate::objects::{SentenceObject, SentenceObjects};
use crate::sentence::Sentence;
use crate::word::Word;

/// Parts of speech known to the lexicon. Their codes are the word type codes
/// this language reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Other,
}

impl PartOfSpeech {
    pub fn code(self) -> i32 {
        match self {
            PartOfSpeech::Noun => 1,
            PartOfSpeech::Verb => 2,
            PartOfSpeech::Adjective => 3,
            PartOfSpeech::Adverb => 4,
            PartOfSpeech::Other => 5,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(PartOfSpeech::Noun),
            2 => Some(PartOfSpeech::Verb),
            3 => Some(PartOfSpeech::Adjective),
            4 => Some(PartOfSpeech::Adverb),
            5 => Some(PartOfSpeech::Other),
            _ => None,
        }
    }

    fn is_modifier(self) -> bool {
        matches!(self, PartOfSpeech::Adjective | PartOfSpeech::Adverb)
    }
}

/// A lexicon record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub form: String,
    /// Base form; the lowercased form when absent.
    #[serde(default)]
    pub normal: Option<String>,
    pub pos: PartOfSpeech,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

impl LexiconEntry {
    pub fn new(form: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            form: form.into(),
            normal: None,
            pos,
            synonyms: Vec::new(),
        }
    }

    pub fn normal(mut self, normal: impl Into<String>) -> Self {
        self.normal = Some(normal.into());
        self
    }

    pub fn synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default, rename = "word")]
    words: Vec<LexiconEntry>,
}

/// Language backed by a fixed lexicon.
#[derive(Debug, Clone)]
pub struct LexiconLanguage {
    name: String,
    locale: String,
    entries: HashMap<String, LexiconEntry>,
}

impl LexiconLanguage {
    pub fn new(name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locale: locale.into(),
            entries: HashMap::new(),
        }
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, entry: LexiconEntry) -> Result<(), LanguageError> {
        let key = entry.form.trim().to_lowercase();
        if key.is_empty() {
            return Err(LanguageError::EmptyForm);
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn with_entry(mut self, entry: LexiconEntry) -> Result<Self, LanguageError> {
        self.insert(entry)?;
        Ok(self)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LanguageError> {
        let file: LexiconFile = toml::from_str(content)?;
        let mut language = Self::new(
            file.name.unwrap_or_else(|| "parley.lexicon".to_string()),
            file.locale.unwrap_or_else(|| "en".to_string()),
        );
        for entry in file.words {
            language.insert(entry)?;
        }
        Ok(language)
    }

    /// Load a lexicon from a TOML file.
    pub fn load(path: &Path) -> Result<Self, LanguageError> {
        let content = std::fs::read_to_string(path)?;
        let language = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            entries = language.len(),
            "Lexicon loaded"
        );
        Ok(language)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Language for LexiconLanguage {
    fn name(&self) -> &str {
        &self.name
    }

    fn locale(&self) -> &str {
        &self.locale
    }

    fn word(&self, literal: &str) -> Word {
        match self.entries.get(&literal.to_lowercase()) {
            Some(entry) => Word::new(
                literal,
                entry
                    .normal
                    .clone()
                    .unwrap_or_else(|| entry.form.to_lowercase()),
                entry.pos.code(),
                entry.synonyms.clone(),
            ),
            None => {
                trace!(word = literal, "Word not in lexicon");
                Word::unknown(literal)
            }
        }
    }

    /// Nouns become objects, qualified by a directly preceding adjective or
    /// adverb; a sentence-initial noun is the subject. Verbs are agent
    /// actions, remaining modifiers are manners, everything else is other.
    fn sentence_objects(&self, sentence: &Sentence) -> SentenceObjects {
        let words = sentence.words();
        let pos: Vec<Option<PartOfSpeech>> = words
            .iter()
            .map(|w| PartOfSpeech::from_code(w.kind))
            .collect();
        let mut used = vec![false; words.len()];
        let mut objects = SentenceObjects::default();

        for i in 0..words.len() {
            if pos[i] != Some(PartOfSpeech::Noun) {
                continue;
            }
            if i == 0 {
                objects.subjects.push(SentenceObject::new(words[i].clone()));
            } else if !used[i - 1] && pos[i - 1].is_some_and(PartOfSpeech::is_modifier) {
                objects.objects.push(SentenceObject::compound(
                    words[i].clone(),
                    words[i - 1].clone(),
                ));
                used[i - 1] = true;
            } else {
                objects.objects.push(SentenceObject::new(words[i].clone()));
            }
            used[i] = true;
        }

        for (i, word) in words.iter().enumerate() {
            if used[i] {
                continue;
            }
            let object = SentenceObject::new(word.clone());
            match pos[i] {
                Some(p) if p.is_modifier() => objects.manners.push(object),
                Some(PartOfSpeech::Verb) => objects.agent_actions.push(object),
                _ => objects.others.push(object),
            }
        }

        objects
    }
}
