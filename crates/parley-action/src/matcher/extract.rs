//! Parameter capture from raw input.
//!
//! Each slot is located through the literal tokens around its marker. A
//! literal token match is tried first; if it yields nothing, the input's
//! words are scanned for synonyms of the delimiter. A slot whose capture
//! trims to nothing stays unfilled.

use parley_language::{Language, Sentence, Word};

use crate::trigger::ParameterSlot;
use crate::types::Parameter;

/// Capture every slot that can be filled, sorted by slot index.
pub(crate) fn extract(
    sentence: &Sentence,
    slots: &[ParameterSlot],
    language: &dyn Language,
) -> Vec<Parameter> {
    let mut parameters: Vec<Parameter> = slots
        .iter()
        .filter_map(|slot| {
            capture(sentence, slot, language).map(|value| Parameter {
                kind: slot.kind,
                index: slot.index,
                value: value.to_string(),
            })
        })
        .collect();
    parameters.sort_by_key(|p| p.index);
    parameters
}

fn capture<'s>(
    sentence: &'s Sentence,
    slot: &ParameterSlot,
    language: &dyn Language,
) -> Option<&'s str> {
    match (slot.before.as_deref(), slot.after.as_deref()) {
        (None, None) => sentence.excerpt(0, sentence.text().len()),
        (None, Some(after)) => leading(sentence, after, language),
        (Some(before), None) => trailing(sentence, before, language),
        (Some(before), Some(after)) => between(sentence, before, after, language),
    }
}

/// Text from the start up to the first occurrence of `after`.
fn leading<'s>(sentence: &'s Sentence, after: &str, language: &dyn Language) -> Option<&'s str> {
    let tokens = sentence.tokens();
    let up_to = |k: usize| sentence.excerpt(0, tokens[k].start);

    if let Some(found) = sentence.position_of(after, 1).and_then(up_to) {
        return Some(found);
    }
    let delimiter = language.word(after);
    let found = synonym_positions(sentence, &delimiter, 1).find_map(up_to);
    found
}

/// Text after the first occurrence of `before` to the end.
fn trailing<'s>(sentence: &'s Sentence, before: &str, language: &dyn Language) -> Option<&'s str> {
    let tokens = sentence.tokens();
    let text_len = sentence.text().len();
    let from = |k: usize| sentence.excerpt(tokens[k].end, text_len);

    if let Some(found) = sentence.position_of(before, 0).and_then(from) {
        return Some(found);
    }
    let delimiter = language.word(before);
    let found = synonym_positions(sentence, &delimiter, 0).find_map(from);
    found
}

/// Text between an occurrence of `before` and the next following `after`.
fn between<'s>(
    sentence: &'s Sentence,
    before: &str,
    after: &str,
    language: &dyn Language,
) -> Option<&'s str> {
    let tokens = sentence.tokens();
    let span = |b: usize, a: usize| sentence.excerpt(tokens[b].end, tokens[a].start);

    let literal = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.text == before)
        .find_map(|(b, _)| {
            sentence
                .position_of(after, b + 1)
                .and_then(|a| span(b, a))
        });
    if literal.is_some() {
        return literal;
    }

    let before_word = language.word(before);
    let after_word = language.word(after);
    let found = synonym_positions(sentence, &before_word, 0).find_map(|b| {
        synonym_positions(sentence, &after_word, b + 1).find_map(|a| span(b, a))
    });
    found
}

/// Positions at or after `offset` whose word is a synonym of `delimiter`.
fn synonym_positions<'a>(
    sentence: &'a Sentence,
    delimiter: &'a Word,
    offset: usize,
) -> impl Iterator<Item = usize> + 'a {
    sentence
        .words()
        .iter()
        .enumerate()
        .skip(offset)
        .take(sentence.tokens().len().saturating_sub(offset))
        .filter(move |(_, w)| w.equals_synonym(delimiter))
        .map(|(k, _)| k)
}
