//! Trigger patterns.
//!
//! A trigger is a sequence of literal tokens and parameter markers of the form
//! `<<TYPE$INDEX>>`, e.g. `turn on <<e$0>> light`. Each marker becomes a
//! [`ParameterSlot`] remembering the literal tokens around it; those act as
//! delimiters when a value is captured from an input.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use parley_language::{split_trigger, strip_parameters};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TriggerError;
use crate::types::ParameterKind;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<<([^$<>]*)\$([^$<>]*)>>$").expect("Invalid marker regex"));

/// A declared parameter position inside a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSlot {
    pub kind: ParameterKind,
    pub index: usize,
    /// Token immediately before the marker.
    pub before: Option<String>,
    /// Token immediately after the marker.
    pub after: Option<String>,
}

/// A parsed trigger pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pattern: String,
    tokens: Vec<String>,
    slots: Vec<ParameterSlot>,
    literal: String,
}

impl Trigger {
    /// Parse and validate a pattern.
    ///
    /// Indices must be non-negative integers, unique within the pattern and
    /// together form `0..n` for `n` markers.
    pub fn parse(pattern: &str) -> Result<Self, TriggerError> {
        let tokens = split_trigger(pattern);
        let mut slots = Vec::new();
        let mut seen = BTreeSet::new();

        for (position, token) in tokens.iter().enumerate() {
            if !token.starts_with("<<") {
                continue;
            }
            let caps = MARKER_RE
                .captures(token)
                .ok_or_else(|| TriggerError::Marker(token.clone()))?;
            let index: i64 = caps[2]
                .trim()
                .parse()
                .map_err(|_| TriggerError::InvalidIndex {
                    marker: token.clone(),
                })?;
            let index =
                usize::try_from(index).map_err(|_| TriggerError::NegativeIndex { index })?;
            if !seen.insert(index) {
                return Err(TriggerError::DuplicateIndex { index });
            }

            slots.push(ParameterSlot {
                kind: ParameterKind::from_tag(&caps[1]),
                index,
                before: position.checked_sub(1).map(|p| tokens[p].clone()),
                after: tokens.get(position + 1).cloned(),
            });
        }

        if let Some(missing) = (0..slots.len()).find(|i| !seen.contains(i)) {
            return Err(TriggerError::IndexGap { missing });
        }

        Ok(Self {
            literal: strip_parameters(pattern),
            pattern: pattern.to_string(),
            tokens,
            slots,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// All tokens, parameter markers included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Slots in the order their markers appear.
    pub fn slots(&self) -> &[ParameterSlot] {
        &self.slots
    }

    /// The pattern with every marker removed.
    pub fn literal_text(&self) -> &str {
        &self.literal
    }

    pub fn has_parameters(&self) -> bool {
        !self.slots.is_empty()
    }
}
