//! Lexical records for single words.

use serde::{Deserialize, Serialize};

/// Type code for words a language could not classify.
pub const NOT_FOUND: i32 = -1;

/// One analyzed word: the form as typed, its normalized (base) form, a
/// language-specific type code and its synonyms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub typed_form: String,
    pub normal_form: String,
    pub kind: i32,
    pub synonyms: Vec<String>,
}

impl Word {
    pub fn new(
        typed_form: impl Into<String>,
        normal_form: impl Into<String>,
        kind: i32,
        synonyms: Vec<String>,
    ) -> Self {
        Self {
            typed_form: typed_form.into(),
            normal_form: normal_form.into(),
            kind,
            synonyms,
        }
    }

    /// Record for a word no dictionary knows: normal form equals the typed
    /// form, type is [`NOT_FOUND`], no synonyms.
    pub fn unknown(typed_form: impl Into<String>) -> Self {
        let typed_form = typed_form.into();
        Self {
            normal_form: typed_form.clone(),
            typed_form,
            kind: NOT_FOUND,
            synonyms: Vec::new(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.kind != NOT_FOUND
    }

    /// Literal equality of the typed forms.
    pub fn equals_exact(&self, other: &Word) -> bool {
        self.typed_form == other.typed_form
    }

    /// Case-insensitive equality of the normal forms.
    pub fn equals_normal_form(&self, other: &Word) -> bool {
        same_ignoring_case(&self.normal_form, &other.normal_form)
    }

    /// True when either word lists the other's normal form as a synonym.
    pub fn equals_synonym(&self, other: &Word) -> bool {
        other
            .synonyms
            .iter()
            .any(|s| same_ignoring_case(s, &self.normal_form))
            || self
                .synonyms
                .iter()
                .any(|s| same_ignoring_case(s, &other.normal_form))
    }
}

fn same_ignoring_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
