//! Coefficients of the ranking formula.

use serde::{Deserialize, Serialize};

/// Tunable weights for every term the matcher accumulates.
///
/// Word weights apply per compared word pair; category weights scale the
/// per-bucket sums; the context weights are multiplied by an age factor
/// taken from the `age_*` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightSet {
    /// Both words share the same normalized form.
    pub word_same: f32,
    /// Both words are literally identical.
    pub word_exact: f32,
    /// One word lists the other as a synonym.
    pub word_synonym: f32,
    pub main_word_multiplier: f32,
    pub compound_word_multiplier: f32,

    pub agent_action: f32,
    pub subject: f32,
    pub object: f32,
    pub manner: f32,
    pub other: f32,

    /// Token count agreement between input and trigger.
    pub length: f32,
    /// Per declared parameter slot.
    pub parameter_count: f32,

    pub context_same_package: f32,
    pub context_same_context: f32,

    /// Previous execution younger than 10 seconds.
    pub age_immediate: f32,
    /// Younger than a minute.
    pub age_current: f32,
    /// Younger than five minutes.
    pub age_recent: f32,
    pub age_outdated: f32,

    /// Fraction of a category weight credited per item when no category
    /// yields any achievable maximum.
    pub empty_category_fallback: f32,
    /// Maximum added for a trigger item nothing in the input matches.
    pub unmatched_target: f32,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            word_same: 3.0,
            word_exact: 2.0,
            word_synonym: 3.0,
            main_word_multiplier: 2.0,
            compound_word_multiplier: 1.0,
            agent_action: 5.0,
            subject: 3.0,
            object: 3.0,
            manner: 5.0,
            other: 1.0,
            length: 3.0,
            parameter_count: 10.0,
            context_same_package: 3.0,
            context_same_context: 7.0,
            age_immediate: 3.0,
            age_current: 2.0,
            age_recent: 1.0,
            age_outdated: 0.5,
            empty_category_fallback: 0.5,
            unmatched_target: 1.0,
        }
    }
}

impl WeightSet {
    /// Age factor for a previous execution that happened `age_millis` ago.
    pub fn age_multiplier(&self, age_millis: i64) -> f32 {
        match age_millis {
            a if a < 10_000 => self.age_immediate,
            a if a < 60_000 => self.age_current,
            a if a < 300_000 => self.age_recent,
            _ => self.age_outdated,
        }
    }
}
