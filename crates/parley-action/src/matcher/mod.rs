//! Candidate scoring and ranking.
//!
//! Every candidate accumulates a raw score and the maximum it could have
//! reached, term by term; the normalized score is their ratio. The terms are:
//!
//! - length: token count agreement between input and trigger
//! - categories: per-bucket word comparison of input and trigger
//! - parameters: how many slots could be captured (only for promising
//!   candidates)
//! - context continuity: a bonus for following the previous execution's
//!   context or package, scaled by its age

mod compare;
mod extract;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parley_core::WeightSet;
use parley_language::{Analysis, Category, Language};
use tracing::{debug, trace};

use crate::action::Action;
use crate::context::{ContextStack, StackEntry};
use crate::types::Parameter;

use compare::compare_buckets;

/// A scored, parameter-bound candidate.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub action: Arc<Action>,
    /// Normalized score in `0.0..=1.0`.
    pub score: f32,
    /// Captured values sorted by slot index.
    pub parameters: Vec<Parameter>,
}

/// Running score and achievable maximum.
#[derive(Debug, Default, Clone, Copy)]
struct Tally {
    score: f32,
    max: f32,
}

impl Tally {
    fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.score / self.max
        } else {
            0.0
        }
    }
}

/// Scores actions against analyzed input. Holds no state of its own; the
/// context stack it reads is passed in per call.
pub struct Matcher<'a> {
    language: &'a dyn Language,
    weights: &'a WeightSet,
    parameter_threshold: f32,
}

impl<'a> Matcher<'a> {
    pub fn new(language: &'a dyn Language, weights: &'a WeightSet) -> Self {
        Self {
            language,
            weights,
            parameter_threshold: 0.3,
        }
    }

    /// Running ratio a candidate must exceed before parameters are extracted.
    pub fn with_parameter_threshold(mut self, threshold: f32) -> Self {
        self.parameter_threshold = threshold;
        self
    }

    /// Score every candidate and keep those at or above `threshold`.
    /// The result is in candidate order, not sorted by score.
    pub fn rank(
        &self,
        input: &Analysis,
        candidates: &[Arc<Action>],
        stack: &ContextStack,
        threshold: f32,
        now: DateTime<Utc>,
    ) -> Vec<MatchResult> {
        let previous = stack.latest();
        let matches: Vec<MatchResult> = candidates
            .iter()
            .map(|action| self.score(input, action, previous, now))
            .filter(|m| m.score >= threshold)
            .collect();
        debug!(
            candidates = candidates.len(),
            matches = matches.len(),
            threshold,
            "Candidates ranked"
        );
        matches
    }

    /// Score one candidate. `previous` is the most recent execution record.
    pub fn score(
        &self,
        input: &Analysis,
        action: &Arc<Action>,
        previous: Option<&StackEntry>,
        now: DateTime<Utc>,
    ) -> MatchResult {
        let mut tally = Tally::default();

        self.length_term(input, action, &mut tally);
        self.category_terms(input, action, &mut tally);

        let parameters = if tally.ratio() > self.parameter_threshold {
            self.parameter_term(input, action, &mut tally)
        } else {
            trace!(action = %action.name(), ratio = tally.ratio(), "Parameter extraction skipped");
            Vec::new()
        };

        if let Some(previous) = previous {
            self.context_term(previous, action, now, &mut tally);
        }

        let score = tally.ratio();
        debug!(
            action = %action.name(),
            score,
            raw = tally.score,
            max = tally.max,
            parameters = parameters.len(),
            "Candidate scored"
        );
        MatchResult {
            action: Arc::clone(action),
            score,
            parameters,
        }
    }

    fn length_term(&self, input: &Analysis, action: &Action, tally: &mut Tally) {
        let count = input.sentence.len();
        let delta = count.abs_diff(action.trigger().tokens().len());
        let weight = self.weights.length;

        tally.max += count as f32 * weight;
        if delta <= count {
            tally.score += (count - delta) as f32 * weight;
        }
        trace!(action = %action.name(), count, delta, "Length term");
    }

    fn category_terms(&self, input: &Analysis, action: &Action, tally: &mut Tally) {
        let trigger = action.trigger_analysis(self.language);
        let mut achievable = 0.0;
        let mut fallback = 0.0;

        for category in Category::ALL {
            let elements = input.objects.bucket(category);
            let targets = trigger.objects.bucket(category);
            if elements.is_empty() && targets.is_empty() {
                continue;
            }
            let weight = self.category_weight(category);
            let (score, max) = compare_buckets(self.weights, elements, targets);
            tally.score += weight * score;
            achievable += weight * max;
            fallback += self.weights.empty_category_fallback
                * weight
                * (elements.len() + targets.len()) as f32;
            trace!(action = %action.name(), %category, score, max, "Category term");
        }

        tally.max += if achievable > 0.0 { achievable } else { fallback };
    }

    fn parameter_term(
        &self,
        input: &Analysis,
        action: &Action,
        tally: &mut Tally,
    ) -> Vec<Parameter> {
        let slots = action.trigger().slots();
        if slots.is_empty() {
            return Vec::new();
        }
        let parameters = extract::extract(&input.sentence, slots, self.language);
        let weight = self.weights.parameter_count;
        tally.max += slots.len() as f32 * weight;
        tally.score += parameters.len() as f32 * weight;
        trace!(
            action = %action.name(),
            slots = slots.len(),
            filled = parameters.len(),
            "Parameter term"
        );
        parameters
    }

    fn context_term(
        &self,
        previous: &StackEntry,
        action: &Action,
        now: DateTime<Utc>,
        tally: &mut Tally,
    ) {
        let multiplier = self
            .weights
            .age_multiplier(previous.age(now).num_milliseconds());
        let same_context = matches!(
            (previous.action.role().context(), action.role().context()),
            (Some(a), Some(b)) if !a.is_empty() && a == b
        );

        let bonus = if same_context {
            multiplier * self.weights.context_same_context
        } else if previous.action.same_package(action) {
            multiplier * self.weights.context_same_package
        } else {
            0.0
        };
        tally.score += bonus;
        tally.max += bonus;
        trace!(action = %action.name(), same_context, bonus, "Context term");
    }

    fn category_weight(&self, category: Category) -> f32 {
        match category {
            Category::AgentAction => self.weights.agent_action,
            Category::Object => self.weights.object,
            Category::Subject => self.weights.subject,
            Category::Manner => self.weights.manner,
            Category::Other => self.weights.other,
        }
    }
}
