//! Replaceable steps of an execution.
//!
//! The orchestrator calls these in order: `arrange` the raw matches,
//! `select` one of them, `run` its handler and `review` the result before
//! contexts are reconciled. Every method has a default, so an implementation
//! only overrides the steps it cares about.

use parley_language::Sentence;

use crate::environment::Environment;
use crate::matcher::MatchResult;
use crate::types::ActionResult;

pub trait ExecutionHooks: Send + Sync {
    /// Reorder or filter the matches. Default: descending by score, ties in
    /// registration order.
    fn arrange(&self, mut matches: Vec<MatchResult>) -> Vec<MatchResult> {
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches
    }

    /// Pick the match to execute. Default: the first one.
    fn select(&self, matches: Vec<MatchResult>) -> Option<MatchResult> {
        matches.into_iter().next()
    }

    /// Invoke the selected action. Default: call its handler.
    fn run(&self, selected: &MatchResult, env: &Environment, sentence: &Sentence) -> ActionResult {
        selected
            .action
            .handler()
            .handle(env, sentence, &selected.parameters)
    }

    /// Post-process the handler's result. Default: unchanged.
    fn review(&self, _selected: &MatchResult, result: ActionResult) -> ActionResult {
        result
    }
}

/// Uses every default.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl ExecutionHooks for DefaultHooks {}
