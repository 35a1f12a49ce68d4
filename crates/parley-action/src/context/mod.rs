//! Conversational context.
//!
//! Two pieces of state survive between executions: the bounded stack of
//! execution records and the set of named contexts that gate dependent
//! actions. Both live in one [`ContextState`] so a single lock guards them.

mod named;
mod stack;

pub use named::{NamedContext, NamedContexts};
pub use stack::{ContextStack, StackEntry};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::action::{Action, ContextRole};
use crate::types::{ActionResult, Outcome};

/// The full, unfiltered context state owned by the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ContextState {
    pub stack: ContextStack,
    pub contexts: NamedContexts,
}

impl ContextState {
    pub fn new(capacity: usize) -> Self {
        Self {
            stack: ContextStack::new(capacity),
            contexts: NamedContexts::new(),
        }
    }

    /// Apply an execution's effect on the named contexts.
    pub fn reconcile(&mut self, action: &Action, result: &ActionResult, now: DateTime<Utc>) {
        match action.role() {
            ContextRole::Constructs {
                context,
                expiration,
            } if result.outcome == Outcome::CreateContext => {
                self.contexts.create(context, *expiration, now);
                debug!(context = %context, action = %action.name(), "Context created");
            }
            ContextRole::Depends { context } => {
                if self.contexts.renew(context, now) {
                    debug!(context = %context, "Context renewed");
                } else {
                    debug!(context = %context, "Renewal skipped, context is gone");
                }
            }
            ContextRole::Destroys { context } if result.outcome == Outcome::DestroyContext => {
                self.contexts.remove(context);
                debug!(context = %context, action = %action.name(), "Context destroyed");
            }
            _ => {}
        }

        let purged = self.contexts.purge_expired(now);
        if purged > 0 {
            debug!(purged, "Expired contexts purged");
        }
    }

    pub fn record(&mut self, entry: StackEntry) {
        self.stack.push(entry);
    }

    /// Replace the stack with an empty one of the new capacity.
    pub fn resize(&mut self, capacity: usize) {
        self.stack = ContextStack::new(capacity);
    }
}
