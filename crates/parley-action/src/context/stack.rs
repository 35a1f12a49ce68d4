//! The bounded log of executed actions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::action::Action;
use crate::types::{ActionResult, Visibility};

/// One execution record.
#[derive(Debug, Clone)]
pub struct StackEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub action: Arc<Action>,
    /// Raw input, or the reduced form in a projection.
    pub input: String,
    pub result: ActionResult,
}

impl StackEntry {
    pub fn new(
        action: Arc<Action>,
        input: impl Into<String>,
        result: ActionResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            action,
            input: input.into(),
            result,
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }
}

/// Execution records ordered youngest first, holding at most `capacity`.
#[derive(Debug, Clone)]
pub struct ContextStack {
    entries: Vec<StackEntry>,
    capacity: usize,
}

impl ContextStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.min(64)),
            capacity,
        }
    }

    /// Add an entry, then restore age order and evict the oldest overflow.
    pub fn push(&mut self, entry: StackEntry) {
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        if self.entries.len() > self.capacity {
            let evicted = self.entries.len() - self.capacity;
            self.entries.truncate(self.capacity);
            tracing::trace!(evicted, capacity = self.capacity, "Context stack truncated");
        }
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&StackEntry> {
        self.entries.first()
    }

    pub fn entries(&self) -> &[StackEntry] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The view a handler of `package` is allowed to see.
    ///
    /// Private entries are dropped, package-scoped entries survive only for
    /// their own package, and entries public without parameters carry the
    /// trigger's literal text instead of the raw input.
    pub fn project(&self, package: &str) -> ContextStack {
        let entries = self
            .entries
            .iter()
            .filter_map(|entry| match entry.action.visibility() {
                Visibility::Public => Some(entry.clone()),
                Visibility::Private => None,
                Visibility::Package => {
                    (entry.action.package().name == package).then(|| entry.clone())
                }
                Visibility::PublicWithoutParameters => Some(StackEntry {
                    input: entry.action.trigger().literal_text().to_string(),
                    ..entry.clone()
                }),
            })
            .collect();
        ContextStack {
            entries,
            capacity: self.capacity,
        }
    }
}

impl Default for ContextStack {
    fn default() -> Self {
        Self::new(30)
    }
}
