//! Named, time-bounded contexts.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

/// A live named context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedContext {
    pub id: String,
    /// `None` never expires.
    pub expiration: Option<Duration>,
    /// Creation or last renewal.
    pub timestamp: DateTime<Utc>,
}

impl NamedContext {
    pub fn new(
        id: impl Into<String>,
        expiration: Option<Duration>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            expiration,
            timestamp,
        }
    }

    /// Not yet past `timestamp + expiration` at `now`. An end beyond the
    /// representable range never comes.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiration {
            None => true,
            Some(expiration) => self
                .timestamp
                .checked_add_signed(expiration)
                .map_or(true, |end| end >= now),
        }
    }
}

/// The set of named contexts, keyed by package-qualified id. Expired entries
/// stay until purged but are never reported live.
#[derive(Debug, Clone, Default)]
pub struct NamedContexts {
    contexts: HashMap<String, NamedContext>,
}

impl NamedContexts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or recreate) a context.
    pub fn create(&mut self, id: &str, expiration: Option<Duration>, now: DateTime<Utc>) {
        self.contexts
            .insert(id.to_string(), NamedContext::new(id, expiration, now));
    }

    /// Reset a context's timestamp. Returns `false` if it does not exist.
    pub fn renew(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        match self.contexts.get_mut(id) {
            Some(context) => {
                context.timestamp = now;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<NamedContext> {
        self.contexts.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&NamedContext> {
        self.contexts.get(id)
    }

    /// Exists and has not expired at `now`.
    pub fn is_live(&self, id: &str, now: DateTime<Utc>) -> bool {
        self.contexts.get(id).is_some_and(|c| c.is_live_at(now))
    }

    /// Ids of all contexts live at `now`, sorted.
    pub fn live_ids(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut ids: Vec<String> = self
            .contexts
            .values()
            .filter(|c| c.is_live_at(now))
            .map(|c| c.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Drop every expired context, returning how many were removed.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.contexts.len();
        self.contexts.retain(|_, c| c.is_live_at(now));
        before - self.contexts.len()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}
