//! Error types for the action engine.

use parley_core::error::ParleyError;

/// Malformed trigger patterns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("Malformed parameter marker: {0}")]
    Marker(String),
    #[error("Parameter index is not a number in {marker}")]
    InvalidIndex { marker: String },
    #[error("Parameter index {index} is negative")]
    NegativeIndex { index: i64 },
    #[error("Parameter index {index} is used more than once")]
    DuplicateIndex { index: usize },
    #[error("Parameter indices must be contiguous from 0; {missing} is missing")]
    IndexGap { missing: usize },
}

/// Definition-time failures while building actions.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Invalid trigger for {action}: {source}")]
    Trigger {
        action: String,
        #[source]
        source: TriggerError,
    },
    #[error("Action {0} has no handler")]
    MissingHandler(String),
    #[error("Action {0} has no trigger")]
    MissingTrigger(String),
    #[error("Action {action} declares {count} triggers; use build_all")]
    AmbiguousTrigger { action: String, count: usize },
}

/// Failures of the capabilities handed to handlers.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("Capability not supported: {0}")]
    Unsupported(&'static str),
    #[error("Visual output failed: {0}")]
    Visual(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the execution entry points.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Synchronous execution called on the orchestrator's home thread")]
    HomeThread,
    #[error("Context state lock poisoned")]
    StatePoisoned,
    #[error("Failed to spawn execution thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("Execution task failed: {0}")]
    Join(String),
}

impl From<ActionError> for ParleyError {
    fn from(err: ActionError) -> Self {
        ParleyError::Definition(err.to_string())
    }
}

impl From<ExecutionError> for ParleyError {
    fn from(err: ExecutionError) -> Self {
        ParleyError::Execution(err.to_string())
    }
}
