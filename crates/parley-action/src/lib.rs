//! Action engine for Parley.
//!
//! Matches free-text input against registered action triggers, extracts
//! parameters, executes the best candidate and tracks conversational context
//! across executions.

pub mod action;
pub mod context;
pub mod environment;
pub mod error;
pub mod hooks;
pub mod matcher;
pub mod orchestrator;
pub mod registry;
pub mod trigger;
pub mod types;

pub use action::{Action, ActionBuilder, ActionBundle, ActionHandler, ActionPackage, ContextRole};
pub use context::{ContextStack, ContextState, NamedContext, NamedContexts, StackEntry};
pub use environment::{
    Environment, Preferences, RecordingEnvironment, SystemEnvironment, SystemProperties,
    VisualOutput,
};
pub use error::{ActionError, EnvironmentError, ExecutionError, TriggerError};
pub use hooks::{DefaultHooks, ExecutionHooks};
pub use matcher::{MatchResult, Matcher};
pub use orchestrator::{ExecutionRequest, Orchestrator};
pub use registry::ActionRegistry;
pub use trigger::{ParameterSlot, Trigger};
pub use types::{ActionResult, Outcome, Parameter, ParameterKind, Visibility};
