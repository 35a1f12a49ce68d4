//! Core value objects for the action engine.
//!
//! Visibility levels, parameter kinds, bound parameters and handler results.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enums
// =============================================================================

/// Which packages may observe an action's context-stack entries, and how.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to every package as recorded.
    #[default]
    Public,
    /// Visible to every package, with the input reduced to the trigger's
    /// literal words.
    PublicWithoutParameters,
    /// Never visible through a projection.
    Private,
    /// Visible only to the owning package.
    Package,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::PublicWithoutParameters => write!(f, "public_without_parameters"),
            Visibility::Private => write!(f, "private"),
            Visibility::Package => write!(f, "package"),
        }
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "public_without_parameters" => Ok(Visibility::PublicWithoutParameters),
            "private" => Ok(Visibility::Private),
            "package" => Ok(Visibility::Package),
            _ => Err(format!("Unknown visibility: {}", s)),
        }
    }
}

/// Type of value a parameter slot captures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Free text.
    #[default]
    Expression,
}

impl ParameterKind {
    /// Resolve a marker tag. Unknown tags fall back to [`ParameterKind::Expression`].
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "e" | "expression" => ParameterKind::Expression,
            other => {
                tracing::debug!(tag = other, "Unknown parameter tag, using expression");
                ParameterKind::Expression
            }
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Expression => write!(f, "expression"),
        }
    }
}

/// Outcome vocabulary of a handler result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    /// Work continues in the background.
    Pending,
    Failure,
    MissingInput,
    MissingFunctionality,
    InternalError,
    /// Ask the orchestrator to bring the action's context into existence.
    CreateContext,
    /// Ask the orchestrator to remove the action's context.
    DestroyContext,
    Other,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "success"),
            Outcome::Pending => write!(f, "pending"),
            Outcome::Failure => write!(f, "failure"),
            Outcome::MissingInput => write!(f, "missing_input"),
            Outcome::MissingFunctionality => write!(f, "missing_functionality"),
            Outcome::InternalError => write!(f, "internal_error"),
            Outcome::CreateContext => write!(f, "create_context"),
            Outcome::DestroyContext => write!(f, "destroy_context"),
            Outcome::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Outcome::Success),
            "pending" => Ok(Outcome::Pending),
            "failure" => Ok(Outcome::Failure),
            "missing_input" => Ok(Outcome::MissingInput),
            "missing_functionality" => Ok(Outcome::MissingFunctionality),
            "internal_error" => Ok(Outcome::InternalError),
            "create_context" => Ok(Outcome::CreateContext),
            "destroy_context" => Ok(Outcome::DestroyContext),
            "other" => Ok(Outcome::Other),
            _ => Err(format!("Unknown outcome: {}", s)),
        }
    }
}

// =============================================================================
// Value objects
// =============================================================================

/// What a handler reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub outcome: Outcome,
    pub message: Option<String>,
}

impl ActionResult {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            message: None,
        }
    }

    pub fn with_message(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: Some(message.into()),
        }
    }

    pub fn success() -> Self {
        Self::new(Outcome::Success)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::with_message(Outcome::Failure, message)
    }
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.outcome, message),
            None => write!(f, "{}", self.outcome),
        }
    }
}

/// A value captured from one input for one parameter slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub kind: ParameterKind,
    pub index: usize,
    pub value: String,
}
