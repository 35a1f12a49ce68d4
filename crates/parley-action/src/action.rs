//! Actions, their owning packages and the handler contract.

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::Duration;
use parley_language::{Analysis, Language, Sentence};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::error::ActionError;
use crate::trigger::Trigger;
use crate::types::{ActionResult, Parameter, Visibility};

// =============================================================================
// Packages
// =============================================================================

/// A named group of actions shipped together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPackage {
    pub name: String,
    pub description: String,
    pub locale: String,
    /// Lowest library version code the package works with.
    pub min_library_version: u32,
}

impl ActionPackage {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            locale: "en".to_string(),
            min_library_version: 1,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_min_library_version(mut self, version: u32) -> Self {
        self.min_library_version = version;
        self
    }

    /// Package-qualified context id.
    pub fn context_id(&self, id: &str) -> String {
        format!("{}#{}", self.name, id)
    }
}

/// A source of actions for one package, the unit the registry loads.
pub trait ActionBundle: Send + Sync {
    fn package(&self) -> Arc<ActionPackage>;

    /// Build the package's actions. The language is the one the orchestrator
    /// analyzes input with, for bundles that tailor triggers to it.
    fn actions(&self, language: &dyn Language) -> Result<Vec<Action>, ActionError>;
}

// =============================================================================
// Handlers
// =============================================================================

/// Executes an action once it has been selected.
pub trait ActionHandler: Send + Sync {
    fn handle(&self, env: &Environment, sentence: &Sentence, parameters: &[Parameter])
        -> ActionResult;
}

impl<F> ActionHandler for F
where
    F: Fn(&Environment, &Sentence, &[Parameter]) -> ActionResult + Send + Sync,
{
    fn handle(
        &self,
        env: &Environment,
        sentence: &Sentence,
        parameters: &[Parameter],
    ) -> ActionResult {
        self(env, sentence, parameters)
    }
}

// =============================================================================
// Actions
// =============================================================================

/// How an action relates to named contexts. Ids are package-qualified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContextRole {
    #[default]
    None,
    /// May create `context` by returning [`crate::Outcome::CreateContext`].
    /// `expiration` of `None` never expires.
    Constructs {
        context: String,
        expiration: Option<Duration>,
    },
    /// Eligible only while `context` is live; renews it when executed.
    Depends { context: String },
    /// Eligible only while `context` is live; may remove it by returning
    /// [`crate::Outcome::DestroyContext`].
    Destroys { context: String },
}

impl ContextRole {
    /// The context this action constructs or depends on.
    pub fn context(&self) -> Option<&str> {
        match self {
            ContextRole::None => None,
            ContextRole::Constructs { context, .. }
            | ContextRole::Depends { context }
            | ContextRole::Destroys { context } => Some(context),
        }
    }

    /// The context that must be live for the action to be eligible.
    pub fn required_context(&self) -> Option<&str> {
        match self {
            ContextRole::Depends { context } | ContextRole::Destroys { context } => Some(context),
            _ => None,
        }
    }
}

/// A registered trigger bound to a handler. Immutable once built.
#[derive(Clone)]
pub struct Action {
    name: String,
    package: Arc<ActionPackage>,
    visibility: Visibility,
    trigger: Trigger,
    role: ContextRole,
    handler: Arc<dyn ActionHandler>,
    /// Trigger analysis and the name of the language that produced it.
    analysis: OnceLock<(String, Analysis)>,
}

impl Action {
    pub fn builder(name: impl Into<String>, package: &Arc<ActionPackage>) -> ActionBuilder {
        ActionBuilder {
            name: name.into(),
            package: Arc::clone(package),
            visibility: Visibility::default(),
            triggers: Vec::new(),
            role: ContextRole::None,
            handler: None,
        }
    }

    /// Package-qualified name, `package/action`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn package(&self) -> &Arc<ActionPackage> {
        &self.package
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn role(&self) -> &ContextRole {
        &self.role
    }

    pub fn handler(&self) -> &dyn ActionHandler {
        self.handler.as_ref()
    }

    pub fn same_package(&self, other: &Action) -> bool {
        self.package.name == other.package.name
    }

    /// The trigger's literal text as analyzed by `language`.
    ///
    /// The first language to ask is cached; any other gets a fresh analysis.
    pub fn trigger_analysis(&self, language: &dyn Language) -> Cow<'_, Analysis> {
        let (cached_by, analysis) = self.analysis.get_or_init(|| {
            (
                language.name().to_string(),
                language.analyze(self.trigger.literal_text()),
            )
        });
        if cached_by == language.name() {
            Cow::Borrowed(analysis)
        } else {
            Cow::Owned(language.analyze(self.trigger.literal_text()))
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("package", &self.package.name)
            .field("visibility", &self.visibility)
            .field("trigger", &self.trigger.pattern())
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Action`]s.
pub struct ActionBuilder {
    name: String,
    package: Arc<ActionPackage>,
    visibility: Visibility,
    triggers: Vec<String>,
    role: ContextRole,
    handler: Option<Arc<dyn ActionHandler>>,
}

impl ActionBuilder {
    pub fn trigger(mut self, pattern: impl Into<String>) -> Self {
        self.triggers.push(pattern.into());
        self
    }

    pub fn triggers<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn constructs(mut self, context: &str, expiration: Option<Duration>) -> Self {
        self.role = ContextRole::Constructs {
            context: self.package.context_id(context),
            expiration,
        };
        self
    }

    pub fn depends_on(mut self, context: &str) -> Self {
        self.role = ContextRole::Depends {
            context: self.package.context_id(context),
        };
        self
    }

    pub fn destroys(mut self, context: &str) -> Self {
        self.role = ContextRole::Destroys {
            context: self.package.context_id(context),
        };
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Environment, &Sentence, &[Parameter]) -> ActionResult + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn shared_handler(mut self, handler: Arc<dyn ActionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build an action with exactly one trigger.
    pub fn build(self) -> Result<Action, ActionError> {
        let name = self.qualified_name();
        match self.triggers.len() {
            0 => Err(ActionError::MissingTrigger(name)),
            1 => self
                .build_all()?
                .pop()
                .ok_or(ActionError::MissingTrigger(name)),
            count => Err(ActionError::AmbiguousTrigger {
                action: name,
                count,
            }),
        }
    }

    /// Build one action per trigger. With several triggers the names get a
    /// `$i` suffix in declaration order.
    pub fn build_all(self) -> Result<Vec<Action>, ActionError> {
        let name = self.qualified_name();
        if self.triggers.is_empty() {
            return Err(ActionError::MissingTrigger(name));
        }
        let handler = self
            .handler
            .ok_or_else(|| ActionError::MissingHandler(name.clone()))?;
        let numbered = self.triggers.len() > 1;

        self.triggers
            .iter()
            .enumerate()
            .map(|(i, pattern)| {
                let action_name = if numbered {
                    format!("{name}${i}")
                } else {
                    name.clone()
                };
                let trigger = Trigger::parse(pattern).map_err(|source| ActionError::Trigger {
                    action: action_name.clone(),
                    source,
                })?;
                Ok(Action {
                    name: action_name,
                    package: Arc::clone(&self.package),
                    visibility: self.visibility,
                    trigger,
                    role: self.role.clone(),
                    handler: Arc::clone(&handler),
                    analysis: OnceLock::new(),
                })
            })
            .collect()
    }

    fn qualified_name(&self) -> String {
        format!("{}/{}", self.package.name, self.name)
    }
}
