//! The capabilities handed to action handlers.
//!
//! A [`SystemEnvironment`] is supplied by the host (console, server, test)
//! and is shared by every package. The orchestrator wraps it into a
//! per-package [`Environment`] for each execution, adding the package's
//! projected context stack, preferences and private data directory.

use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use parley_core::{UserInfo, LIBRARY_VERSION};
use parley_language::Language;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::ActionPackage;
use crate::context::{ContextStack, ContextState};
use crate::error::{EnvironmentError, ExecutionError};

// =============================================================================
// System capabilities
// =============================================================================

/// Read-only metadata about the running system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemProperties {
    pub version: String,
    pub version_code: u32,
    pub description: String,
    pub developer: String,
    pub startup: DateTime<Utc>,
}

impl SystemProperties {
    /// Properties of this build, started now.
    pub fn current(description: impl Into<String>, developer: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            version_code: LIBRARY_VERSION,
            description: description.into(),
            developer: developer.into(),
            startup: Utc::now(),
        }
    }
}

impl Default for SystemProperties {
    fn default() -> Self {
        Self::current("Parley", "")
    }
}

/// A display surface handlers can drive with named visuals.
pub trait VisualOutput: Send + Sync {
    fn show(&self, visual: &str, args: &[serde_json::Value]) -> Result<(), EnvironmentError>;

    fn set_property(&self, property: &str, value: serde_json::Value)
        -> Result<(), EnvironmentError>;

    fn properties(&self) -> Vec<String>;

    fn visuals(&self) -> Vec<String>;
}

/// Host-provided capabilities. Only `properties`, `user` and `write` are
/// mandatory; everything else defaults to unsupported.
pub trait SystemEnvironment: Send + Sync {
    fn properties(&self) -> &SystemProperties;

    fn user(&self) -> &UserInfo;

    /// Textual output.
    fn write(&self, text: &str);

    fn can_speak(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str) -> Result<(), EnvironmentError> {
        Err(EnvironmentError::Unsupported("speech output"))
    }

    /// Write `text` and, where supported, speak it too.
    fn output(&self, text: &str) {
        self.write(text);
        if self.can_speak() {
            if let Err(e) = self.speak(text) {
                warn!(error = %e, "Spoken output failed");
            }
        }
    }

    fn can_request_input(&self) -> bool {
        false
    }

    /// Ask the user for more input. May block the calling execution until an
    /// answer arrives; `Ok(None)` means no answer was given.
    fn request_input(&self, _prompt: &str) -> Result<Option<String>, EnvironmentError> {
        Err(EnvironmentError::Unsupported("input requests"))
    }

    fn visual_output(&self) -> Option<&dyn VisualOutput> {
        None
    }
}

// =============================================================================
// Package capabilities
// =============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-package key/value settings.
///
/// A handler that panics while writing poisons the store; every later
/// access then fails with [`ExecutionError::StatePoisoned`].
#[derive(Debug, Default)]
pub struct Preferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, ExecutionError> {
        Ok(self.values()?.get(key).cloned())
    }

    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ExecutionError> {
        self.values()?.insert(key.into(), value.into());
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<Option<String>, ExecutionError> {
        Ok(self.values()?.remove(key))
    }

    pub fn keys(&self) -> Result<Vec<String>, ExecutionError> {
        Ok(self.values()?.keys().cloned().collect())
    }

    fn values(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>, ExecutionError> {
        self.values.lock().map_err(|_| ExecutionError::StatePoisoned)
    }
}

/// Everything one handler invocation may use, scoped to its package.
pub struct Environment {
    system: Arc<dyn SystemEnvironment>,
    package: Arc<ActionPackage>,
    language: Arc<dyn Language>,
    state: Arc<Mutex<ContextState>>,
    preferences: Arc<Preferences>,
    data_dir: PathBuf,
}

impl Environment {
    /// `data_root` is the shared storage root; the package gets its own
    /// subdirectory below it.
    pub fn new(
        system: Arc<dyn SystemEnvironment>,
        package: Arc<ActionPackage>,
        language: Arc<dyn Language>,
        state: Arc<Mutex<ContextState>>,
        preferences: Arc<Preferences>,
        data_root: &Path,
    ) -> Self {
        let data_dir = data_root.join(&package.name);
        Self {
            system,
            package,
            language,
            state,
            preferences,
            data_dir,
        }
    }

    pub fn package(&self) -> &ActionPackage {
        &self.package
    }

    pub fn language(&self) -> &dyn Language {
        self.language.as_ref()
    }

    pub fn system(&self) -> &dyn SystemEnvironment {
        self.system.as_ref()
    }

    /// The context stack as this package may see it.
    pub fn context_stack(&self) -> Result<ContextStack, ExecutionError> {
        let state = self
            .state
            .lock()
            .map_err(|_| ExecutionError::StatePoisoned)?;
        Ok(state.stack.project(&self.package.name))
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// The package's private storage directory, created on first use.
    pub fn data_dir(&self) -> Result<&Path, EnvironmentError> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)?;
            debug!(
                package = %self.package.name,
                path = %self.data_dir.display(),
                "Data directory created"
            );
        }
        Ok(&self.data_dir)
    }

    pub fn properties(&self) -> &SystemProperties {
        self.system.properties()
    }

    pub fn user(&self) -> &UserInfo {
        self.system.user()
    }

    pub fn write(&self, text: &str) {
        self.system.write(text);
    }

    pub fn can_speak(&self) -> bool {
        self.system.can_speak()
    }

    pub fn speak(&self, text: &str) -> Result<(), EnvironmentError> {
        self.system.speak(text)
    }

    pub fn output(&self, text: &str) {
        self.system.output(text);
    }

    pub fn can_request_input(&self) -> bool {
        self.system.can_request_input()
    }

    pub fn request_input(&self, prompt: &str) -> Result<Option<String>, EnvironmentError> {
        self.system.request_input(prompt)
    }

    pub fn visual_output(&self) -> Option<&dyn VisualOutput> {
        self.system.visual_output()
    }
}

// =============================================================================
// Recording environment
// =============================================================================

/// A [`SystemEnvironment`] that keeps every output in memory and answers
/// input requests from a script. Exhausted scripts answer with nothing.
#[derive(Debug, Default)]
pub struct RecordingEnvironment {
    properties: SystemProperties,
    user: UserInfo,
    speaks: bool,
    written: Mutex<Vec<String>>,
    spoken: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    answers: Mutex<VecDeque<String>>,
}

impl RecordingEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: UserInfo) -> Self {
        self.user = user;
        self
    }

    pub fn with_speech(mut self) -> Self {
        self.speaks = true;
        self
    }

    pub fn with_answers<I, S>(self, answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.answers).extend(answers.into_iter().map(Into::into));
        self
    }

    pub fn written(&self) -> Vec<String> {
        lock(&self.written).clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        lock(&self.spoken).clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

impl SystemEnvironment for RecordingEnvironment {
    fn properties(&self) -> &SystemProperties {
        &self.properties
    }

    fn user(&self) -> &UserInfo {
        &self.user
    }

    fn write(&self, text: &str) {
        lock(&self.written).push(text.to_string());
    }

    fn can_speak(&self) -> bool {
        self.speaks
    }

    fn speak(&self, text: &str) -> Result<(), EnvironmentError> {
        if !self.speaks {
            return Err(EnvironmentError::Unsupported("speech output"));
        }
        lock(&self.spoken).push(text.to_string());
        Ok(())
    }

    fn can_request_input(&self) -> bool {
        true
    }

    fn request_input(&self, prompt: &str) -> Result<Option<String>, EnvironmentError> {
        lock(&self.prompts).push(prompt.to_string());
        Ok(lock(&self.answers).pop_front())
    }
}
