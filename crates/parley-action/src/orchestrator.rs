//! Execution pipeline.
//!
//! One request runs analyze, rank, select, execute, reconcile and record, in
//! that order. The context state is locked only to take a snapshot before
//! ranking and again to reconcile and record afterwards, so a handler that
//! blocks (waiting for input, say) never holds up concurrent requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle, ThreadId};

use chrono::Utc;
use parley_core::WeightSet;
use parley_language::Language;
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::action::ActionPackage;
use crate::context::{ContextStack, ContextState, StackEntry};
use crate::environment::{Environment, Preferences, SystemEnvironment};
use crate::error::ExecutionError;
use crate::hooks::{DefaultHooks, ExecutionHooks};
use crate::matcher::Matcher;
use crate::registry::ActionRegistry;
use crate::types::ActionResult;

/// One piece of input to execute, with the knobs that apply to it.
#[derive(Clone)]
pub struct ExecutionRequest {
    pub input: String,
    /// Minimum normalized score for a candidate to be selectable.
    pub threshold: f32,
    pub weights: WeightSet,
    pub hooks: Arc<dyn ExecutionHooks>,
}

impl ExecutionRequest {
    pub fn new(input: impl Into<String>, threshold: f32) -> Self {
        Self {
            input: input.into(),
            threshold,
            weights: WeightSet::default(),
            hooks: Arc::new(DefaultHooks),
        }
    }

    pub fn with_weights(mut self, weights: WeightSet) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ExecutionHooks>) -> Self {
        self.hooks = hooks;
        self
    }
}

/// Owns the registry and the full context state and runs requests against
/// them. The thread that creates it is its home thread; synchronous
/// execution from there is refused.
pub struct Orchestrator {
    registry: ActionRegistry,
    language: Arc<dyn Language>,
    system: Arc<dyn SystemEnvironment>,
    state: Arc<Mutex<ContextState>>,
    preferences: Mutex<HashMap<String, Arc<Preferences>>>,
    data_root: PathBuf,
    parameter_threshold: f32,
    home: ThreadId,
}

impl Orchestrator {
    pub fn new(
        registry: ActionRegistry,
        language: Arc<dyn Language>,
        system: Arc<dyn SystemEnvironment>,
    ) -> Self {
        Self {
            registry,
            language,
            system,
            state: Arc::new(Mutex::new(ContextState::default())),
            preferences: Mutex::new(HashMap::new()),
            data_root: PathBuf::from("parley-data"),
            parameter_threshold: 0.3,
            home: thread::current().id(),
        }
    }

    /// Maximum number of execution records kept.
    pub fn with_context_capacity(self, capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(ContextState::new(capacity))),
            ..self
        }
    }

    /// Root below which every package gets its private directory.
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_root = root.into();
        self
    }

    pub fn with_parameter_threshold(mut self, threshold: f32) -> Self {
        self.parameter_threshold = threshold;
        self
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn language(&self) -> &dyn Language {
        self.language.as_ref()
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Run one request to completion on the calling thread.
    ///
    /// Returns `Ok(None)` when no candidate was selected. Fails with
    /// [`ExecutionError::HomeThread`] before doing any work when called from
    /// the thread that created the orchestrator.
    pub fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Option<ActionResult>, ExecutionError> {
        if thread::current().id() == self.home {
            return Err(ExecutionError::HomeThread);
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("execute", request = %request_id);
        let _guard = span.enter();

        let analysis = self.language.analyze(&request.input);
        debug!(
            tokens = analysis.sentence.len(),
            kind = %analysis.sentence.kind(),
            "Input analyzed"
        );

        let now = Utc::now();
        let (candidates, stack) = {
            let state = self.lock_state()?;
            (
                self.registry.eligible(&state.contexts, now),
                state.stack.clone(),
            )
        };

        let matcher = Matcher::new(self.language.as_ref(), &request.weights)
            .with_parameter_threshold(self.parameter_threshold);
        let matches = matcher.rank(&analysis, &candidates, &stack, request.threshold, now);

        let arranged = request.hooks.arrange(matches);
        let Some(selected) = request.hooks.select(arranged) else {
            info!(input = %request.input, "No action matched");
            return Ok(None);
        };
        info!(
            action = %selected.action.name(),
            score = selected.score,
            parameters = selected.parameters.len(),
            "Action selected"
        );

        let env = self.environment_for(selected.action.package())?;
        let result = request.hooks.run(&selected, &env, &analysis.sentence);
        let result = request.hooks.review(&selected, result);

        let finished = Utc::now();
        {
            let mut state = self.lock_state()?;
            state.reconcile(&selected.action, &result, finished);
            state.record(StackEntry::new(
                Arc::clone(&selected.action),
                request.input.clone(),
                result.clone(),
                finished,
            ));
        }

        info!(action = %selected.action.name(), outcome = %result.outcome, "Action executed");
        Ok(Some(result))
    }

    /// Run a request on a new thread.
    pub fn spawn(
        self: &Arc<Self>,
        request: ExecutionRequest,
    ) -> Result<JoinHandle<Result<Option<ActionResult>, ExecutionError>>, ExecutionError> {
        let orchestrator = Arc::clone(self);
        thread::Builder::new()
            .name("parley-exec".to_string())
            .spawn(move || orchestrator.execute(&request))
            .map_err(ExecutionError::Spawn)
    }

    /// Run a request on tokio's blocking pool and await its result.
    pub async fn dispatch(
        self: &Arc<Self>,
        request: ExecutionRequest,
    ) -> Result<Option<ActionResult>, ExecutionError> {
        let orchestrator = Arc::clone(self);
        tokio::task::spawn_blocking(move || orchestrator.execute(&request))
            .await
            .map_err(|e| ExecutionError::Join(e.to_string()))?
    }

    // =========================================================================
    // Context access
    // =========================================================================

    /// The context stack as seen by `package`.
    pub fn context_stack_for(&self, package: &str) -> Result<ContextStack, ExecutionError> {
        Ok(self.lock_state()?.stack.project(package))
    }

    /// Ids of the named contexts live right now, sorted.
    pub fn live_contexts(&self) -> Result<Vec<String>, ExecutionError> {
        Ok(self.lock_state()?.contexts.live_ids(Utc::now()))
    }

    /// Change the stack capacity. The stack starts over empty.
    pub fn set_context_capacity(&self, capacity: usize) -> Result<(), ExecutionError> {
        self.lock_state()?.resize(capacity);
        info!(capacity, "Context stack resized");
        Ok(())
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, ContextState>, ExecutionError> {
        self.state.lock().map_err(|_| ExecutionError::StatePoisoned)
    }

    fn environment_for(&self, package: &Arc<ActionPackage>) -> Result<Environment, ExecutionError> {
        let preferences = {
            let mut all = self
                .preferences
                .lock()
                .map_err(|_| ExecutionError::StatePoisoned)?;
            Arc::clone(all.entry(package.name.clone()).or_default())
        };
        Ok(Environment::new(
            Arc::clone(&self.system),
            Arc::clone(package),
            Arc::clone(&self.language),
            Arc::clone(&self.state),
            preferences,
            &self.data_root,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionBundle};
    use crate::environment::RecordingEnvironment;
    use crate::error::ActionError;
    use crate::matcher::MatchResult;
    use crate::types::{Outcome, Parameter, Visibility};
    use chrono::Duration;
    use parley_language::{Sentence, UnifiedLanguage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    fn noop(_: &Environment, _: &Sentence, _: &[Parameter]) -> ActionResult {
        ActionResult::success()
    }

    struct GameBundle;

    impl ActionBundle for GameBundle {
        fn package(&self) -> Arc<ActionPackage> {
            Arc::new(ActionPackage::new("game", "A small game"))
        }

        fn actions(&self, _language: &dyn Language) -> Result<Vec<Action>, ActionError> {
            let pkg = self.package();
            Ok(vec![
                Action::builder("start", &pkg)
                    .trigger("start a game")
                    .constructs("round", Some(Duration::minutes(5)))
                    .handler(|_: &Environment, _: &Sentence, _: &[Parameter]| {
                        ActionResult::new(Outcome::CreateContext)
                    })
                    .build()?,
                Action::builder("play", &pkg)
                    .trigger("play one card")
                    .depends_on("round")
                    .handler(noop)
                    .build()?,
                Action::builder("quit", &pkg)
                    .trigger("quit the game")
                    .destroys("round")
                    .handler(|_: &Environment, _: &Sentence, _: &[Parameter]| {
                        ActionResult::new(Outcome::DestroyContext)
                    })
                    .build()?,
            ])
        }
    }

    fn orchestrator(registry: ActionRegistry, root: &Path) -> Arc<Orchestrator> {
        Arc::new(
            Orchestrator::new(
                registry,
                Arc::new(UnifiedLanguage),
                Arc::new(RecordingEnvironment::new()),
            )
            .with_data_root(root),
        )
    }

    fn game(root: &Path) -> Arc<Orchestrator> {
        let mut registry = ActionRegistry::new();
        registry
            .register_bundle(&GameBundle, &UnifiedLanguage)
            .unwrap();
        orchestrator(registry, root)
    }

    /// Execute on a worker thread and unwrap the plumbing.
    fn run(orchestrator: &Arc<Orchestrator>, input: &str) -> Option<ActionResult> {
        orchestrator
            .spawn(ExecutionRequest::new(input, 0.8))
            .unwrap()
            .join()
            .unwrap()
            .unwrap()
    }

    #[derive(Default)]
    struct CountingHooks {
        arranged: AtomicUsize,
    }

    impl ExecutionHooks for CountingHooks {
        fn arrange(&self, mut matches: Vec<MatchResult>) -> Vec<MatchResult> {
            self.arranged.fetch_add(1, Ordering::SeqCst);
            matches.sort_by(|a, b| b.score.total_cmp(&a.score));
            matches
        }
    }

    // ---- home thread ----

    #[test]
    fn test_execute_on_home_thread_fails_fast() {
        let root = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let pkg = Arc::new(ActionPackage::new("p", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("hello", &pkg)
                .trigger("hello")
                .handler(move |_: &Environment, _: &Sentence, _: &[Parameter]| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    ActionResult::success()
                })
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());
        let hooks = Arc::new(CountingHooks::default());
        let request = ExecutionRequest::new("hello", 0.0).with_hooks(hooks.clone());

        let err = orchestrator.execute(&request).unwrap_err();
        assert!(matches!(err, ExecutionError::HomeThread));
        assert_eq!(hooks.arranged.load(Ordering::SeqCst), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(orchestrator.context_stack_for("p").unwrap().is_empty());

        let result = orchestrator.spawn(request).unwrap().join().unwrap().unwrap();
        assert_eq!(result, Some(ActionResult::success()));
        assert_eq!(hooks.arranged.load(Ordering::SeqCst), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // ---- end to end ----

    #[test]
    fn test_parameters_reach_the_handler() {
        let root = TempDir::new().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let pkg = Arc::new(ActionPackage::new("home", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("lights_on", &pkg)
                .trigger("turn on <<e$0>> light")
                .handler(move |_: &Environment, _: &Sentence, parameters: &[Parameter]| {
                    let mut sink = sink.lock().unwrap();
                    sink.extend(parameters.iter().map(|p| p.value.clone()));
                    ActionResult::success()
                })
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());

        let result = run(&orchestrator, "turn on kitchen light");
        assert_eq!(result, Some(ActionResult::success()));
        assert_eq!(*seen.lock().unwrap(), vec!["kitchen".to_string()]);
    }

    #[test]
    fn test_no_match_records_nothing() {
        let root = TempDir::new().unwrap();
        let orchestrator = game(root.path());

        assert_eq!(run(&orchestrator, "what is your name"), None);
        assert!(orchestrator.context_stack_for("game").unwrap().is_empty());
    }

    #[test]
    fn test_constructed_context_enables_dependent() {
        let root = TempDir::new().unwrap();
        let orchestrator = game(root.path());

        assert_eq!(run(&orchestrator, "play one card"), None);

        let started = run(&orchestrator, "start a game").unwrap();
        assert_eq!(started.outcome, Outcome::CreateContext);
        assert_eq!(orchestrator.live_contexts().unwrap(), vec!["game#round"]);

        assert_eq!(run(&orchestrator, "play one card"), Some(ActionResult::success()));
        let stack = orchestrator.context_stack_for("game").unwrap();
        assert_eq!(stack.latest().unwrap().action.name(), "game/play");
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_destructor_ends_context() {
        let root = TempDir::new().unwrap();
        let orchestrator = game(root.path());

        run(&orchestrator, "start a game");
        let quit = run(&orchestrator, "quit the game").unwrap();
        assert_eq!(quit.outcome, Outcome::DestroyContext);
        assert!(orchestrator.live_contexts().unwrap().is_empty());
        assert_eq!(run(&orchestrator, "play one card"), None);
    }

    #[test]
    fn test_review_runs_before_reconcile() {
        struct Promote;

        impl ExecutionHooks for Promote {
            fn review(&self, _selected: &MatchResult, _result: ActionResult) -> ActionResult {
                ActionResult::new(Outcome::CreateContext)
            }
        }

        let root = TempDir::new().unwrap();
        let pkg = Arc::new(ActionPackage::new("quiz", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("begin", &pkg)
                .trigger("begin the quiz")
                .constructs("quiz", None)
                .handler(noop)
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());

        let request = ExecutionRequest::new("begin the quiz", 0.5).with_hooks(Arc::new(Promote));
        let result = orchestrator.spawn(request).unwrap().join().unwrap().unwrap();
        assert_eq!(result.unwrap().outcome, Outcome::CreateContext);
        assert_eq!(orchestrator.live_contexts().unwrap(), vec!["quiz#quiz"]);
    }

    // ---- recording and projection ----

    #[test]
    fn test_private_executions_are_recorded_but_hidden() {
        let root = TempDir::new().unwrap();
        let pkg = Arc::new(ActionPackage::new("vault", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("open", &pkg)
                .trigger("open the vault")
                .visibility(Visibility::Private)
                .handler(noop)
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());

        run(&orchestrator, "open the vault");
        assert_eq!(orchestrator.state.lock().unwrap().stack.len(), 1);
        assert!(orchestrator.context_stack_for("vault").unwrap().is_empty());
        assert!(orchestrator.context_stack_for("other").unwrap().is_empty());
    }

    #[test]
    fn test_handler_sees_projected_stack() {
        let root = TempDir::new().unwrap();
        let observed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&observed);
        let notes = Arc::new(ActionPackage::new("notes", ""));
        let other = Arc::new(ActionPackage::new("other", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("note", &notes)
                .trigger("note down <<e$0>> please")
                .visibility(Visibility::PublicWithoutParameters)
                .handler(noop)
                .build()
                .unwrap(),
        );
        registry.register(
            Action::builder("history", &other)
                .trigger("show me the history")
                .handler(move |env: &Environment, _: &Sentence, _: &[Parameter]| {
                    let stack = env.context_stack().unwrap();
                    let mut sink = sink.lock().unwrap();
                    sink.extend(stack.entries().iter().map(|e| e.input.clone()));
                    ActionResult::success()
                })
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());

        run(&orchestrator, "note down my secret code please");
        run(&orchestrator, "show me the history");
        assert_eq!(*observed.lock().unwrap(), vec!["note down please".to_string()]);
    }

    #[test]
    fn test_preferences_persist_per_package() {
        let root = TempDir::new().unwrap();
        let pkg = Arc::new(ActionPackage::new("counter", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("count", &pkg)
                .trigger("count once more")
                .handler(|env: &Environment, _: &Sentence, _: &[Parameter]| {
                    let prefs = env.preferences();
                    let next = prefs
                        .get("count")
                        .unwrap()
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0)
                        + 1;
                    prefs.set("count", next.to_string()).unwrap();
                    ActionResult::with_message(Outcome::Success, next.to_string())
                })
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());

        run(&orchestrator, "count once more");
        let second = run(&orchestrator, "count once more").unwrap();
        assert_eq!(second.message.as_deref(), Some("2"));
    }

    #[test]
    fn test_set_context_capacity_resets_stack() {
        let root = TempDir::new().unwrap();
        let orchestrator = game(root.path());
        run(&orchestrator, "start a game");
        assert_eq!(orchestrator.context_stack_for("game").unwrap().len(), 1);

        orchestrator.set_context_capacity(1).unwrap();
        assert!(orchestrator.context_stack_for("game").unwrap().is_empty());
        run(&orchestrator, "start a game");
        run(&orchestrator, "quit the game");
        let stack = orchestrator.context_stack_for("game").unwrap();
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.latest().unwrap().action.name(), "game/quit");
    }

    // ---- async entry point ----

    #[tokio::test]
    async fn test_dispatch_runs_off_the_home_thread() {
        let root = TempDir::new().unwrap();
        let orchestrator = game(root.path());

        let result = orchestrator
            .dispatch(ExecutionRequest::new("start a game", 0.5))
            .await
            .unwrap();
        assert_eq!(result.unwrap().outcome, Outcome::CreateContext);
        assert_eq!(orchestrator.live_contexts().unwrap(), vec!["game#round"]);
    }

    #[tokio::test]
    async fn test_blocked_handler_does_not_block_others() {
        let root = TempDir::new().unwrap();
        let (release, gate) = std::sync::mpsc::channel::<()>();
        let gate = Mutex::new(gate);
        let pkg = Arc::new(ActionPackage::new("p", ""));
        let mut registry = ActionRegistry::new();
        registry.register(
            Action::builder("wait", &pkg)
                .trigger("wait for me")
                .handler(move |_: &Environment, _: &Sentence, _: &[Parameter]| {
                    let _ = gate.lock().unwrap().recv();
                    ActionResult::new(Outcome::Pending)
                })
                .build()
                .unwrap(),
        );
        registry.register(
            Action::builder("ping", &pkg)
                .trigger("ping the server")
                .handler(noop)
                .build()
                .unwrap(),
        );
        let orchestrator = orchestrator(registry, root.path());

        let waiting = orchestrator.spawn(ExecutionRequest::new("wait for me", 0.5)).unwrap();
        let pinged = orchestrator
            .dispatch(ExecutionRequest::new("ping the server", 0.5))
            .await
            .unwrap();
        assert_eq!(pinged, Some(ActionResult::success()));

        release.send(()).unwrap();
        let waited = waiting.join().unwrap().unwrap();
        assert_eq!(waited.unwrap().outcome, Outcome::Pending);
    }
}
