//! Registry of all known actions.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parley_core::LIBRARY_VERSION;
use parley_language::Language;
use tracing::{debug, info, warn};

use crate::action::{Action, ActionBundle, ActionPackage};
use crate::context::NamedContexts;
use crate::error::ActionError;

/// Holds every registered action. Built during setup, read-only afterwards.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: Vec<Arc<Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one action. Returns `false` when its package requires a newer
    /// library version; the action is skipped with a warning.
    pub fn register(&mut self, action: Action) -> bool {
        let package = action.package();
        if package.min_library_version > LIBRARY_VERSION {
            warn!(
                action = %action.name(),
                package = %package.name,
                required = package.min_library_version,
                running = LIBRARY_VERSION,
                "Skipping action built for a newer library version"
            );
            return false;
        }
        debug!(
            action = %action.name(),
            trigger = %action.trigger().pattern(),
            "Action registered"
        );
        self.actions.push(Arc::new(action));
        true
    }

    /// Register several actions, returning how many were accepted.
    pub fn register_all(&mut self, actions: impl IntoIterator<Item = Action>) -> usize {
        actions
            .into_iter()
            .map(|action| self.register(action))
            .filter(|accepted| *accepted)
            .count()
    }

    /// Build a bundle's actions and register them.
    pub fn register_bundle(
        &mut self,
        bundle: &dyn ActionBundle,
        language: &dyn Language,
    ) -> Result<usize, ActionError> {
        let package = bundle.package();
        let actions = bundle.actions(language)?;
        for action in &actions {
            action.trigger_analysis(language);
        }
        let accepted = self.register_all(actions);
        info!(
            package = %package.name,
            locale = %package.locale,
            actions = accepted,
            "Action package loaded"
        );
        Ok(accepted)
    }

    pub fn all(&self) -> &[Arc<Action>] {
        &self.actions
    }

    pub fn find(&self, name: &str) -> Option<Arc<Action>> {
        self.actions.iter().find(|a| a.name() == name).cloned()
    }

    /// Distinct owning packages in registration order.
    pub fn packages(&self) -> Vec<Arc<ActionPackage>> {
        let mut seen = HashSet::new();
        self.actions
            .iter()
            .filter(|a| seen.insert(a.package().name.clone()))
            .map(|a| Arc::clone(a.package()))
            .collect()
    }

    /// Actions that may be matched right now: every action without a
    /// required context, plus those whose required context is live.
    pub fn eligible(&self, contexts: &NamedContexts, now: DateTime<Utc>) -> Vec<Arc<Action>> {
        self.actions
            .iter()
            .filter(|a| match a.role().required_context() {
                None => true,
                Some(context) => contexts.is_live(context, now),
            })
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::types::{ActionResult, Parameter};
    use chrono::Duration;
    use parley_language::{LexiconLanguage, Sentence, UnifiedLanguage};
    use std::borrow::Cow;

    fn noop(_: &Environment, _: &Sentence, _: &[Parameter]) -> ActionResult {
        ActionResult::success()
    }

    fn plain(pkg: &Arc<ActionPackage>, name: &str) -> Action {
        Action::builder(name, pkg)
            .trigger(name)
            .handler(noop)
            .build()
            .unwrap()
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
                    .handler(noop)
                    .build()?,
                Action::builder("play", &pkg)
                    .trigger("play <<e$0>>")
                    .depends_on("round")
                    .handler(noop)
                    .build()?,
                Action::builder("quit", &pkg)
                    .trigger("quit the game")
                    .destroys("round")
                    .handler(noop)
                    .build()?,
            ])
        }
    }

    #[test]
    fn test_register_and_find() {
        let pkg = Arc::new(ActionPackage::new("p", ""));
        let mut registry = ActionRegistry::new();
        assert!(registry.register(plain(&pkg, "hello")));
        assert_eq!(registry.len(), 1);
        assert!(registry.find("p/hello").is_some());
        assert!(registry.find("p/bye").is_none());
    }

    #[test]
    fn test_register_skips_newer_packages() {
        let newer = Arc::new(
            ActionPackage::new("future", "").with_min_library_version(LIBRARY_VERSION + 1),
        );
        let current =
            Arc::new(ActionPackage::new("now", "").with_min_library_version(LIBRARY_VERSION));
        let mut registry = ActionRegistry::new();

        let accepted = registry.register_all(vec![plain(&newer, "a"), plain(&current, "b")]);
        assert_eq!(accepted, 1);
        assert_eq!(registry.all()[0].name(), "now/b");
    }

    #[test]
    fn test_packages_are_distinct() {
        let a = Arc::new(ActionPackage::new("a", ""));
        let b = Arc::new(ActionPackage::new("b", ""));
        let mut registry = ActionRegistry::new();
        registry.register_all(vec![plain(&a, "x"), plain(&b, "y"), plain(&a, "z")]);

        let names: Vec<String> = registry.packages().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_register_bundle() {
        let mut registry = ActionRegistry::new();
        let count = registry.register_bundle(&GameBundle, &UnifiedLanguage).unwrap();
        assert_eq!(count, 3);
        assert_eq!(registry.packages().len(), 1);
    }

    #[test]
    fn test_register_bundle_analyzes_triggers_once() {
        let lexicon = LexiconLanguage::new("home", "en");
        let mut registry = ActionRegistry::new();
        registry.register_bundle(&GameBundle, &lexicon).unwrap();

        let start = registry.find("game/start").unwrap();
        assert!(matches!(start.trigger_analysis(&lexicon), Cow::Borrowed(_)));
        // Cached under the bundle's language, so another one recomputes.
        assert!(matches!(start.trigger_analysis(&UnifiedLanguage), Cow::Owned(_)));
    }

    #[test]
    fn test_eligible_depends_on_live_contexts() {
        let mut registry = ActionRegistry::new();
        registry.register_bundle(&GameBundle, &UnifiedLanguage).unwrap();
        let now = Utc::now();
        let mut contexts = NamedContexts::new();

        let names = |actions: Vec<Arc<Action>>| -> Vec<String> {
            actions.iter().map(|a| a.name().to_string()).collect()
        };

        assert_eq!(names(registry.eligible(&contexts, now)), vec!["game/start"]);

        contexts.create("game#round", Some(Duration::minutes(5)), now);
        assert_eq!(
            names(registry.eligible(&contexts, now)),
            vec!["game/start", "game/play", "game/quit"]
        );
    }

    #[test]
    fn test_expired_context_makes_dependents_ineligible() {
        let mut registry = ActionRegistry::new();
        registry.register_bundle(&GameBundle, &UnifiedLanguage).unwrap();
        let now = Utc::now();
        let mut contexts = NamedContexts::new();
        contexts.create("game#round", Some(Duration::minutes(5)), now - Duration::minutes(6));

        let eligible = registry.eligible(&contexts, now);
        assert_eq!(eligible.len(), 1);
        assert!(eligible.iter().all(|a| a.role().required_context().is_none()));
    }

    #[test]
    fn test_clear() {
        let mut registry = ActionRegistry::new();
        registry.register_bundle(&GameBundle, &UnifiedLanguage).unwrap();
        registry.clear();
        assert!(registry.is_empty());
    }
}
