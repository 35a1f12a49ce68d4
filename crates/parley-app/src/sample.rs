//! The bundled sample package: one action of every kind.

use std::sync::Arc;

use chrono::Duration;
use parley_action::{
    Action, ActionBundle, ActionError, ActionPackage, ActionResult, Environment, Outcome,
    Parameter, Visibility,
};
use parley_language::{Language, Sentence};
use tracing::warn;

const CONTEXT: &str = "samplecontextid";

pub struct SamplePackage;

impl ActionBundle for SamplePackage {
    fn package(&self) -> Arc<ActionPackage> {
        Arc::new(ActionPackage::new("parley.sample", "A sample action package."))
    }

    fn actions(&self, _language: &dyn Language) -> Result<Vec<Action>, ActionError> {
        let package = self.package();
        let mut actions = vec![Action::builder("sample", &package)
            .trigger("my sample trigger")
            .handler(run_sample)
            .build()?];

        actions.extend(
            Action::builder("parameter", &package)
                .triggers(["another action with <<e$0>>", "this <<e$0>> is a parameter"])
                .visibility(Visibility::Private)
                .handler(run_parameter)
                .build_all()?,
        );

        actions.push(
            Action::builder("context_constructor", &package)
                .trigger("build up a new context")
                .visibility(Visibility::Package)
                .constructs(CONTEXT, Some(Duration::hours(1)))
                .handler(run_constructor)
                .build()?,
        );
        actions.push(
            Action::builder("context_action", &package)
                .trigger("launch context action")
                .visibility(Visibility::Package)
                .depends_on(CONTEXT)
                .handler(run_question)
                .build()?,
        );
        actions.push(
            Action::builder("context_destructor", &package)
                .trigger("destroy context")
                .visibility(Visibility::Package)
                .destroys(CONTEXT)
                .handler(run_destructor)
                .build()?,
        );

        Ok(actions)
    }
}

fn run_sample(env: &Environment, _: &Sentence, _: &[Parameter]) -> ActionResult {
    env.output("The sample action was executed.");
    ActionResult::success()
}

/// Echo the captured parameter, asking for it when the input had none.
fn run_parameter(env: &Environment, _: &Sentence, parameters: &[Parameter]) -> ActionResult {
    if let Some(parameter) = parameters.first() {
        env.output(&format!("The parameter was {}", parameter.value));
        return ActionResult::success();
    }

    env.output("Could not find the parameter.");
    if !env.can_request_input() {
        env.output("Requesting input is not supported.");
        return ActionResult::new(Outcome::MissingFunctionality);
    }
    match env.request_input("What is the parameter?") {
        Ok(Some(value)) => {
            env.output(&format!("The parameter was {value}"));
            ActionResult::success()
        }
        Ok(None) => ActionResult::new(Outcome::MissingInput),
        Err(e) => {
            warn!(error = %e, "Input request failed");
            ActionResult::with_message(Outcome::MissingFunctionality, e.to_string())
        }
    }
}

fn run_constructor(env: &Environment, _: &Sentence, _: &[Parameter]) -> ActionResult {
    env.output("Context created.");
    ActionResult::new(Outcome::CreateContext)
}

/// Ask a yes/no question and understand the answer through the language.
fn run_question(env: &Environment, _: &Sentence, _: &[Parameter]) -> ActionResult {
    env.output("This is a yes/no question?");
    let answer = match env.request_input("Question? Yes / No") {
        Ok(Some(answer)) => answer,
        Ok(None) => return ActionResult::new(Outcome::MissingInput),
        Err(e) => {
            warn!(error = %e, "Input request failed");
            return ActionResult::with_message(Outcome::MissingFunctionality, e.to_string());
        }
    };

    let language = env.language();
    let sentence = language.sentence(&answer);
    for (choice, reply) in [("yes", "You answered yes."), ("no", "You answered no.")] {
        let expected = language.word(choice);
        if sentence
            .words()
            .iter()
            .any(|w| w.equals_normal_form(&expected))
        {
            env.output(reply);
            return ActionResult::success();
        }
    }

    env.output("I do not understand what you are meaning.");
    ActionResult::new(Outcome::MissingInput)
}

fn run_destructor(env: &Environment, _: &Sentence, _: &[Parameter]) -> ActionResult {
    env.output("Context destroyed.");
    ActionResult::new(Outcome::DestroyContext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_action::{ActionRegistry, ExecutionRequest, Orchestrator, RecordingEnvironment};
    use parley_language::UnifiedLanguage;
    use tempfile::TempDir;

    fn orchestrator(system: Arc<RecordingEnvironment>, root: &TempDir) -> Arc<Orchestrator> {
        let mut registry = ActionRegistry::new();
        registry
            .register_bundle(&SamplePackage, &UnifiedLanguage)
            .unwrap();
        Arc::new(
            Orchestrator::new(registry, Arc::new(UnifiedLanguage), system)
                .with_data_root(root.path()),
        )
    }

    fn run(orchestrator: &Arc<Orchestrator>, input: &str, threshold: f32) -> Option<ActionResult> {
        orchestrator
            .spawn(ExecutionRequest::new(input, threshold))
            .unwrap()
            .join()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_package_contents() {
        let actions = SamplePackage.actions(&UnifiedLanguage).unwrap();
        let names: Vec<&str> = actions.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            vec![
                "parley.sample/sample",
                "parley.sample/parameter$0",
                "parley.sample/parameter$1",
                "parley.sample/context_constructor",
                "parley.sample/context_action",
                "parley.sample/context_destructor",
            ]
        );
        assert_eq!(
            actions[3].role().context(),
            Some("parley.sample#samplecontextid")
        );
    }

    #[test]
    fn test_simple_action() {
        let root = TempDir::new().unwrap();
        let system = Arc::new(RecordingEnvironment::new());
        let orchestrator = orchestrator(Arc::clone(&system), &root);

        let result = run(&orchestrator, "my sample trigger", 0.5);
        assert_eq!(result, Some(ActionResult::success()));
        assert_eq!(system.written(), vec!["The sample action was executed."]);
    }

    #[test]
    fn test_parameter_from_input() {
        let root = TempDir::new().unwrap();
        let system = Arc::new(RecordingEnvironment::new());
        let orchestrator = orchestrator(Arc::clone(&system), &root);

        run(&orchestrator, "this cake is a parameter", 0.5);
        assert_eq!(system.written(), vec!["The parameter was cake"]);
    }

    #[test]
    fn test_parameter_asked_for_when_missing() {
        let root = TempDir::new().unwrap();
        let system = Arc::new(RecordingEnvironment::new().with_answers(["pie"]));
        let orchestrator = orchestrator(Arc::clone(&system), &root);

        let asked = run(&orchestrator, "another action with", 0.5);
        assert_eq!(asked, Some(ActionResult::success()));
        assert_eq!(system.prompts(), vec!["What is the parameter?"]);
        assert_eq!(
            system.written(),
            vec!["Could not find the parameter.", "The parameter was pie"]
        );

        let result = run(&orchestrator, "another action with", 0.5).unwrap();
        assert_eq!(result.outcome, Outcome::MissingInput);
    }

    #[test]
    fn test_context_lifecycle() {
        let root = TempDir::new().unwrap();
        let system = Arc::new(RecordingEnvironment::new().with_answers(["Yes please", "maybe"]));
        let orchestrator = orchestrator(Arc::clone(&system), &root);
        // Shared words such as "action" lift other sample actions above 0.5.
        let strict = |input: &str| run(&orchestrator, input, 0.95);

        assert_eq!(strict("launch context action"), None);

        let created = strict("build up a new context").unwrap();
        assert_eq!(created.outcome, Outcome::CreateContext);

        assert_eq!(strict("launch context action"), Some(ActionResult::success()));
        let unclear = strict("launch context action").unwrap();
        assert_eq!(unclear.outcome, Outcome::MissingInput);

        let destroyed = strict("destroy context").unwrap();
        assert_eq!(destroyed.outcome, Outcome::DestroyContext);
        assert_eq!(strict("launch context action"), None);

        let written = system.written();
        assert!(written.contains(&"You answered yes.".to_string()));
        assert!(written.contains(&"I do not understand what you are meaning.".to_string()));
    }
}
