//! Parley console binary - composition root.
//!
//! 1. Load configuration from TOML
//! 2. Pick the language (unified, or a lexicon file)
//! 3. Register the bundled sample package
//! 4. Execute one input (`--execute`) or run an interactive loop on stdin

mod cli;
mod console;
mod sample;

use std::sync::Arc;

use clap::Parser;
use parley_action::{ActionRegistry, ExecutionRequest, Orchestrator, SystemEnvironment};
use parley_core::{ParleyConfig, WeightSet};
use parley_language::{Language, LexiconLanguage, UnifiedLanguage};

use cli::CliArgs;
use console::ConsoleEnvironment;
use sample::SamplePackage;

/// Execute one input and report what happened on the console.
async fn run_input(
    orchestrator: &Arc<Orchestrator>,
    console: &ConsoleEnvironment,
    input: String,
    threshold: f32,
    weights: &WeightSet,
) {
    let request = ExecutionRequest::new(input, threshold).with_weights(weights.clone());
    match orchestrator.dispatch(request).await {
        Ok(Some(result)) => tracing::debug!(outcome = %result.outcome, "Execution finished"),
        Ok(None) => console.write("Sorry, I did not understand that."),
        Err(e) => tracing::error!(error = %e, "Execution failed"),
    }
}

/// Read one line on the blocking pool so the runtime stays responsive.
async fn next_line(console: &Arc<ConsoleEnvironment>) -> std::io::Result<Option<String>> {
    let console = Arc::clone(console);
    tokio::task::spawn_blocking(move || console.read_line())
        .await
        .map_err(std::io::Error::other)?
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first, so its log level can seed the filter.
    let config_file = args.resolve_config_path();
    let config = ParleyConfig::load_or_default(&config_file);
    let log_level = args.resolve_log_level(&config.general.log_level);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    // Language.
    let language: Arc<dyn Language> = match &args.lexicon {
        Some(path) => Arc::new(LexiconLanguage::load(path)?),
        None => Arc::new(UnifiedLanguage),
    };
    tracing::info!(language = language.name(), locale = language.locale(), "Language ready");

    // Actions.
    let mut registry = ActionRegistry::new();
    registry.register_bundle(&SamplePackage, language.as_ref())?;

    // Orchestrator.
    let console = Arc::new(ConsoleEnvironment::stdio(config.user.clone()));
    let data_dir = args.resolve_data_dir(&config.general.data_dir);
    let orchestrator = Arc::new(
        Orchestrator::new(registry, language, console.clone())
            .with_context_capacity(config.context.capacity)
            .with_data_root(&data_dir)
            .with_parameter_threshold(config.matcher.parameter_threshold),
    );
    let threshold = args.resolve_threshold(config.matcher.threshold);
    let weights = config.matcher.weights.clone();
    tracing::info!(
        actions = orchestrator.registry().len(),
        threshold,
        data_dir = %data_dir.display(),
        "Orchestrator ready"
    );

    if let Some(input) = args.execute {
        run_input(&orchestrator, &console, input, threshold, &weights).await;
        return Ok(());
    }

    loop {
        console.prompt("> ");
        let Some(line) = next_line(&console).await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }
        run_input(&orchestrator, &console, input.to_string(), threshold, &weights).await;
    }

    tracing::info!("Parley stopped");
    Ok(())
}
