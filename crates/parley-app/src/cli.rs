//! CLI argument definitions for the Parley console.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Parley - match free-text commands against registered actions.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Root directory for per-package private storage.
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Minimum score (0.0 to 1.0) an action needs to be selected.
    #[arg(short = 't', long = "threshold")]
    pub threshold: Option<f32>,

    /// Lexicon file (TOML) to analyze input with instead of the unified language.
    #[arg(long = "lexicon")]
    pub lexicon: Option<PathBuf>,

    /// Execute a single input and exit.
    #[arg(short = 'e', long = "execute")]
    pub execute: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PARLEY_CONFIG env var > ~/.parley/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PARLEY_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the selection threshold, clamped to `0.0..=1.0`.
    ///
    /// Priority: --threshold flag > config file value.
    pub fn resolve_threshold(&self, config_threshold: f32) -> f32 {
        self.threshold.unwrap_or(config_threshold).clamp(0.0, 1.0)
    }

    /// Resolve the data directory, expanding a leading `~`.
    ///
    /// Priority: --data-dir flag > config file value.
    pub fn resolve_data_dir(&self, config_data_dir: &str) -> PathBuf {
        match &self.data_dir {
            Some(p) => p.clone(),
            None => expand_home(config_data_dir),
        }
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let home = std::env::var("USERPROFILE");
    #[cfg(not(target_os = "windows"))]
    let home = std::env::var("HOME");
    home.ok().map(PathBuf::from)
}

/// Expand `~` to the home directory in a path string.
fn expand_home(path: &str) -> PathBuf {
    match path
        .strip_prefix("~/")
        .or_else(|| path.strip_prefix("~\\"))
    {
        Some(rest) => home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        None => PathBuf::from(path),
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".parley").join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("parley").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&[
            "-c",
            "/tmp/parley.toml",
            "--data-dir",
            "/tmp/data",
            "-l",
            "debug",
            "-t",
            "0.7",
            "--lexicon",
            "words.toml",
            "-e",
            "my sample trigger",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/parley.toml")));
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/data")));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.threshold, Some(0.7));
        assert_eq!(args.lexicon, Some(PathBuf::from("words.toml")));
        assert_eq!(args.execute.as_deref(), Some("my sample trigger"));
    }

    #[test]
    fn test_config_flag_wins() {
        let args = parse(&["--config", "custom.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("custom.toml"));
    }

    #[test]
    fn test_threshold_resolution() {
        assert_eq!(parse(&[]).resolve_threshold(0.5), 0.5);
        assert_eq!(parse(&["-t", "0.8"]).resolve_threshold(0.5), 0.8);
        assert_eq!(parse(&["-t", "3"]).resolve_threshold(0.5), 1.0);
    }

    #[test]
    fn test_data_dir_resolution() {
        assert_eq!(
            parse(&["-d", "/srv/parley"]).resolve_data_dir("~/.parley/data"),
            PathBuf::from("/srv/parley")
        );
        assert_eq!(
            parse(&[]).resolve_data_dir("/var/lib/parley"),
            PathBuf::from("/var/lib/parley")
        );
        let expanded = parse(&[]).resolve_data_dir("~/.parley/data");
        assert!(expanded.ends_with(".parley/data"));
        assert!(!expanded.starts_with("~"));
    }

    #[test]
    fn test_log_level_resolution() {
        assert_eq!(parse(&[]).resolve_log_level("warn"), "warn");
        assert_eq!(parse(&["-l", "trace"]).resolve_log_level("warn"), "trace");
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let result = CliArgs::try_parse_from(["parley", "--threshold", "high"]);
        assert!(result.is_err());
    }
}
