use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParleyError, Result};
use crate::types::UserInfo;
use crate::weights::WeightSet;

/// Top-level configuration for Parley.
///
/// Loaded from `~/.parley/config.toml` by default. Every section may be
/// omitted, in which case its defaults apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub user: UserInfo,
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParleyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Root of the per-package private storage directories.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.parley/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Matching and ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// Minimum normalized score a candidate needs to be selectable (0.0 to 1.0).
    pub threshold: f32,
    /// Running score ratio a candidate must exceed before parameters are extracted.
    pub parameter_threshold: f32,
    #[serde(default)]
    pub weights: WeightSet,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            parameter_threshold: 0.3,
            weights: WeightSet::default(),
        }
    }
}

/// Context store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum number of execution records kept on the context stack.
    pub capacity: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self { capacity: 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = ParleyConfig::default();
        assert_eq!(config.general.data_dir, "~/.parley/data");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.matcher.threshold, 0.5);
        assert_eq!(config.matcher.parameter_threshold, 0.3);
        assert_eq!(config.matcher.weights, WeightSet::default());
        assert_eq!(config.context.capacity, 30);
        assert_eq!(config.user, UserInfo::default());
    }

    #[test]
    fn test_load_valid_config() {
        let content = r#"
[general]
data_dir = "/custom/data"
log_level = "debug"

[matcher]
threshold = 0.65
parameter_threshold = 0.25

[matcher.weights]
length = 1.5
context_same_context = 9.0

[context]
capacity = 12

[user]
name = "Robin"
nicknames = ["Rob"]
"#;
        let file = create_temp_config(content);
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.data_dir, "/custom/data");
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.matcher.threshold, 0.65);
        assert_eq!(config.matcher.parameter_threshold, 0.25);
        assert_eq!(config.matcher.weights.length, 1.5);
        assert_eq!(config.matcher.weights.context_same_context, 9.0);
        assert_eq!(config.matcher.weights.word_exact, 2.0);
        assert_eq!(config.context.capacity, 12);
        assert_eq!(config.user.preferred_name(), "Rob");
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let content = r#"
[general]
log_level = "warn"
"#;
        let file = create_temp_config(content);
        let config = ParleyConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "warn");
        // Remaining fields use defaults
        assert_eq!(config.general.data_dir, "~/.parley/data");
        assert_eq!(config.matcher.threshold, 0.5);
        assert_eq!(config.context.capacity, 30);
    }

    #[test]
    fn test_load_invalid_toml_is_config_error() {
        let file = create_temp_config("[matcher\nthreshold = ");
        let err = ParleyConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ParleyError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ParleyConfig::load(Path::new("/nonexistent/parley.toml")).unwrap_err();
        assert!(matches!(err, ParleyError::Io(_)));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = ParleyConfig::load_or_default(Path::new("/nonexistent/config.toml"));
        assert_eq!(config.general.data_dir, "~/.parley/data");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ParleyConfig::default();
        config.context.capacity = 7;
        config.matcher.weights.other = 2.5;
        config.save(&path).unwrap();

        let reloaded = ParleyConfig::load(&path).unwrap();
        assert_eq!(reloaded.context.capacity, 7);
        assert_eq!(reloaded.matcher.weights.other, 2.5);
        assert_eq!(reloaded.general.log_level, config.general.log_level);
    }
}
