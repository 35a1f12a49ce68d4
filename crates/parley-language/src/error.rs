//! Error types for language capabilities.

/// Errors from building or loading a language.
#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error("Failed to read lexicon: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse lexicon: {0}")]
    Parse(String),
    #[error("Lexicon entry has an empty form")]
    EmptyForm,
}

impl From<toml::de::Error> for LanguageError {
    fn from(err: toml::de::Error) -> Self {
        LanguageError::Parse(err.to_string())
    }
}
