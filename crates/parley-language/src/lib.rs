//! Language capability for Parley.
//!
//! Turns raw text into analyzed sentences (tokens plus per-token lexical data)
//! and partitions them into the five semantic buckets the matcher compares.

pub mod error;
pub mod language;
pub mod lexicon;
pub mod objects;
pub mod sentence;
pub mod unified;
pub mod word;

pub use error::LanguageError;
pub use language::{Analysis, Language};
pub use lexicon::{LexiconEntry, LexiconLanguage, PartOfSpeech};
pub use objects::{Category, SentenceObject, SentenceObjects};
pub use sentence::{split_trigger, strip_parameters, tokenize, Sentence, SentenceKind, Token};
pub use unified::UnifiedLanguage;
pub use word::{Word, NOT_FOUND};
