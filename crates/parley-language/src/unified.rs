use crate::language::Language;
use crate::objects::{Category, SentenceObject, SentenceObjects};
use crate::sentence::Sentence;
use crate::word::Word;

/// Language-agnostic fallback: no dictionary, every word is unknown and lands
/// in the object bucket. Matching then degrades to literal and
/// case-insensitive word comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedLanguage;

impl Language for UnifiedLanguage {
    fn name(&self) -> &str {
        "parley.unified"
    }

    fn locale(&self) -> &str {
        "und"
    }

    fn word(&self, literal: &str) -> Word {
        Word::unknown(literal)
    }

    fn sentence_objects(&self, sentence: &Sentence) -> SentenceObjects {
        let mut objects = SentenceObjects::default();
        for word in sentence.words() {
            objects.push(Category::Object, SentenceObject::new(word.clone()));
        }
        objects
    }
}
