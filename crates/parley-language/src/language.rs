//! The language capability contract.

use crate::objects::SentenceObjects;
use crate::sentence::Sentence;
use crate::word::Word;

/// A sentence together with its semantic partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub sentence: Sentence,
    pub objects: SentenceObjects,
}

/// Pluggable natural-language analysis.
///
/// Implementations never fail: an unrecognized word still yields a record
/// with the not-found type and its literal form as normal form.
pub trait Language: Send + Sync {
    /// Stable identifier, e.g. `parley.unified`.
    fn name(&self) -> &str;

    /// BCP 47 style locale tag such as `en`.
    fn locale(&self) -> &str;

    /// Lexical record for a single word.
    fn word(&self, literal: &str) -> Word;

    /// Tokenize and classify `text`, attaching one lexical record per token.
    fn sentence(&self, text: &str) -> Sentence {
        let sentence = Sentence::new(text);
        let words = sentence
            .tokens()
            .iter()
            .map(|t| self.word(&t.text))
            .collect();
        sentence.with_words(words)
    }

    /// Partition an analyzed sentence into the five semantic buckets.
    fn sentence_objects(&self, sentence: &Sentence) -> SentenceObjects;

    fn analyze(&self, text: &str) -> Analysis {
        let sentence = self.sentence(text);
        let objects = self.sentence_objects(&sentence);
        Analysis { sentence, objects }
    }
}
