//! Word and bucket comparison.

use parley_core::WeightSet;
use parley_language::{SentenceObject, Word};

/// Score and achievable maximum for one word pair.
///
/// Exact and normal-form agreement always count towards the maximum;
/// synonymy only counts when present, so words without synonyms are not
/// penalized for lacking them.
fn compare_words(
    weights: &WeightSet,
    element: &Word,
    target: &Word,
    multiplier: f32,
) -> (f32, f32) {
    let mut score = 0.0;
    let mut max = 0.0;

    max += multiplier * weights.word_exact;
    if element.equals_exact(target) {
        score += multiplier * weights.word_exact;
    }

    max += multiplier * weights.word_same;
    if element.equals_normal_form(target) {
        score += multiplier * weights.word_same;
    }

    if element.equals_synonym(target) {
        score += multiplier * weights.word_synonym;
        max += multiplier * weights.word_synonym;
    }

    (score, max)
}

fn compare_objects(
    weights: &WeightSet,
    element: &SentenceObject,
    target: &SentenceObject,
) -> (f32, f32) {
    let (mut score, mut max) =
        compare_words(weights, &element.main, &target.main, weights.main_word_multiplier);
    if let (Some(element), Some(target)) = (&element.compound, &target.compound) {
        let (s, m) = compare_words(weights, element, target, weights.compound_word_multiplier);
        score += s;
        max += m;
    }
    (score, max)
}

/// Compare two buckets: every target item is paired with the element that
/// matches it best (by ratio), and the pairs' scores and maxima are summed.
///
/// A target item no element matches contributes
/// [`WeightSet::unmatched_target`] to the maximum and nothing to the score.
pub(crate) fn compare_buckets(
    weights: &WeightSet,
    elements: &[SentenceObject],
    targets: &[SentenceObject],
) -> (f32, f32) {
    let mut score = 0.0;
    let mut max = 0.0;

    for target in targets {
        let mut best_score = 0.0_f32;
        let mut best_max = weights.unmatched_target;
        for element in elements {
            let (s, m) = compare_objects(weights, element, target);
            if m > 0.0 && s / m > best_score / best_max.max(f32::MIN_POSITIVE) {
                best_score = s;
                best_max = m;
            }
        }
        score += best_score;
        max += best_max;
    }

    (score, max)
}
