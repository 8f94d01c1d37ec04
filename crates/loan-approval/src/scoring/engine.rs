use super::classifier::{Classifier, ClassifierError};
use super::domain::Decision;

/// Decimal places kept on the reported probability.
pub const PROBABILITY_DECIMALS: i32 = 4;

/// Thresholded classifier output for a single applicant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDecision {
    pub decision: Decision,
    /// Probability rounded to [`PROBABILITY_DECIMALS`] places.
    pub probability: f64,
    pub threshold: f64,
}

/// Score one ordered row and compare the unrounded probability against `threshold`.
pub fn decide(
    classifier: &dyn Classifier,
    row: &[f64],
    threshold: f64,
) -> Result<ScoredDecision, ClassifierError> {
    let probability = classifier.positive_probability(row)?;
    if !(0.0..=1.0).contains(&probability) {
        return Err(ClassifierError::InvalidProbability(probability));
    }

    Ok(ScoredDecision {
        decision: Decision::from_probability(probability, threshold),
        probability: round_probability(probability),
        threshold,
    })
}

/// Round half to even on the scaled value, so exact ties such as `0.03125`
/// resolve to the even neighbour (`0.0312`).
pub fn round_probability(probability: f64) -> f64 {
    let scale = 10f64.powi(PROBABILITY_DECIMALS);
    (probability * scale).round_ties_even() / scale
}
