//! Softmax and multinomial sampling over filtered logits.

use crate::errors::ChitchatError;
use rand::Rng;

/// Convert logits to probabilities in place (max-subtraction for stability).
/// Masked entries (negative infinity) become zero probability. Fails when no
/// finite mass remains, which is the degenerate-filter condition.
pub fn softmax_in_place(logits: &mut [f32]) -> Result<(), ChitchatError> {
    let max_logit = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max_logit.is_finite() {
        return Err(ChitchatError::InvalidFilterConfig(
            "no finite logits left to sample from".to_string(),
        ));
    }
    let mut sum = 0.0f32;
    for value in logits.iter_mut() {
        *value = (*value - max_logit).exp();
        sum += *value;
    }
    if !(sum > 0.0) || !sum.is_finite() {
        return Err(ChitchatError::InvalidFilterConfig(
            "probability mass collapsed to zero".to_string(),
        ));
    }
    for value in logits.iter_mut() {
        *value /= sum;
    }
    Ok(())
}

/// Draw one index from a probability distribution, weighted by probability.
/// Zero-probability entries can never be returned.
pub fn sample_multinomial(probs: &[f32], rng: &mut impl Rng) -> Result<u32, ChitchatError> {
    let draw: f32 = rng.gen();
    let mut cumulative = 0.0f32;
    let mut last_positive = None;
    for (index, &prob) in probs.iter().enumerate() {
        if prob <= 0.0 {
            continue;
        }
        cumulative += prob;
        last_positive = Some(index as u32);
        if draw < cumulative {
            return Ok(index as u32);
        }
    }
    // Rounding can leave the final cumulative just below the draw.
    last_positive.ok_or_else(|| {
        ChitchatError::InvalidFilterConfig("probability mass collapsed to zero".to_string())
    })
}
