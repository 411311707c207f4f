use super::phases::has_time_or_temp;
use super::round3;

const BASE: f64 = 0.45;
const PER_SOURCE: f64 = 0.08;
const MAX_SOURCE_BONUS: f64 = 0.25;
const PER_STEP: f64 = 0.02;
const MAX_STEP_BONUS: f64 = 0.2;
const TIMING_BONUS: f64 = 0.15;
const TERSE_PENALTY: f64 = 0.1;
const TERSE_WORD_COUNT: usize = 30;
const MAX_CONFIDENCE: f64 = 0.99;
const VALIDATOR_DISCOUNT: f64 = 0.8;

/// Heuristic confidence for a synthesized recipe, in `[0, 0.99]`.
///
/// Rewards more sources, more steps and explicit timings; penalises a terse
/// generated text. Not a calibrated probability.
pub fn compute_ai_confidence(num_sources: usize, steps: &[String], generated_text: &str) -> f64 {
    let source_bonus = (PER_SOURCE * num_sources as f64).min(MAX_SOURCE_BONUS);
    let step_bonus = (PER_STEP * steps.len() as f64).min(MAX_STEP_BONUS);
    let timing_bonus = if steps.iter().any(|s| has_time_or_temp(s)) {
        TIMING_BONUS
    } else {
        0.0
    };
    let terse_penalty = if generated_text.split_whitespace().count() < TERSE_WORD_COUNT {
        TERSE_PENALTY
    } else {
        0.0
    };
    let confidence = BASE + source_bonus + step_bonus + timing_bonus - terse_penalty;
    round3(confidence.clamp(0.0, MAX_CONFIDENCE))
}

/// AI confidence discounted to the scale a human validator's signal uses.
pub fn validator_confidence(ai_confidence: f64) -> f64 {
    round3((ai_confidence * VALIDATOR_DISCOUNT).min(1.0))
}
