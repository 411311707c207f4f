pub mod canonical;
pub mod confidence;
pub mod ingredients;
pub mod parsing;
pub mod phases;
pub mod rules;
pub mod steps;
pub mod synthesizer;

pub use canonical::{canonical_name, canonicalize_step_text};
pub use confidence::{compute_ai_confidence, validator_confidence};
pub use ingredients::merge_ingredients;
pub use phases::{classify_phase, has_time_or_temp, reorder_steps, Phase};
pub use rules::{CompiledRules, SynthesisRules};
pub use steps::{generate_prep_from_ingredients, merge_semantic_steps};
pub use synthesizer::Synthesizer;

/// Rounds to three decimal places.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
