use thiserror::Error;

use crate::api_connection::connection::ApiConnectionError;

/// Errors surfaced to callers of the synthesis core.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Empty source list, zero servings (requested or on a source), or a
    /// pipeline request with no matching approved recipe.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The text generator answered but nothing usable could be parsed out of it.
    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

/// Failures of the text-generation capability.
///
/// These never leave the synthesizer: every variant sends it down the
/// deterministic fallback path.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation is unavailable: {0}")]
    Unavailable(String),

    #[error("text generation timed out after {0} seconds")]
    Timeout(u64),

    #[error(transparent)]
    Api(#[from] ApiConnectionError),

    #[error("text generation returned no content")]
    EmptyResponse,
}
