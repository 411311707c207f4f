pub mod api_connection;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod recipe;
pub mod repository;
pub mod scoring;
pub mod synthesis;

pub use error::{GenerationError, SynthesisError};
pub use recipe::{Ingredient, Recipe, RecipeMetadata, SynthesisMethod};
