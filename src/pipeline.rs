//! Dish-name request to synthesized recipe.
//!
//! Looks the dish up in a [`RecipeSource`], keeps approved recipes, ranks them
//! with the [`ScoringEngine`] and hands the top-K to the [`Synthesizer`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SynthesisError;
use crate::recipe::Recipe;
use crate::repository::RecipeSource;
use crate::scoring::ScoringEngine;
use crate::synthesis::Synthesizer;

fn default_servings() -> u32 {
    2
}

fn default_top_k() -> usize {
    10
}

fn default_reorder() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub dish_name: String,
    #[serde(default = "default_servings")]
    pub servings: u32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_reorder")]
    pub reorder: bool,
}

impl SynthesisRequest {
    pub fn new(dish_name: impl Into<String>) -> Self {
        Self {
            dish_name: dish_name.into(),
            servings: default_servings(),
            top_k: default_top_k(),
            reorder: default_reorder(),
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = servings;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_reorder(mut self, reorder: bool) -> Self {
        self.reorder = reorder;
        self
    }
}

pub struct SynthesisPipeline<S: RecipeSource> {
    source: S,
    scoring: ScoringEngine,
    synthesizer: Synthesizer,
}

impl<S: RecipeSource> SynthesisPipeline<S> {
    pub fn new(source: S, scoring: ScoringEngine, synthesizer: Synthesizer) -> Self {
        Self {
            source,
            scoring,
            synthesizer,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Approved candidates for the dish, best first, at most `top_k` of them.
    pub fn select_candidates(&self, request: &SynthesisRequest) -> Vec<Recipe> {
        let candidates: Vec<Recipe> = self
            .source
            .find_by_title(&request.dish_name)
            .into_iter()
            .filter(|r| r.approved)
            .collect();
        debug!(
            dish = %request.dish_name,
            approved = candidates.len(),
            "collected candidate recipes"
        );

        let ranked = self.scoring.rank(&candidates);
        for (position, entry) in ranked.iter().take(request.top_k).enumerate() {
            info!(
                rank = position + 1,
                id = %entry.recipe.id,
                title = %entry.recipe.title,
                score = entry.score,
                "ranked candidate"
            );
        }
        ranked
            .into_iter()
            .take(request.top_k)
            .map(|entry| entry.recipe.clone())
            .collect()
    }

    pub async fn run(&self, request: &SynthesisRequest) -> Result<Recipe, SynthesisError> {
        if request.top_k == 0 {
            return Err(SynthesisError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }
        let selected = self.select_candidates(request);
        if selected.is_empty() {
            return Err(SynthesisError::InvalidInput(format!(
                "no approved recipes found for '{}'",
                request.dish_name
            )));
        }
        self.synthesizer
            .synthesize(&selected, request.servings, request.reorder)
            .await
    }
}
