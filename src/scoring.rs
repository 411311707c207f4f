//! Weighted ranking of candidate recipes.
//!
//! Six signals, each normalised to `[0, 1]`, are blended with a configurable
//! weight set. Weights need not sum to one, so scores are only comparable
//! under the same `ScoringWeights`.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;

const RATING_SCALE: f64 = 5.0;
const AUTHENTICITY_MAX: f64 = 1.0;
const AUTHENTICITY_PENALTY: f64 = 0.2;
const POPULARITY_CEILING: f64 = 1000.0;
const DEFAULT_AI_CONFIDENCE: f64 = 0.5;
const MAX_EASY_SERVINGS: u32 = 12;
const MAX_BATCH_SERVINGS: u32 = 50;
const SCALABILITY_FULL: f64 = 1.0;
const SCALABILITY_PARTIAL: f64 = 0.8;
const SCALABILITY_LOW: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    UserRating,
    ValidatorConfidence,
    IngredientAuthenticity,
    ServingScalability,
    Popularity,
    AiConfidence,
}

impl Signal {
    pub const ALL: [Signal; 6] = [
        Signal::UserRating,
        Signal::ValidatorConfidence,
        Signal::IngredientAuthenticity,
        Signal::ServingScalability,
        Signal::Popularity,
        Signal::AiConfidence,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub user_rating: f64,
    pub validator_confidence: f64,
    pub ingredient_authenticity: f64,
    pub serving_scalability: f64,
    pub popularity: f64,
    pub ai_confidence: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            user_rating: 0.30,
            validator_confidence: 0.20,
            ingredient_authenticity: 0.15,
            serving_scalability: 0.15,
            popularity: 0.10,
            ai_confidence: 0.10,
        }
    }
}

impl ScoringWeights {
    pub fn weight(&self, signal: Signal) -> f64 {
        match signal {
            Signal::UserRating => self.user_rating,
            Signal::ValidatorConfidence => self.validator_confidence,
            Signal::IngredientAuthenticity => self.ingredient_authenticity,
            Signal::ServingScalability => self.serving_scalability,
            Signal::Popularity => self.popularity,
            Signal::AiConfidence => self.ai_confidence,
        }
    }

    pub fn total(&self) -> f64 {
        Signal::ALL.iter().map(|s| self.weight(*s)).sum()
    }
}

/// Every sub-score of one recipe, before weighting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub user_rating: f64,
    pub validator_confidence: f64,
    pub ingredient_authenticity: f64,
    pub serving_scalability: f64,
    pub popularity: f64,
    pub ai_confidence: f64,
}

impl ScoreBreakdown {
    pub fn component(&self, signal: Signal) -> f64 {
        match signal {
            Signal::UserRating => self.user_rating,
            Signal::ValidatorConfidence => self.validator_confidence,
            Signal::IngredientAuthenticity => self.ingredient_authenticity,
            Signal::ServingScalability => self.serving_scalability,
            Signal::Popularity => self.popularity,
            Signal::AiConfidence => self.ai_confidence,
        }
    }

    pub fn weighted_total(&self, weights: &ScoringWeights) -> f64 {
        Signal::ALL
            .iter()
            .map(|s| weights.weight(*s) * self.component(*s))
            .sum()
    }
}

#[derive(Debug, Clone)]
pub struct RankedRecipe<'a> {
    pub recipe: &'a Recipe,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Average user rating mapped from the 0-5 scale onto `[0, 1]`.
    pub fn user_rating_score(&self, recipe: &Recipe) -> f64 {
        (recipe.avg_rating() / RATING_SCALE).clamp(0.0, 1.0)
    }

    pub fn validator_confidence_score(&self, recipe: &Recipe) -> f64 {
        recipe.validator_confidence
    }

    /// Starts at the maximum and loses a fixed penalty for every ingredient
    /// with no unit or a non-positive quantity.
    pub fn ingredient_authenticity_score(&self, recipe: &Recipe) -> f64 {
        let flawed = recipe
            .ingredients
            .iter()
            .filter(|i| i.unit.trim().is_empty() || i.quantity <= 0.0)
            .count();
        (AUTHENTICITY_MAX - AUTHENTICITY_PENALTY * flawed as f64).max(0.0)
    }

    /// Household-sized recipes score full marks; large batches are harder to
    /// scale reliably.
    pub fn serving_scalability_score(&self, recipe: &Recipe) -> f64 {
        match recipe.servings {
            1..=MAX_EASY_SERVINGS => SCALABILITY_FULL,
            // 0 is not rejected here; it lands in the partial band with 13..=50
            0..=MAX_BATCH_SERVINGS => SCALABILITY_PARTIAL,
            _ => SCALABILITY_LOW,
        }
    }

    pub fn popularity_score(&self, recipe: &Recipe) -> f64 {
        (f64::from(recipe.popularity) / POPULARITY_CEILING).min(1.0)
    }

    pub fn ai_confidence_score(&self, recipe: &Recipe) -> f64 {
        recipe
            .metadata
            .ai_confidence
            .unwrap_or(DEFAULT_AI_CONFIDENCE)
    }

    pub fn breakdown(&self, recipe: &Recipe) -> ScoreBreakdown {
        ScoreBreakdown {
            user_rating: self.user_rating_score(recipe),
            validator_confidence: self.validator_confidence_score(recipe),
            ingredient_authenticity: self.ingredient_authenticity_score(recipe),
            serving_scalability: self.serving_scalability_score(recipe),
            popularity: self.popularity_score(recipe),
            ai_confidence: self.ai_confidence_score(recipe),
        }
    }

    pub fn score(&self, recipe: &Recipe) -> f64 {
        self.breakdown(recipe).weighted_total(&self.weights)
    }

    /// Scores every candidate and sorts by descending score. Ties keep input
    /// order.
    pub fn rank<'a>(&self, recipes: &'a [Recipe]) -> Vec<RankedRecipe<'a>> {
        let mut ranked: Vec<RankedRecipe<'a>> = recipes
            .par_iter()
            .map(|recipe| {
                let breakdown = self.breakdown(recipe);
                RankedRecipe {
                    recipe,
                    score: breakdown.weighted_total(&self.weights),
                    breakdown,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    pub fn top_k<'a>(&self, recipes: &'a [Recipe], k: usize) -> Vec<&'a Recipe> {
        self.rank(recipes)
            .into_iter()
            .take(k)
            .map(|r| r.recipe)
            .collect()
    }
}
