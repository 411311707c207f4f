use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::canonical::{canonical_name, canonicalize_step_text, normalize_whitespace};
use super::confidence::{compute_ai_confidence, validator_confidence};
use super::ingredients::merge_ingredients;
use super::parsing::parse_generated_steps;
use super::phases::{classify_phase, reorder_steps, Phase};
use super::rules::{CompiledRules, SynthesisRules};
use super::steps::{
    backfill_prep_lines, dedup_steps, generate_prep_from_ingredients, merge_semantic_steps,
    remove_invalid_leavening_from_steps,
};
use crate::error::{GenerationError, SynthesisError};
use crate::generation::{GenerationOptions, TextGenerator};
use crate::recipe::{Ingredient, Recipe, RecipeMetadata, SynthesisMethod};

const FALLBACK_STEP_LIMIT: usize = 6;

/// Builds one new recipe out of several source recipes.
///
/// Holds only configuration (rule tables, the optional generator and its
/// options); every `synthesize` call is independent, so one instance can be
/// shared across tasks.
pub struct Synthesizer {
    rules: CompiledRules,
    generator: Option<Arc<dyn TextGenerator>>,
    options: GenerationOptions,
    generation_timeout: Option<Duration>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(SynthesisRules::default())
    }
}

impl Synthesizer {
    pub fn new(rules: SynthesisRules) -> Self {
        Self {
            rules: CompiledRules::new(rules),
            generator: None,
            options: GenerationOptions::default(),
            generation_timeout: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_generation_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// A generate call running longer than this counts as "unavailable".
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    pub fn rules(&self) -> &SynthesisRules {
        self.rules.rules()
    }

    pub fn canonical_name(&self, name: &str) -> String {
        canonical_name(&self.rules, name)
    }

    pub fn classify_phase(&self, step: &str) -> Phase {
        classify_phase(&self.rules, step)
    }

    pub fn reorder_steps(&self, steps: &[String]) -> Vec<String> {
        reorder_steps(&self.rules, steps)
    }

    pub fn merge_semantic_steps(&self, steps: &[String]) -> Vec<String> {
        merge_semantic_steps(&self.rules, steps)
    }

    pub fn merge_ingredients(
        &self,
        recipes: &[Recipe],
        target_servings: u32,
    ) -> Result<Vec<Ingredient>, SynthesisError> {
        merge_ingredients(&self.rules, recipes, target_servings)
    }

    pub fn generate_prep_from_ingredients(&self, ingredients: &[Ingredient]) -> Vec<String> {
        generate_prep_from_ingredients(&self.rules, ingredients)
    }

    /// Prompt asking the generator to condense the step pool.
    pub fn build_prompt(&self, steps: &[String], requested_servings: u32) -> String {
        let source = steps
            .iter()
            .map(|s| format!("- {}", s))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Combine the following cooking actions into one clear, merged recipe for {} servings.\n\n\
             Write 4–8 numbered steps. Keep steps short (one sentence each). Do NOT add new ingredients or quantities.\n\
             Try to include times/temperatures when they are present in the source actions.\n\n\
             Source actions:\n{}\n\n\
             Output (begin with '1. '):\n1. ",
            requested_servings, source
        )
    }

    pub async fn synthesize(
        &self,
        top_recipes: &[Recipe],
        requested_servings: u32,
        reorder: bool,
    ) -> Result<Recipe, SynthesisError> {
        let Some(first) = top_recipes.first() else {
            return Err(SynthesisError::InvalidInput(
                "no recipes provided for synthesis".to_string(),
            ));
        };
        info!(
            sources = top_recipes.len(),
            requested_servings, reorder, "starting recipe synthesis"
        );

        let merged_ingredients = self.merge_ingredients(top_recipes, requested_servings)?;
        let prep_lines = self.generate_prep_from_ingredients(&merged_ingredients);
        debug!(prep_lines = prep_lines.len(), "generated prep lines from ingredients");

        let mut step_pool = prep_lines.clone();
        for recipe in top_recipes {
            for step in &recipe.steps {
                step_pool.push(canonicalize_step_text(&self.rules, &normalize_whitespace(step)));
            }
        }

        let prompt = self.build_prompt(&step_pool, requested_servings);

        let (lines, generated_text, method) = match self.try_generate(&prompt).await {
            Some((model, generated)) => {
                let parsed = parse_generated_steps(&generated);
                if parsed.is_empty() {
                    return Err(SynthesisError::Synthesis(
                        "model produced no usable output".to_string(),
                    ));
                }
                debug!(parsed = parsed.len(), "parsed generated steps");
                let lines: Vec<String> = parsed
                    .iter()
                    .map(|s| canonicalize_step_text(&self.rules, &normalize_whitespace(s)))
                    .collect();
                let lines = self.post_process(lines, &merged_ingredients, &prep_lines, reorder);
                (lines, generated, SynthesisMethod::Llm(model))
            }
            None => {
                let mut lines: Vec<String> = dedup_steps(&step_pool)
                    .into_iter()
                    .take(FALLBACK_STEP_LIMIT)
                    .collect();
                if lines.is_empty() {
                    lines.push(self.rules.default_instruction.clone());
                }
                let lines = self.post_process(lines, &merged_ingredients, &prep_lines, reorder);
                let generated = lines.join("\n");
                (lines, generated, SynthesisMethod::Fallback)
            }
        };

        let ai_confidence = compute_ai_confidence(top_recipes.len(), &lines, &generated_text);
        let title_base = first.title.split(':').next().unwrap_or_default().trim();
        let title = format!(
            "Synthesized — {} (for {} servings)",
            title_base, requested_servings
        );

        info!(
            steps = lines.len(),
            ingredients = merged_ingredients.len(),
            ai_confidence,
            method = %method,
            "recipe synthesis finished"
        );

        Ok(Recipe {
            id: Uuid::new_v4().to_string(),
            title,
            ingredients: merged_ingredients,
            steps: lines,
            servings: requested_servings,
            metadata: RecipeMetadata {
                sources: top_recipes.iter().map(|r| r.id.clone()).collect(),
                ai_confidence: Some(ai_confidence),
                synthesis_method: Some(method),
            },
            validator_confidence: validator_confidence(ai_confidence),
            approved: true,
            ratings: Vec::new(),
            popularity: 0,
        })
    }

    /// Shared tail of both paths: reorder, condense, drop redundant leavening,
    /// restore lost prep lines. Never returns an empty list.
    fn post_process(
        &self,
        lines: Vec<String>,
        ingredients: &[Ingredient],
        prep_lines: &[String],
        reorder: bool,
    ) -> Vec<String> {
        let lines = if reorder {
            self.reorder_steps(&lines)
        } else {
            lines
        };
        let lines = self.merge_semantic_steps(&lines);
        let lines = remove_invalid_leavening_from_steps(&self.rules, lines, ingredients);
        let lines = backfill_prep_lines(lines, prep_lines);
        if lines.is_empty() {
            debug!("no steps survived post-processing, using the default instruction");
            return vec![self.rules.default_instruction.clone()];
        }
        lines
    }

    /// Model name and raw output, or `None` when the fallback path should run.
    async fn try_generate(&self, prompt: &str) -> Option<(String, String)> {
        let Some(generator) = self.generator.as_ref() else {
            debug!("no text generator configured, using fallback");
            return None;
        };
        let model = generator.model_name().to_string();
        if !generator.is_available() {
            warn!(model = %model, "text generator unavailable, using fallback");
            return None;
        }

        let call = generator.generate(prompt, &self.options);
        let result = match self.generation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(limit.as_secs())),
            },
            None => call.await,
        };

        match result {
            Ok(text) => Some((model, text)),
            Err(e) => {
                warn!(model = %model, error = %e, "text generation failed, using fallback");
                None
            }
        }
    }
}
