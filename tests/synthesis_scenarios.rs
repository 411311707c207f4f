use async_trait::async_trait;
use rand::Rng;
use recipe_synth::generation::{GenerationOptions, TextGenerator};
use recipe_synth::pipeline::{SynthesisPipeline, SynthesisRequest};
use recipe_synth::repository::{load_recipes_from_json, InMemoryRecipeRepository};
use recipe_synth::scoring::ScoringEngine;
use recipe_synth::synthesis::{merge_ingredients, SynthesisRules, Synthesizer};
use recipe_synth::{GenerationError, Ingredient, Recipe, SynthesisError, SynthesisMethod};
use std::path::PathBuf;
use std::sync::Arc;

fn idli() -> Recipe {
    Recipe::new(
        "idli-1",
        "Idli – Traditional South Indian Steamed Rice Cakes",
        vec![
            Ingredient::new("Rice", 300.0, "g"),
            Ingredient::new("Urad Dal", 100.0, "g"),
            Ingredient::new("Water", 350.0, "ml"),
            Ingredient::new("Salt", 5.0, "g"),
        ],
        vec![
            "Soak rice and urad dal separately for 4 hours.".to_string(),
            "Grind both into a smooth batter.".to_string(),
            "Let the batter ferment overnight.".to_string(),
            "Add salt and steam for 12 minutes.".to_string(),
        ],
        4,
    )
}

fn rava_idli() -> Recipe {
    Recipe::new(
        "rava-idli-1",
        "Rava Idli – Quick Version",
        vec![
            Ingredient::new("Semolina", 200.0, "g"),
            Ingredient::new("Yogurt", 150.0, "g"),
            Ingredient::new("Water", 120.0, "ml"),
            Ingredient::new("Eno", 3.0, "g"),
        ],
        vec![
            "Mix semolina and yogurt to make a batter.".to_string(),
            "Add water gradually.".to_string(),
            "Add Eno and steam the batter.".to_string(),
        ],
        3,
    )
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-3
}

struct FixedReply(&'static str);

#[async_trait]
impl TextGenerator for FixedReply {
    fn model_name(&self) -> &str {
        "fixed-reply"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn idli_and_rava_idli_fallback_scenario() {
    let synthesizer = Synthesizer::default();
    let recipe = synthesizer
        .synthesize(&[idli(), rava_idli()], 5, true)
        .await
        .unwrap();

    let expected = [
        ("Rice", 375.0, "g"),
        ("Urad Dal", 125.0, "g"),
        ("Water", 318.75, "ml"),
        ("Salt", 6.25, "g"),
        ("Semolina", 333.333, "g"),
        ("Yogurt", 250.0, "g"),
        ("Eno", 5.0, "g"),
    ];
    assert_eq!(recipe.ingredients.len(), expected.len());
    for (ingredient, (name, quantity, unit)) in recipe.ingredients.iter().zip(expected) {
        assert_eq!(ingredient.name, name);
        assert!(approx(ingredient.quantity, quantity), "{}: {}", name, ingredient.quantity);
        assert_eq!(ingredient.unit, unit);
    }

    assert_eq!(
        recipe.steps,
        vec![
            "Soak rice and urad dal separately for 4–6 hours, then drain.",
            "Grind soaked rice and urad dal to a smooth batter and combine; ferment if required.",
            "Add salt. Mix gently until just combined.",
            "Steam for 12 minutes.",
        ]
    );
    assert_eq!(recipe.metadata.synthesis_method, Some(SynthesisMethod::Fallback));
    assert_eq!(recipe.metadata.sources, vec!["idli-1", "rava-idli-1"]);
    assert_eq!(recipe.metadata.ai_confidence, Some(0.84));
    assert_eq!(recipe.validator_confidence, 0.672);
    assert_eq!(recipe.servings, 5);
    assert!(recipe.approved);

    let json = serde_json::to_value(&recipe).unwrap();
    assert_eq!(json["metadata"]["synthesis_method"], "fallback:no-llm");
}

#[tokio::test]
async fn eno_is_the_only_leavening_left() {
    let source = Recipe::new(
        "khaman-2",
        "Khaman",
        vec![
            Ingredient::new("Besan", 200.0, "g"),
            Ingredient::new("Water", 150.0, "ml"),
            Ingredient::new("Baking Soda", 2.0, "g"),
            Ingredient::new("Eno", 5.0, "g"),
        ],
        vec![
            "Add water, baking soda and Eno to the besan.".to_string(),
            "Add baking soda".to_string(),
            "Add Eno".to_string(),
            "Steam for 15 minutes.".to_string(),
        ],
        4,
    );

    for reorder in [true, false] {
        let recipe = Synthesizer::default()
            .synthesize(std::slice::from_ref(&source), 4, reorder)
            .await
            .unwrap();
        let names: Vec<&str> = recipe.ingredients.iter().map(|i| i.name.as_str()).collect();
        assert!(names.contains(&"Eno"));
        assert!(!names.iter().any(|n| n.to_lowercase().contains("soda")));
        assert!(recipe.steps.iter().all(|s| !s.to_lowercase().contains("soda")));
        assert!(recipe.steps.iter().any(|s| s.contains("Eno")));
    }
}

#[tokio::test]
async fn single_source_is_not_degenerate() {
    let source = rava_idli();
    let recipe = Synthesizer::default()
        .synthesize(std::slice::from_ref(&source), source.servings, true)
        .await
        .unwrap();

    assert!(!recipe.steps.is_empty());
    assert_eq!(recipe.ingredients.len(), source.ingredients.len());
    for (merged, original) in recipe.ingredients.iter().zip(&source.ingredients) {
        assert_eq!(merged.name, original.name);
        assert!(approx(merged.quantity, original.quantity));
        assert_eq!(merged.unit, original.unit);
    }
}

#[tokio::test]
async fn leavening_cleanup_never_leaves_an_empty_recipe() {
    let source = Recipe::new(
        "fizz-1",
        "Fizz",
        vec![Ingredient::new("Eno", 3.0, "g")],
        vec!["Sprinkle soda.".to_string()],
        2,
    );
    let recipe = Synthesizer::default()
        .synthesize(std::slice::from_ref(&source), source.servings, true)
        .await
        .unwrap();
    assert!(!recipe.steps.is_empty());
    assert!(recipe.steps.iter().all(|s| !s.to_lowercase().contains("soda")));
}

#[tokio::test]
async fn zero_servings_is_fatal() {
    let mut broken = idli();
    broken.servings = 0;

    let rules = SynthesisRules::default();
    assert!(matches!(
        merge_ingredients(&rules, std::slice::from_ref(&broken), 4),
        Err(SynthesisError::InvalidInput(_))
    ));
    let result = Synthesizer::default().synthesize(&[idli(), broken], 4, true).await;
    assert!(matches!(result, Err(SynthesisError::InvalidInput(_))));
}

#[test]
fn merge_scales_linearly() {
    let rules = SynthesisRules::default();
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let quantity: f64 = rng.gen_range(0.1..1000.0);
        let servings: u32 = rng.gen_range(1..=20);
        let target: u32 = rng.gen_range(1..=50);
        let source = Recipe::new(
            "r",
            "Rice",
            vec![Ingredient::new("Rice", quantity, "g")],
            vec![],
            servings,
        );
        let merged = merge_ingredients(&rules, &[source], target).unwrap();
        let expected = quantity / f64::from(servings) * f64::from(target);
        assert!(
            (merged[0].quantity - expected).abs() <= 5e-4 + 1e-9,
            "q={} s={} k={} got {}",
            quantity,
            servings,
            target,
            merged[0].quantity
        );
    }
}

#[tokio::test]
async fn generated_sentences_are_condensed_and_prep_restored() {
    let reply = "Soak the rice and dal for 4 hours. Grind into a smooth batter! Steam the idlis for 12 minutes.";
    let synthesizer = Synthesizer::default().with_generator(Arc::new(FixedReply(reply)));
    let recipe = synthesizer.synthesize(&[idli()], 4, true).await.unwrap();

    assert_eq!(
        recipe.metadata.synthesis_method,
        Some(SynthesisMethod::Llm("fixed-reply".to_string()))
    );
    assert_eq!(
        recipe.steps,
        vec![
            "Soak rice and urad dal separately for 4–6 hours, then drain.",
            "Grind soaked rice and urad dal to a smooth batter and combine; ferment if required.",
            "Steam for 12 minutes.",
        ]
    );
}

#[tokio::test]
async fn pipeline_over_sample_data() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/sample_recipes.json");
    let repository: InMemoryRecipeRepository =
        load_recipes_from_json(&path).unwrap().into_iter().collect();
    assert_eq!(repository.pending().len(), 1);

    let pipeline = SynthesisPipeline::new(repository, ScoringEngine::default(), Synthesizer::default());
    let recipe = pipeline
        .run(&SynthesisRequest::new("idli").with_servings(5))
        .await
        .unwrap();

    assert_eq!(recipe.metadata.sources, vec!["idli-classic", "rava-idli-quick"]);
    assert_eq!(
        recipe.title,
        "Synthesized — Idli – Traditional South Indian Steamed Rice Cakes (for 5 servings)"
    );
    assert_eq!(recipe.steps.len(), 4);
    assert_eq!(recipe.total_minutes(), 12);

    let missing = pipeline.run(&SynthesisRequest::new("biryani")).await;
    assert!(matches!(missing, Err(SynthesisError::InvalidInput(_))));
}
