use anyhow::{Context, Result};
use recipe_synth::api_connection::Provider;
use recipe_synth::cli::parse_args;
use recipe_synth::config::AppConfig;
use recipe_synth::generation::OpenRouterGenerator;
use recipe_synth::pipeline::{SynthesisPipeline, SynthesisRequest};
use recipe_synth::repository::{load_recipes_from_json, InMemoryRecipeRepository};
use recipe_synth::scoring::{ScoringEngine, ScoringWeights};
use recipe_synth::synthesis::{SynthesisRules, Synthesizer};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

async fn read_json_or_default<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    let Some(path) = path else {
        return Ok(T::default());
    };
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse '{}'", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipe_synth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli_args = parse_args();
    let config = AppConfig::from_env().context("Invalid environment configuration")?;

    let recipes = load_recipes_from_json(&cli_args.recipes)
        .with_context(|| format!("Failed to load recipes from '{}'", cli_args.recipes.display()))?;
    info!(count = recipes.len(), "recipes loaded");
    let repository: InMemoryRecipeRepository = recipes.into_iter().collect();

    let rules: SynthesisRules = read_json_or_default(cli_args.rules.as_deref()).await?;
    let weights: ScoringWeights = read_json_or_default(cli_args.weights.as_deref()).await?;

    let mut synthesizer = Synthesizer::new(rules).with_generation_timeout(config.generation_timeout);
    if cli_args.offline {
        info!("offline mode, text generation disabled");
    } else {
        let provider = Provider::openrouter(&config.api_key_env_var)
            .with_base_url(config.base_url.as_str())
            .with_timeout(config.generation_timeout);
        if !provider.has_api_key() {
            warn!(
                key = %config.api_key_env_var,
                "API key not set, synthesis will use the deterministic fallback"
            );
        }
        if !provider
            .get_available_models()
            .iter()
            .any(|m| m.model_name == config.model)
        {
            warn!(model = %config.model, "model is not in the known OpenRouter list");
        }
        synthesizer = synthesizer.with_generator(Arc::new(OpenRouterGenerator::new(
            provider,
            config.model.as_str(),
        )));
    }

    let pipeline = SynthesisPipeline::new(repository, ScoringEngine::new(weights), synthesizer);
    let request = SynthesisRequest::new(cli_args.dish.as_str())
        .with_servings(cli_args.servings)
        .with_top_k(cli_args.top_k)
        .with_reorder(!cli_args.no_reorder);

    let recipe = pipeline
        .run(&request)
        .await
        .with_context(|| format!("Failed to synthesize a recipe for '{}'", request.dish_name))?;

    println!("{}", serde_json::to_string_pretty(&recipe)?);
    Ok(())
}
