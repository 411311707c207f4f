//! Text-generation capability consumed by the synthesizer.
//!
//! The synthesizer only needs "prompt in, text out". Anything that can do that
//! implements [`TextGenerator`]; [`OpenRouterGenerator`] is the HTTP-backed one
//! used by the binary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api_connection::endpoints::{ChatCompletionRequest, ChatMessage, Provider};
use crate::error::GenerationError;

/// Sampling options passed along with every prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub max_new_tokens: u32,
    pub do_sample: bool,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: 180,
            do_sample: true,
            temperature: 0.35,
            top_p: 0.9,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier, recorded in the synthesized recipe's metadata.
    fn model_name(&self) -> &str;

    /// Whether the capability can be called at all. When false the caller
    /// should not even try `generate`.
    fn is_available(&self) -> bool;

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}

const SYSTEM_PROMPT: &str = "/no_thinking
You are a careful cooking assistant. You rewrite cooking instructions into short numbered steps.
Answer with the numbered list only, without any introduction, notes or markdown.";

pub struct OpenRouterGenerator {
    provider: Provider,
    model: String,
}

impl OpenRouterGenerator {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenRouterGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn is_available(&self) -> bool {
        self.provider.has_api_key()
    }

    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        if !self.is_available() {
            return Err(GenerationError::Unavailable(format!(
                "no API key configured for {}",
                self.model
            )));
        }
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)],
            // greedy decoding when sampling is off
            temperature: Some(if options.do_sample { options.temperature } else { 0.0 }),
            top_p: options.do_sample.then_some(options.top_p),
            max_tokens: Some(options.max_new_tokens),
        };
        let response = self.provider.call_chat_completion(request).await?;
        let content = response
            .first_content()
            .ok_or(GenerationError::EmptyResponse)?
            .to_string();
        debug!(model = %self.model, chars = content.len(), "generation finished");
        Ok(content)
    }
}
