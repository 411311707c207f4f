use dotenv::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

use crate::api_connection::endpoints::OPENROUTER_CHAT_URL;

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV_VAR: &str = "RECIPE_SYNTH_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "RECIPE_SYNTH_TIMEOUT_SECS";
pub const BASE_URL_ENV_VAR: &str = "OPENROUTER_BASE_URL";

const DEFAULT_MODEL: &str = "qwen/qwen3-32b";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: String, value: String },
}

/// Runtime settings read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Name of the variable holding the OpenRouter key.
    pub api_key_env_var: String,
    pub model: String,
    pub generation_timeout: Duration,
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            model: DEFAULT_MODEL.to_string(),
            generation_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            base_url: OPENROUTER_CHAT_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let generation_timeout = match read(TIMEOUT_ENV_VAR) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: TIMEOUT_ENV_VAR.to_string(),
                        value: raw,
                    })
                }
            },
            None => defaults.generation_timeout,
        };

        Ok(Self {
            api_key_env_var: defaults.api_key_env_var,
            model: read(MODEL_ENV_VAR).unwrap_or(defaults.model),
            generation_timeout,
            base_url: read(BASE_URL_ENV_VAR).unwrap_or(defaults.base_url),
        })
    }
}
