// Answer generation backends
// One hosted chat model is chosen at startup and used for every question


pub mod gemini;
pub mod groq;

pub use gemini::GeminiClient;
pub use groq::GroqClient;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GenerationConfig;
use crate::{RagError, Result};

/// Produces an answer for a fully built prompt
pub trait Generator: Send + Sync {
    fn model_name(&self) -> &str;

    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Groq,
    Gemini,
}

impl Backend {
    pub const ALL: [Self; 2] = [Self::Groq, Self::Gemini];

    #[inline]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Groq => "moonshotai/kimi-k2-instruct-0905",
            Self::Gemini => "gemini-2.0-flash",
        }
    }

    #[inline]
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Groq => "https://api.groq.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Environment variable holding the API key
    #[inline]
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Groq => "GROQ_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Groq => "groq",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for Backend {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the configured backend, reading its API key from the environment
#[inline]
pub fn from_config(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    let env_var = config.backend.api_key_env();
    let api_key = std::env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            RagError::Config(format!(
                "{env_var} is not set; it is required for the {} backend",
                config.backend
            ))
        })?;

    Ok(with_api_key(config, api_key))
}

#[inline]
pub fn with_api_key(config: &GenerationConfig, api_key: String) -> Box<dyn Generator> {
    info!(
        "Using {} backend with model {}",
        config.backend,
        config.model_name()
    );
    match config.backend {
        Backend::Groq => Box::new(GroqClient::new(config, api_key)),
        Backend::Gemini => Box::new(GeminiClient::new(config, api_key)),
    }
}
