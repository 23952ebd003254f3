use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Generator;
use crate::config::GenerationConfig;
use crate::http::HttpClient;
use crate::{RagError, Result};

const CHAT_COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

/// Groq's OpenAI-compatible chat completions API
#[derive(Debug, Clone)]
pub struct GroqClient {
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    authorization: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl GroqClient {
    #[inline]
    pub fn new(config: &GenerationConfig, api_key: String) -> Self {
        Self {
            endpoint: format!(
                "{}{}",
                config.base_url().trim_end_matches('/'),
                CHAT_COMPLETIONS_PATH
            ),
            model: config.model_name().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            authorization: format!("Bearer {api_key}"),
            http: HttpClient::new(Duration::from_secs(config.timeout_secs)),
        }
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.http = self.http.with_retry_attempts(attempts);
        self
    }
}

impl Generator for GroqClient {
    #[inline]
    fn model_name(&self) -> &str {
        &self.model
    }

    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Requesting chat completion from {}", self.model);
        let body = self
            .http
            .post_json(
                &self.endpoint,
                &request,
                &[("Authorization", self.authorization.as_str())],
            )
            .map_err(|e| RagError::Generation(format!("Groq request failed: {e}")))?;

        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RagError::Generation(format!("Unexpected Groq response: {e}")))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| RagError::Generation("Groq returned no answer".to_string()))
    }
}
