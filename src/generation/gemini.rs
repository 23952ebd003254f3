use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Generator;
use crate::config::GenerationConfig;
use crate::http::HttpClient;
use crate::{RagError, Result};

/// Google Gemini `generateContent` API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: String,
    http: HttpClient,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationParams,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParams {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    #[inline]
    pub fn new(config: &GenerationConfig, api_key: String) -> Self {
        let model = config.model_name().to_string();
        Self {
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url().trim_end_matches('/'),
                model
            ),
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key,
            http: HttpClient::new(Duration::from_secs(config.timeout_secs)),
        }
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.http = self.http.with_retry_attempts(attempts);
        self
    }
}

impl Generator for GeminiClient {
    #[inline]
    fn model_name(&self) -> &str {
        &self.model
    }

    #[inline]
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationParams {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        debug!("Requesting content generation from {}", self.model);
        let body = self
            .http
            .post_json(
                &self.endpoint,
                &request,
                &[("x-goog-api-key", self.api_key.as_str())],
            )
            .map_err(|e| RagError::Generation(format!("Gemini request failed: {e}")))?;

        let response: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| RagError::Generation(format!("Unexpected Gemini response: {e}")))?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).join(""))
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(RagError::Generation(
                "Gemini returned no answer".to_string(),
            ));
        }
        Ok(text)
    }
}
