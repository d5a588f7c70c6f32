use crate::context::CHUNK_DELIMITER;
use crate::error::{AnswerError, Result};
use crate::prompt::{PromptBuilder, NOT_FOUND_SENTINEL};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request envelope shared by generator backends
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub temperature: f32,
}

/// Text generation backend
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String>;
}

/// Generator backed by the Ollama `/api/generate` endpoint (non-streaming)
pub struct OllamaGenerator {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

impl OllamaGenerator {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnswerError::generation_service(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        log::debug!(
            "Generating with {} (temperature {}, prompt {} chars)",
            request.model,
            request.temperature,
            request.prompt.chars().count()
        );
        let body = GenerateRequest {
            model: request.model,
            prompt: request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
            },
        };
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                AnswerError::generation_service(format!("request to {} failed: {e}", self.endpoint))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(AnswerError::generation_service(format!(
                "{} returned {status}: {text}",
                self.endpoint
            )));
        }

        let parsed: GenerateResponse = resp.json().await.map_err(|e| {
            AnswerError::generation_service(format!("malformed generation response: {e}"))
        })?;
        parsed.response.ok_or_else(|| {
            AnswerError::generation_service("generation response is missing the `response` field")
        })
    }
}

/// Offline generator that follows the grounding policy mechanically.
///
/// Replies with [`NOT_FOUND_SENTINEL`] when the prompt carries no context
/// and otherwise echoes the first context block.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubGenerator;

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String> {
        let context = PromptBuilder::context_of(request.prompt).unwrap_or_default();
        let first = context.split(CHUNK_DELIMITER).next().unwrap_or_default();
        if first.trim().is_empty() {
            return Ok(NOT_FOUND_SENTINEL.to_string());
        }
        Ok(first.to_string())
    }
}
