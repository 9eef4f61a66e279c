//! HTTP client for an Ollama-compatible `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::Settings, error::LlmError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// One non-streaming completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Cap on generated tokens; `None` leaves the server default.
    pub num_predict: Option<u32>,
}

/// Anything that turns a prompt into a short text reply.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    endpoint: Url,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .user_agent("lyric-topics/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LlmError::Request)?;

        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join("api/generate"))
            .map_err(|e| LlmError::Url(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            model: model.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        Self::new(&settings.llm_base_url, settings.llm_model.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GeneratePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let payload = GeneratePayload {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.num_predict,
            },
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|source| {
                if source.is_connect() {
                    LlmError::Unreachable {
                        url: self.endpoint.to_string(),
                        source,
                    }
                } else {
                    LlmError::Request(source)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LlmError::Status { status });
        }

        let body: GenerateResponse = response.json().await.map_err(LlmError::Decode)?;
        debug!(temperature = request.temperature, chars = body.response.len(), "generation done");
        Ok(body.response.trim().to_string())
    }
}
