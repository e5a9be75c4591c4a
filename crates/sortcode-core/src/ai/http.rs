//! HTTP classifier backend
//!
//! Talks to an Ollama-style local server: POST `{host}/api/generate` with a
//! prompt, read back a raw text completion. The per-request timeout comes
//! from the classification request itself; a timed-out call surfaces as an
//! error and goes through the caller's retry policy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::{ClassificationRequest, ClassifierBackend};

#[derive(Clone)]
pub struct HttpBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables (`SORTCODE_AI_HOST`,
    /// `SORTCODE_AI_MODEL`).
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SORTCODE_AI_HOST").ok()?;
        let model = std::env::var("SORTCODE_AI_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }
}

/// Request body for the generate endpoint.
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response body from the generate endpoint.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl ClassifierBackend for HttpBackend {
    async fn classify(&self, request: &ClassificationRequest) -> Result<String> {
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(Duration::from_millis(request.timeout_ms))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Classification(format!(
                "classifier returned HTTP {}",
                response.status()
            )));
        }

        let generated: GenerateResponse = response.json().await?;
        debug!(model = %self.model, "classifier response: {}", generated.response);

        Ok(generated.response)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(2))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
