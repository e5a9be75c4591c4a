//! Pluggable external classifier abstraction
//!
//! The engine only invokes an external AI classifier when local rules are
//! inconclusive. The contract is deliberately small: a structured prompt
//! goes out, raw text comes back, and the text must resolve to a known
//! category code, `PERSONAL`, or `MANUAL_REVIEW`.
//!
//! # Architecture
//!
//! - `ClassifierBackend` trait: the interface every backend implements
//! - `ClassifierClient` enum: concrete wrapper with Clone + compile-time
//!   dispatch
//! - Backends: `HttpBackend` (Ollama-style local server), `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `SORTCODE_AI_BACKEND`: Backend to use (http, mock). Default: http
//! - `SORTCODE_AI_HOST`: Classifier server URL (required for http backend)
//! - `SORTCODE_AI_MODEL`: Model name (default: llama3.2)

mod http;
mod mock;
pub mod parsing;
pub mod prompt;

pub use http::HttpBackend;
pub use mock::MockBackend;
pub use parsing::{parse_verdict, Verdict};
pub use prompt::build_prompt;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Request sent to the external classifier.
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationRequest {
    pub prompt: String,
    pub business_type: String,
    pub timeout_ms: u64,
}

/// Interface every classifier backend implements.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Run one classification and return the raw text response.
    async fn classify(&self, request: &ClassificationRequest) -> Result<String>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> bool;

    /// Model name (for logging/metrics).
    fn model(&self) -> &str;

    /// Host URL (for logging).
    fn host(&self) -> &str;
}

/// Concrete classifier client enum.
///
/// Provides Clone and compile-time dispatch without `Box<dyn>` overhead.
#[derive(Clone)]
pub enum ClassifierClient {
    /// HTTP backend (Ollama-style local server)
    Http(HttpBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ClassifierClient {
    /// Create a classifier client from environment variables. Returns None
    /// when the required variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend =
            std::env::var("SORTCODE_AI_BACKEND").unwrap_or_else(|_| "http".to_string());

        match backend.to_lowercase().as_str() {
            "http" | "ollama" => HttpBackend::from_env().map(ClassifierClient::Http),
            "mock" => Some(ClassifierClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown SORTCODE_AI_BACKEND, falling back to http");
                HttpBackend::from_env().map(ClassifierClient::Http)
            }
        }
    }

    /// Create an HTTP backend directly.
    pub fn http(host: &str, model: &str) -> Self {
        ClassifierClient::Http(HttpBackend::new(host, model))
    }

    /// Create a mock backend for testing.
    pub fn mock() -> Self {
        ClassifierClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ClassifierBackend for ClassifierClient {
    async fn classify(&self, request: &ClassificationRequest) -> Result<String> {
        match self {
            ClassifierClient::Http(b) => b.classify(request).await,
            ClassifierClient::Mock(b) => b.classify(request).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ClassifierClient::Http(b) => b.health_check().await,
            ClassifierClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ClassifierClient::Http(b) => b.model(),
            ClassifierClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ClassifierClient::Http(b) => b.host(),
            ClassifierClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_mock() {
        let client = ClassifierClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = ClassifierClient::mock();
        assert!(client.health_check().await);
    }
}
