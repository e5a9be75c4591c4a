//! Test utilities for sortcode-core
//!
//! Provides a mock classifier HTTP server speaking the Ollama-style wire
//! format, for integration tests of the HTTP backend and batch pipeline.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock classifier server for testing and development.
pub struct MockClassifierServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockClassifierServer {
    /// Start the mock server on an available port.
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockClassifierServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tags endpoint response (health check).
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Generate endpoint: answers with a single verdict token, the way a
/// well-behaved model would.
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let description = extract_description(&request.prompt).to_lowercase();

    let verdict = if description.contains("grocer") || description.contains("tesco") {
        "PERSONAL"
    } else if description.contains("software") || description.contains("hosting") {
        "adminCosts"
    } else if description.contains("fuel") || description.contains("taxi") {
        "travelCosts"
    } else if description.contains("accountant") || description.contains("solicitor") {
        "professionalFees"
    } else if description.contains("invoice") {
        "turnover"
    } else {
        "MANUAL_REVIEW"
    };

    Json(GenerateResponse {
        model: request.model,
        response: verdict.to_string(),
        done: true,
    })
}

/// Pull the quoted description out of a `Transaction: "..."` prompt line.
/// The prompt's own example lines would otherwise trip the heuristics.
fn extract_description(prompt: &str) -> String {
    if let Some(start) = prompt.find("Transaction: \"") {
        let after = &prompt[start + 14..];
        if let Some(end) = after.find('"') {
            return after[..end].to_string();
        }
    }
    prompt.to_string()
}

// Wire types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
