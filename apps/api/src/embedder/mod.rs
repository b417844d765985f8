//! Embedder boundary — the single point of entry for all embedding calls.
//!
//! ARCHITECTURAL RULE: No other module may call the embedding server directly.
//! The ranking engine depends only on the `Embedder` trait, carried in
//! `AppState` as `Arc<dyn Embedder>`, so tests can substitute a fixed-vector
//! double and the served model can be swapped without touching the core.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedder returned {got} vectors for {expected} texts")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

/// A semantic text encoder: batch of texts in, one fixed-dimension vector per
/// text out, same order. Callers must never pass empty texts; the ranking
/// engine validates before calling.
///
/// Embedding the same batch against the same model revision is deterministic.
/// Bit-exact reproducibility across hardware is not part of the contract.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

/// Client for a text-embedding inference server (`POST {base_url}/embed`,
/// body `{"inputs": [...]}`, response a JSON array of float arrays).
/// Retries on 429 and 5xx with exponential backoff.
#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
}

impl HttpEmbedder {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let request_body = EmbedRequest { inputs: texts };
        let url = format!("{}/embed", self.base_url);

        let mut last_error: Option<EmbedError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Embed call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(&url).json(&request_body).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EmbedError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Embedding server returned {}: {}", status, body);
                last_error = Some(EmbedError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbedError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let vectors: Vec<Vec<f32>> = response.json().await?;

            if vectors.len() != texts.len() {
                return Err(EmbedError::ShapeMismatch {
                    expected: texts.len(),
                    got: vectors.len(),
                });
            }

            debug!(
                "Embed call succeeded: {} texts, dimension {}",
                vectors.len(),
                vectors.first().map_or(0, Vec::len)
            );

            return Ok(vectors);
        }

        Err(last_error.unwrap_or(EmbedError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.call(texts).await
    }
}
