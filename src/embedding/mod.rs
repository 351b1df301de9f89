//! Boundary for the retrieval-augmented chat feature's embedding model.
//!
//! The model itself is a black box behind an HTTP feature-extraction
//! backend; this module owns input normalization and the process-scoped
//! lazy singleton. No retry, batching, or caching policy.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding backend not configured")]
    NotConfigured,

    #[error("embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("embedding backend responded with status {0}")]
    BackendStatus(reqwest::StatusCode),

    #[error("expected {expected}-dimensional vector, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// `embed(text) -> fixed-length vector`. The backend applies unit-norm
/// scaling; callers receive the vector as-is.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Collapse runs of whitespace to single spaces and trim the ends before
/// handing text to the backend.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// HTTP client for the feature-extraction backend.
pub struct HttpEmbedder {
    client: reqwest::Client,
    inference_url: String,
    dimension: usize,
}

impl HttpEmbedder {
    pub fn from_config() -> Result<Self, EmbeddingError> {
        let cfg = &config::config().embedding;
        let inference_url = cfg.inference_url.clone().ok_or(EmbeddingError::NotConfigured)?;
        Ok(Self {
            client: reqwest::Client::new(),
            inference_url,
            dimension: cfg.dimension,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = normalize_text(text);

        let response = self
            .client
            .post(&self.inference_url)
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(EmbeddingError::BackendStatus(response.status()));
        }

        let body: EmbedResponse = response.json().await?;
        if body.embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: body.embedding.len(),
            });
        }

        Ok(body.embedding)
    }
}

static SHARED: OnceCell<HttpEmbedder> = OnceCell::const_new();

/// Process-scoped embedder, initialized once on first use. Concurrent
/// first callers await the single in-flight initialization through the
/// cell rather than constructing a second client.
pub async fn shared() -> Result<&'static HttpEmbedder, EmbeddingError> {
    SHARED.get_or_try_init(|| async { HttpEmbedder::from_config() }).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn whitespace_is_normalized() {
        assert_eq!(normalize_text("  hello \n\t world  "), "hello world");
        assert_eq!(normalize_text("already clean"), "already clean");
        assert_eq!(normalize_text("   "), "");
    }

    #[tokio::test]
    async fn shared_without_backend_is_not_configured() {
        let err = shared().await.err().expect("no backend configured in tests");
        assert!(matches!(err, EmbeddingError::NotConfigured));
    }

    #[tokio::test]
    async fn once_cell_initializes_exactly_once() {
        static CELL: OnceCell<usize> = OnceCell::const_new();
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let init = || async {
            CALLS.fetch_add(1, Ordering::SeqCst);
            42usize
        };

        let (a, b) = tokio::join!(CELL.get_or_init(init), CELL.get_or_init(init));
        assert_eq!((*a, *b), (42, 42));
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn trait_object_usable_at_the_seam() {
        let embedder: Box<dyn Embedder> = Box::new(FixedEmbedder(vec![0.6, 0.8]));
        let v = embedder.embed("anything").await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }
}
