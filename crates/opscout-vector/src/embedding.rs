//! Embedding provider trait and test implementations.
//!
//! This module defines the `EmbeddingProvider` trait that abstracts over
//! different embedding generation backends.
//!
//! # Providers
//!
//! - `MockEmbeddingProvider`: Deterministic fixed-dimension vectors for testing
//! - `FailingEmbeddingProvider`: Always errors; exercises fallback paths
//! - `HttpEmbeddingProvider`: OpenAI-compatible HTTP endpoints
//! - `FastEmbedProvider`: Local embedding via fastembed (requires `vector-fastembed` feature)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use opscout_core::{Error, Result};

use crate::http::HttpEmbeddingProvider;
use crate::types::VectorConfig;

/// Trait for generating text embeddings.
///
/// Used at index-build time (batch) and at query time (single). Errors are
/// returned to the caller unchanged; this layer never swallows them.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts.
    ///
    /// Default implementation calls `embed` for each text sequentially.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The embedding dimension (0 if not known up front).
    fn dimension(&self) -> usize;

    /// The provider name, recorded in persisted index metadata.
    fn name(&self) -> &str;
}

/// Build the provider named by `config.provider`.
pub fn create_embedding_provider(config: &VectorConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => {
            let dimension = if config.dimension == 0 {
                384
            } else {
                config.dimension
            };
            Ok(Arc::new(MockEmbeddingProvider::new(dimension)))
        }
        "http" => Ok(Arc::new(HttpEmbeddingProvider::from_config(config)?)),
        #[cfg(feature = "vector-fastembed")]
        "fastembed" => Ok(Arc::new(crate::fastembed::FastEmbedProvider::from_config(
            config,
        )?)),
        #[cfg(not(feature = "vector-fastembed"))]
        "fastembed" => Err(Error::config(
            "Embedding provider 'fastembed' requires the vector-fastembed feature",
        )),
        other => Err(Error::config(format!(
            "Unknown embedding provider: '{other}'. Supported: fastembed, http, mock"
        ))),
    }
}

// ============================================================================
// MockEmbeddingProvider
// ============================================================================

/// A mock embedding provider for testing.
///
/// Generates deterministic unit vectors from the input bytes and counts how
/// many texts it has embedded, so tests can tell a cache hit from a rebuild.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    embedded: AtomicUsize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            embedded: AtomicUsize::new(0),
        }
    }

    /// Total number of texts embedded so far.
    pub fn embedded_count(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }

    fn deterministic_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        let bytes = text.as_bytes();

        if !bytes.is_empty() {
            for (i, val) in embedding.iter_mut().enumerate() {
                let byte_val = bytes[i % bytes.len()];
                *val = ((byte_val as f32 + i as f32) % 256.0) / 256.0;
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut embedding {
                *val /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embedded.fetch_add(1, Ordering::SeqCst);
        Ok(self.deterministic_embedding(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| self.deterministic_embedding(t))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// FailingEmbeddingProvider
// ============================================================================

/// An embedding provider whose every call fails.
#[derive(Debug, Clone)]
pub struct FailingEmbeddingProvider {
    message: String,
}

impl FailingEmbeddingProvider {
    /// Create a provider that fails with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding(self.message.clone()))
    }

    fn dimension(&self) -> usize {
        0
    }

    fn name(&self) -> &str {
        "failing"
    }
}

// ============================================================================
// Tests
// ============================================================================
