//! HTTP embedding provider for OpenAI-compatible APIs.
//!
//! Works with any endpoint that accepts `{"model", "input": [...]}` and
//! answers `{"data": [{"embedding": [...], "index": n}]}`: OpenAI, Azure
//! OpenAI, DashScope compatible mode, vLLM, text-embeddings-inference.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use opscout_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::embedding::EmbeddingProvider;
use crate::types::VectorConfig;

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPSCOUT_EMBEDDING_API_KEY";

/// HTTP embedding provider.
#[derive(Debug)]
pub struct HttpEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimension: usize,
    batch_size: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbeddingProvider {
    /// Create a provider from the vector configuration.
    pub fn from_config(config: &VectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let api_key = config
            .http_api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        if api_key.is_none() {
            warn!(
                "No API key configured for embedding endpoint {}",
                config.http_endpoint
            );
        }

        info!(
            "HTTP embedding provider: endpoint={}, model={}",
            config.http_endpoint, config.model
        );

        Ok(Self {
            client,
            endpoint: config.http_endpoint.clone(),
            api_key,
            model: config.model.clone(),
            dimension: config.dimension,
            batch_size: config.batch_size.max(1),
        })
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            dimensions: (self.dimension > 0).then_some(self.dimension),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Embedding endpoint returned {status}: {detail}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Malformed embedding response: {e}")))?;

        order_embeddings(parsed.data, texts.len(), self.dimension)
    }
}

/// Put response items back in request order and check their shape.
fn order_embeddings(
    mut data: Vec<EmbeddingData>,
    expected: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        return Err(Error::embedding(format!(
            "Expected {expected} embeddings, got {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);

    let embeddings: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();
    if dimension > 0
        && let Some(bad) = embeddings.iter().find(|e| e.len() != dimension)
    {
        return Err(Error::embedding(format!(
            "Expected dimension {dimension}, got {}",
            bad.len()
        )));
    }
    Ok(embeddings)
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            debug!("Embedding batch of {} texts", chunk.len());
            results.extend(self.request(chunk).await?);
        }
        Ok(results)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn data(index: usize, embedding: Vec<f32>) -> EmbeddingData {
        EmbeddingData { embedding, index }
    }

    #[test]
    fn test_order_embeddings_sorts_by_index() {
        let ordered =
            order_embeddings(vec![data(1, vec![2.0]), data(0, vec![1.0])], 2, 0).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_order_embeddings_count_mismatch() {
        let err = order_embeddings(vec![data(0, vec![1.0])], 2, 0).unwrap_err();
        assert!(err.to_string().contains("Expected 2 embeddings"));
    }

    #[test]
    fn test_order_embeddings_dimension_mismatch() {
        let err = order_embeddings(vec![data(0, vec![1.0, 2.0])], 1, 3).unwrap_err();
        assert!(err.to_string().contains("dimension 3"));
    }

    #[test]
    fn test_request_serialization() {
        let texts = ["a", "b"];
        let body = EmbeddingRequest {
            model: "text-embedding-v3",
            input: &texts,
            dimensions: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"model":"text-embedding-v3","input":["a","b"]}"#);
    }

    #[test]
    fn test_from_config() {
        let config = VectorConfig {
            provider: "http".to_string(),
            model: "text-embedding-v3".to_string(),
            http_api_key: Some("secret".to_string()),
            dimension: 1024,
            batch_size: 0,
            ..Default::default()
        };
        let provider = HttpEmbeddingProvider::from_config(&config).unwrap();
        assert_eq!(provider.name(), "text-embedding-v3");
        assert_eq!(provider.dimension(), 1024);
        assert_eq!(provider.batch_size, 1);
    }
}
