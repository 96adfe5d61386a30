//! Configuration for semantic search.

use serde::{Deserialize, Serialize};

/// Semantic search configuration.
///
/// Controls embedding provider selection and where the persisted index lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorConfig {
    /// Embedding provider: "fastembed", "http", or "mock".
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Embedding model name (e.g., "bge-small-en-v1.5").
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding dimension (0 = take whatever the provider returns).
    #[serde(default)]
    pub dimension: usize,

    /// Directory holding the persisted index and its metadata.
    ///
    /// `None` disables persistence; the index is then rebuilt per process.
    pub cache_dir: Option<String>,

    /// Directory for downloaded embedding model files (fastembed).
    pub model_cache_dir: Option<String>,

    /// Endpoint for the HTTP provider (OpenAI-compatible `/embeddings`).
    #[serde(default = "default_http_endpoint")]
    pub http_endpoint: String,

    /// API key for the HTTP provider. Falls back to `OPSCOUT_EMBEDDING_API_KEY`.
    pub http_api_key: Option<String>,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Batch size for embedding operations.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_provider() -> String {
    "fastembed".to_string()
}

fn default_model() -> String {
    "bge-small-en-v1.5".to_string()
}

fn default_http_endpoint() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    64
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            dimension: 0,
            cache_dir: None,
            model_cache_dir: None,
            http_endpoint: default_http_endpoint(),
            http_api_key: None,
            http_timeout_secs: default_timeout_secs(),
            batch_size: default_batch_size(),
        }
    }
}
