//! Local embeddings through the `fastembed` crate (feature `vector-fastembed`).
//!
//! Model names are matched loosely: case, `-`, `_` and `.` are ignored, so
//! `bge-small-en-v1.5` and `BGESmallENV15` name the same model. The model
//! is loaded once; every call locks it on a blocking thread and embeds in
//! chunks of the configured batch size.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use opscout_core::{Error, Result};

use crate::embedding::EmbeddingProvider;
use crate::types::VectorConfig;

/// Canonical names of the models this provider accepts.
pub const SUPPORTED_MODELS: &[&str] = &[
    "bge-small-en-v1.5",
    "bge-base-en-v1.5",
    "all-minilm-l6-v2",
    "multilingual-e5-small",
];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// The fastembed model for a configured name, if supported.
pub fn resolve_model(name: &str) -> Option<EmbeddingModel> {
    match normalize(name).as_str() {
        "bgesmallenv15" => Some(EmbeddingModel::BGESmallENV15),
        "bgebaseenv15" => Some(EmbeddingModel::BGEBaseENV15),
        "allminilml6v2" => Some(EmbeddingModel::AllMiniLML6V2),
        "multilinguale5small" => Some(EmbeddingModel::MultilingualE5Small),
        _ => None,
    }
}

/// Embedding provider running a fastembed model in-process.
pub struct FastEmbedProvider {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimension: usize,
    batch_size: usize,
}

impl FastEmbedProvider {
    /// Load `config.model`, downloading it into `config.model_cache_dir` on
    /// first use.
    ///
    /// An unknown model name fails before anything is downloaded. When
    /// `config.dimension` is set it must match what the model produces.
    pub fn from_config(config: &VectorConfig) -> Result<Self> {
        let model = resolve_model(&config.model).ok_or_else(|| {
            Error::embedding(format!(
                "Unknown fastembed model '{}'; supported: {}",
                config.model,
                SUPPORTED_MODELS.join(", ")
            ))
        })?;

        let mut options = InitOptions::new(model);
        if let Some(dir) = &config.model_cache_dir {
            options = options.with_cache_dir(PathBuf::from(dir));
        }
        let mut embedding = TextEmbedding::try_new(options)
            .map_err(|e| Error::embedding(format!("Loading '{}' failed: {e}", config.model)))?;

        let dimension = embedding
            .embed(vec![config.model.as_str()], None)
            .map_err(|e| Error::embedding(format!("Probing '{}' failed: {e}", config.model)))?
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::embedding("fastembed returned no probe vector"))?;
        if config.dimension != 0 && config.dimension != dimension {
            return Err(Error::config(format!(
                "Model '{}' produces {dimension}-dimensional vectors, config says {}",
                config.model, config.dimension
            )));
        }
        log::info!("Loaded fastembed model '{}' ({dimension} dimensions)", config.model);

        Ok(Self {
            model: Arc::new(Mutex::new(embedding)),
            model_name: config.model.clone(),
            dimension,
            batch_size: config.batch_size.max(1),
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        let batch_size = self.batch_size;
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| Error::operation("fastembed model lock poisoned"))?;
            model
                .embed(texts, Some(batch_size))
                .map_err(|e| Error::embedding(format!("fastembed failed: {e}")))
        })
        .await
        .map_err(|e| Error::operation(format!("Embedding task aborted: {e}")))?
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run(vec![text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| Error::embedding("fastembed returned no vector"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.run(texts.iter().map(|t| t.to_string()).collect()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model", &self.model_name)
            .field("dimension", &self.dimension)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
