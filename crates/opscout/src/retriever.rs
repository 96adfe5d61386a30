//! The retrieval dispatcher.
//!
//! [`OperatorRetriever`] is the public entry point: it owns the catalog
//! lifecycle, picks a strategy per [`RetrievalMode`] and applies the
//! fallback policy. Vector and hybrid failures that are not caused by the
//! caller are logged and answered with BM25 on the same query and limit;
//! BM25 and regex errors surface unchanged.

use std::path::PathBuf;
use std::sync::Arc;

use opscout_core::{CatalogProvider, CatalogSnapshot, RankedHit, Result};
use opscout_vector::EmbeddingProvider;

use crate::cache::IndexCache;
use crate::config::RetrievalConfig;
use crate::mode::RetrievalMode;
use crate::strategy::StrategyContext;

/// Default embedding batch size for semantic index builds.
const DEFAULT_BATCH_SIZE: usize = 64;

/// Multi-strategy operator search over a catalog provider.
pub struct OperatorRetriever {
    provider: Arc<dyn CatalogProvider>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    config: Arc<RetrievalConfig>,
    cache: Arc<IndexCache>,
    index_dir: Option<PathBuf>,
    batch_size: usize,
}

impl std::fmt::Debug for OperatorRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorRetriever")
            .field("provider", &self.provider.name())
            .field("embedder", &self.embedder.as_ref().map(|e| e.name().to_string()))
            .field("config", &self.config)
            .field("index_dir", &self.index_dir)
            .finish()
    }
}

impl OperatorRetriever {
    /// Create a retriever over `provider` with its own, empty cache.
    pub fn new(provider: Arc<dyn CatalogProvider>, config: RetrievalConfig) -> Self {
        Self {
            provider,
            embedder: None,
            config: Arc::new(config),
            cache: Arc::new(IndexCache::new()),
            index_dir: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Enable vector and hybrid search with `embedder`.
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Persist the semantic index under `dir`.
    pub fn with_index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.index_dir = Some(dir.into());
        self
    }

    /// Embedding batch size used when building the semantic index.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Share an existing cache instead of the retriever's own.
    pub fn with_cache(mut self, cache: Arc<IndexCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Retrieval configuration.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// The index cache backing this retriever.
    pub fn cache(&self) -> &Arc<IndexCache> {
        &self.cache
    }

    /// Whether an embedding provider is configured.
    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    /// Load the catalog snapshot. Returns the number of operators.
    pub async fn init(&self) -> Result<usize> {
        let snapshot = self.load_snapshot()?;
        let count = snapshot.len();
        self.cache.set_snapshot(snapshot).await;
        log::info!(
            "Initialized operator retriever with {count} operators from '{}'",
            self.provider.name()
        );
        Ok(count)
    }

    /// The current catalog snapshot, loading it on first use.
    pub async fn catalog(&self) -> Result<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.cache.snapshot().await {
            return Ok(snapshot);
        }
        log::warn!("Operator catalog not initialized; loading on first use");
        let snapshot = self.load_snapshot()?;
        self.cache.set_snapshot(Arc::clone(&snapshot)).await;
        Ok(snapshot)
    }

    /// Re-read the catalog and drop both in-memory indices.
    ///
    /// Returns `false` (and keeps the previous state) if the provider fails.
    pub async fn refresh_catalog(&self) -> bool {
        if let Err(e) = self.provider.refresh() {
            log::warn!("Catalog refresh failed: {e}");
            return false;
        }
        let snapshot = match self.load_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Catalog reload failed: {e}");
                return false;
            }
        };
        let count = snapshot.len();
        self.cache.set_snapshot(snapshot).await;
        self.cache.invalidate().await;
        log::info!("Refreshed operator catalog: {count} operators");
        true
    }

    /// Clear the snapshot and all in-memory indices.
    pub async fn reset(&self) {
        self.cache.reset().await;
    }

    /// Retrieve up to `limit` operator names for `query` using `mode`.
    pub async fn retrieve(
        &self,
        query: &str,
        limit: usize,
        mode: RetrievalMode,
    ) -> Result<Vec<String>> {
        let hits = self.rank(query, limit, mode).await?;
        Ok(hits.into_iter().map(|hit| hit.name).collect())
    }

    /// Like [`retrieve`](Self::retrieve), with the mode given by name.
    ///
    /// An unknown mode name is an [`InvalidArgument`](opscout_core::Error::InvalidArgument) error.
    pub async fn retrieve_named(&self, query: &str, limit: usize, mode: &str) -> Result<Vec<String>> {
        let mode: RetrievalMode = mode.parse()?;
        self.retrieve(query, limit, mode).await
    }

    /// Retrieve scored hits for `query` using `mode`, applying fallback.
    pub async fn rank(&self, query: &str, limit: usize, mode: RetrievalMode) -> Result<Vec<RankedHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let context = Arc::new(self.context().await?);

        match context.strategy(mode).rank(query, limit).await {
            Ok(hits) => Ok(hits),
            Err(e) if mode.falls_back_to_bm25() && e.is_fallback_eligible() => {
                log::warn!("{mode} retrieval failed, falling back to bm25: {e}");
                context.strategy(RetrievalMode::Bm25).rank(query, limit).await
            }
            Err(e) => Err(e),
        }
    }

    async fn context(&self) -> Result<StrategyContext> {
        Ok(StrategyContext {
            snapshot: self.catalog().await?,
            cache: Arc::clone(&self.cache),
            embedder: self.embedder.clone(),
            config: Arc::clone(&self.config),
            index_dir: self.index_dir.clone(),
            batch_size: self.batch_size,
        })
    }

    fn load_snapshot(&self) -> Result<Arc<CatalogSnapshot>> {
        let records = self.provider.catalog()?;
        Ok(Arc::new(CatalogSnapshot::new(records)))
    }
}

// ============================================================================
// Tests
// ============================================================================
