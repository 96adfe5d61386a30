//! Injectable cache for the catalog snapshot and the in-memory indices.
//!
//! One `IndexCache` is meant to live as long as the process, shared by
//! every query through an `Arc`. Reads clone an `Arc` out of the cache and
//! release the lock immediately. Building an index happens while holding
//! that index's mutex, so concurrent cache misses wait for a single build
//! instead of racing each other (and, for the semantic index, racing on the
//! persisted files).

use std::path::Path;
use std::sync::Arc;

use opscout_core::{CatalogSnapshot, Result};
use opscout_lexical::{Bm25Index, Bm25Params};
use opscout_vector::{EmbeddingProvider, IndexOrigin, SemanticIndex};
use tokio::sync::{Mutex, RwLock};

/// Process-wide retrieval state with explicit reset.
#[derive(Debug, Default)]
pub struct IndexCache {
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
    lexical: Mutex<Option<Arc<Bm25Index>>>,
    semantic: Mutex<Option<Arc<SemanticIndex>>>,
}

impl IndexCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current catalog snapshot, if one has been loaded.
    pub async fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Replace the catalog snapshot.
    ///
    /// Indices built from a different fingerprint are rebuilt on next use.
    pub async fn set_snapshot(&self, snapshot: Arc<CatalogSnapshot>) {
        *self.snapshot.write().await = Some(snapshot);
    }

    /// The BM25 index for `snapshot`, building it if the cached one is
    /// missing or was built from another catalog.
    pub async fn lexical(&self, snapshot: &CatalogSnapshot, params: Bm25Params) -> Arc<Bm25Index> {
        let mut slot = self.lexical.lock().await;
        if let Some(index) = slot.as_ref()
            && index.fingerprint() == snapshot.fingerprint()
        {
            return Arc::clone(index);
        }

        let index = Arc::new(Bm25Index::build(snapshot, params));
        log::info!("Built BM25 index over {} operators", index.len());
        *slot = Some(Arc::clone(&index));
        index
    }

    /// The semantic index for `snapshot`, loading or building it on a miss.
    ///
    /// The load, validate and rebuild sequence runs under the semantic
    /// mutex. A failed build leaves the slot empty.
    pub async fn semantic(
        &self,
        snapshot: &CatalogSnapshot,
        provider: Arc<dyn EmbeddingProvider>,
        index_dir: Option<&Path>,
        batch_size: usize,
    ) -> Result<Arc<SemanticIndex>> {
        let mut slot = self.semantic.lock().await;
        if let Some(index) = slot.as_ref()
            && index.fingerprint() == snapshot.fingerprint()
        {
            return Ok(Arc::clone(index));
        }

        let (index, origin) =
            SemanticIndex::load_or_build(snapshot, provider, index_dir, batch_size).await?;
        log::debug!(
            "Semantic index ready ({}): {} operators",
            match origin {
                IndexOrigin::Loaded => "loaded",
                IndexOrigin::Built => "built",
            },
            index.len()
        );
        let index = Arc::new(index);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drop both in-memory indices; the snapshot is kept.
    pub async fn invalidate(&self) {
        *self.lexical.lock().await = None;
        *self.semantic.lock().await = None;
    }

    /// Drop everything, including the snapshot.
    pub async fn reset(&self) {
        self.invalidate().await;
        *self.snapshot.write().await = None;
    }

    /// Whether a BM25 index is cached.
    pub async fn has_lexical(&self) -> bool {
        self.lexical.lock().await.is_some()
    }

    /// Whether a semantic index is cached.
    pub async fn has_semantic(&self) -> bool {
        self.semantic.lock().await.is_some()
    }
}
