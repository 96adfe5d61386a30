//! Semantic index lifecycle: load a persisted index if it is still valid,
//! otherwise embed the catalog and persist the result.

use std::path::Path;
use std::sync::Arc;

use opscout_core::{CatalogSnapshot, Error, RankedHit, Result};

use crate::embedding::EmbeddingProvider;
use crate::index::{FlatVectorIndex, VectorEntry};
use crate::persistence::{self, IndexMetadata, IndexPaths};

/// Where a [`SemanticIndex`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    /// Reused from the persisted cache.
    Loaded,
    /// Freshly embedded from the catalog.
    Built,
}

/// A vector index bound to the provider that embedded it.
pub struct SemanticIndex {
    index: FlatVectorIndex,
    provider: Arc<dyn EmbeddingProvider>,
    fingerprint: String,
}

impl std::fmt::Debug for SemanticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticIndex")
            .field("provider", &self.provider.name())
            .field("fingerprint", &self.fingerprint)
            .field("len", &self.index.len())
            .finish()
    }
}

impl SemanticIndex {
    /// Load the persisted index for `snapshot`, or build and persist a new one.
    ///
    /// With no `cache_dir` the index is always built and never written.
    /// Persist failures are logged and do not fail the build; embedding
    /// failures do.
    pub async fn load_or_build(
        snapshot: &CatalogSnapshot,
        provider: Arc<dyn EmbeddingProvider>,
        cache_dir: Option<&Path>,
        batch_size: usize,
    ) -> Result<(Self, IndexOrigin)> {
        let paths = cache_dir.map(IndexPaths::new);

        if let Some(paths) = &paths
            && let Some(index) = try_load(paths, snapshot, provider.as_ref())
        {
            log::info!(
                "Loaded persisted vector index ({} entries) from {}",
                index.len(),
                paths.dir.display()
            );
            let semantic = Self {
                index,
                provider,
                fingerprint: snapshot.fingerprint().to_string(),
            };
            return Ok((semantic, IndexOrigin::Loaded));
        }

        let index = build(snapshot, provider.as_ref(), batch_size).await?;
        log::info!(
            "Built vector index: {} entries, dimension {}, provider {}",
            index.len(),
            index.dimension(),
            provider.name()
        );

        if let Some(paths) = &paths {
            let metadata = IndexMetadata::now(
                snapshot.fingerprint(),
                index.len(),
                index.dimension(),
                provider.name(),
            );
            if let Err(e) = persistence::persist(paths, &index, &metadata) {
                log::warn!("Failed to persist vector index: {e}");
            }
        }

        let semantic = Self {
            index,
            provider,
            fingerprint: snapshot.fingerprint().to_string(),
        };
        Ok((semantic, IndexOrigin::Built))
    }

    /// Embed `query` and return up to `limit` names with similarity at or
    /// above `threshold`.
    pub async fn search(&self, query: &str, limit: usize, threshold: f32) -> Result<Vec<RankedHit>> {
        if limit == 0 || self.index.is_empty() {
            return Ok(Vec::new());
        }
        let vector = self.provider.embed(query).await?;
        Ok(self.index.search(&vector, limit, threshold))
    }

    /// Fingerprint of the catalog this index covers.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// The underlying vector index.
    pub fn index(&self) -> &FlatVectorIndex {
        &self.index
    }

    /// Number of indexed records.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn try_load(
    paths: &IndexPaths,
    snapshot: &CatalogSnapshot,
    provider: &dyn EmbeddingProvider,
) -> Option<FlatVectorIndex> {
    if !paths.exist() {
        log::debug!("No persisted vector index in {}", paths.dir.display());
        return None;
    }
    if !persistence::is_index_fresh(&paths.metadata, snapshot.fingerprint()) {
        log::info!("Persisted vector index is stale; rebuilding");
        return None;
    }

    let metadata = persistence::load_metadata(&paths.metadata).ok()?;
    if metadata.provider != provider.name() {
        log::info!(
            "Persisted vector index was built by '{}', current provider is '{}'; rebuilding",
            metadata.provider,
            provider.name()
        );
        return None;
    }

    let mut index = match persistence::load_index(&paths.index) {
        Ok(index) => index,
        Err(e) => {
            log::warn!("Failed to load persisted vector index: {e}");
            return None;
        }
    };

    let expected_dimension = provider.dimension();
    if expected_dimension != 0 && index.dimension() != expected_dimension {
        log::info!(
            "Persisted vector dimension {} differs from provider dimension {}; rebuilding",
            index.dimension(),
            expected_dimension
        );
        return None;
    }
    if index.len() != snapshot.len() {
        log::info!(
            "Persisted vector index has {} entries, catalog has {}; rebuilding",
            index.len(),
            snapshot.len()
        );
        return None;
    }

    for entry in index.entries_mut() {
        match snapshot.position(&entry.name) {
            Some(position) => entry.position = position,
            None => {
                log::info!(
                    "Persisted vector index references unknown operator '{}'; rebuilding",
                    entry.name
                );
                return None;
            }
        }
    }

    Some(index)
}

async fn build(
    snapshot: &CatalogSnapshot,
    provider: &dyn EmbeddingProvider,
    batch_size: usize,
) -> Result<FlatVectorIndex> {
    let texts: Vec<String> = snapshot.records().iter().map(|r| r.embedding_text()).collect();
    let mut vectors = Vec::with_capacity(texts.len());
    for chunk in texts.chunks(batch_size.max(1)) {
        let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
        let batch = provider.embed_batch(&refs).await?;
        if batch.len() != refs.len() {
            return Err(Error::embedding(format!(
                "provider returned {} embeddings for {} texts",
                batch.len(),
                refs.len()
            )));
        }
        vectors.extend(batch);
    }

    let dimension = vectors.first().map(Vec::len).unwrap_or(provider.dimension());
    let entries = snapshot
        .records()
        .iter()
        .zip(vectors)
        .enumerate()
        .map(|(position, (record, vector))| VectorEntry {
            position,
            name: record.name.clone(),
            vector,
        })
        .collect();

    Ok(FlatVectorIndex::new(dimension, entries))
}

// ============================================================================
// Tests
// ============================================================================
