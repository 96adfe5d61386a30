//! Ranking strategies, one per [`RetrievalMode`].
//!
//! Each strategy borrows what it needs from a shared [`StrategyContext`]
//! and reports failure through `Result`, leaving fallback decisions to the
//! dispatcher.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use opscout_core::{CatalogSnapshot, Error, RankedHit, Result};
use opscout_vector::{reciprocal_rank_fusion, EmbeddingProvider};

use crate::cache::IndexCache;
use crate::config::RetrievalConfig;
use crate::mode::RetrievalMode;
use crate::pattern::PatternMatcher;

/// Common capability of every retrieval strategy.
#[async_trait]
pub trait RankStrategy: Send + Sync {
    /// Rank catalog entries for `query`, best first, at most `limit`.
    async fn rank(&self, query: &str, limit: usize) -> Result<Vec<RankedHit>>;

    /// The mode this strategy implements.
    fn mode(&self) -> RetrievalMode;
}

/// Everything a strategy may need for one query.
#[derive(Clone)]
pub struct StrategyContext {
    /// Catalog snapshot the query runs against.
    pub snapshot: Arc<CatalogSnapshot>,
    /// Shared index cache.
    pub cache: Arc<IndexCache>,
    /// Embedding provider, if semantic search is available.
    pub embedder: Option<Arc<dyn EmbeddingProvider>>,
    /// Retrieval tuning.
    pub config: Arc<RetrievalConfig>,
    /// Directory of the persisted semantic index.
    pub index_dir: Option<PathBuf>,
    /// Embedding batch size for index builds.
    pub batch_size: usize,
}

impl StrategyContext {
    /// The strategy implementing `mode`.
    pub fn strategy(self: &Arc<Self>, mode: RetrievalMode) -> Box<dyn RankStrategy> {
        let context = Arc::clone(self);
        match mode {
            RetrievalMode::Regex => Box::new(RegexStrategy { context }),
            RetrievalMode::Bm25 => Box::new(Bm25Strategy { context }),
            RetrievalMode::Vector => Box::new(VectorStrategy { context }),
            RetrievalMode::Hybrid => Box::new(HybridStrategy { context }),
        }
    }
}

/// Regex match in catalog order. Every hit scores 1.0.
pub struct RegexStrategy {
    context: Arc<StrategyContext>,
}

#[async_trait]
impl RankStrategy for RegexStrategy {
    async fn rank(&self, query: &str, limit: usize) -> Result<Vec<RankedHit>> {
        let matcher = PatternMatcher::new(self.context.config.max_pattern_length);
        let names = matcher.search(&self.context.snapshot, query, limit)?;
        Ok(names.into_iter().map(|name| RankedHit::new(name, 1.0)).collect())
    }

    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Regex
    }
}

/// BM25 over the lazily built lexical index.
pub struct Bm25Strategy {
    context: Arc<StrategyContext>,
}

#[async_trait]
impl RankStrategy for Bm25Strategy {
    async fn rank(&self, query: &str, limit: usize) -> Result<Vec<RankedHit>> {
        let ctx = &self.context;
        let index = ctx.cache.lexical(&ctx.snapshot, ctx.config.bm25_params()).await;
        Ok(index.search(query, limit, ctx.config.bm25_score_threshold))
    }

    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Bm25
    }
}

/// Cosine similarity over the persisted semantic index.
pub struct VectorStrategy {
    context: Arc<StrategyContext>,
}

#[async_trait]
impl RankStrategy for VectorStrategy {
    async fn rank(&self, query: &str, limit: usize) -> Result<Vec<RankedHit>> {
        let ctx = &self.context;
        let embedder = ctx
            .embedder
            .clone()
            .ok_or_else(|| Error::embedding("no embedding provider configured"))?;
        let index = ctx
            .cache
            .semantic(&ctx.snapshot, embedder, ctx.index_dir.as_deref(), ctx.batch_size)
            .await?;
        index
            .search(query, limit, ctx.config.vector_similarity_threshold)
            .await
    }

    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Vector
    }
}

/// Weighted RRF of BM25 and vector rankings.
///
/// Both rankers are asked for `limit * candidate_multiplier` candidates so
/// fusion has depth to re-rank. Any vector failure fails the whole strategy.
pub struct HybridStrategy {
    context: Arc<StrategyContext>,
}

#[async_trait]
impl RankStrategy for HybridStrategy {
    async fn rank(&self, query: &str, limit: usize) -> Result<Vec<RankedHit>> {
        let ctx = &self.context;
        let pool = limit.saturating_mul(ctx.config.candidate_multiplier.max(1));

        let semantic = VectorStrategy {
            context: Arc::clone(ctx),
        }
        .rank(query, pool)
        .await?;
        let lexical = Bm25Strategy {
            context: Arc::clone(ctx),
        }
        .rank(query, pool)
        .await?;

        let lexical: Vec<&str> = lexical.iter().map(|h| h.name.as_str()).collect();
        let semantic: Vec<&str> = semantic.iter().map(|h| h.name.as_str()).collect();
        let fused = reciprocal_rank_fusion(&lexical, &semantic, &ctx.config.fusion_params(limit));
        Ok(fused.into_iter().map(RankedHit::from).collect())
    }

    fn mode(&self) -> RetrievalMode {
        RetrievalMode::Hybrid
    }
}
