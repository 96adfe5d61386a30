//! Retrieval tuning knobs.

use serde::{Deserialize, Serialize};

/// Configuration for the retrieval dispatcher and its strategies.
///
/// Every field has a default so a partial TOML section is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Result count used when the caller does not specify one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Upper bound for caller-supplied limits in the operator tools.
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Longest regex pattern accepted, in characters.
    #[serde(default = "default_max_pattern_length")]
    pub max_pattern_length: usize,

    /// BM25 results must score above this.
    #[serde(default)]
    pub bm25_score_threshold: f32,

    /// BM25 term-frequency saturation.
    #[serde(default = "default_k1")]
    pub bm25_k1: f32,

    /// BM25 length normalization.
    #[serde(default = "default_b")]
    pub bm25_b: f32,

    /// Vector results must have at least this cosine similarity.
    #[serde(default)]
    pub vector_similarity_threshold: f32,

    /// Weight of the BM25 ranking in hybrid fusion.
    #[serde(default = "default_weight")]
    pub hybrid_bm25_weight: f32,

    /// Weight of the vector ranking in hybrid fusion.
    #[serde(default = "default_weight")]
    pub hybrid_vector_weight: f32,

    /// RRF smoothing constant.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Fused scores must exceed this.
    #[serde(default)]
    pub hybrid_threshold: f32,

    /// Hybrid candidate pool is `limit * candidate_multiplier` per ranker.
    #[serde(default = "default_candidate_multiplier")]
    pub candidate_multiplier: usize,
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    30
}

fn default_max_pattern_length() -> usize {
    256
}

fn default_k1() -> f32 {
    1.5
}

fn default_b() -> f32 {
    0.75
}

fn default_weight() -> f32 {
    0.5
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_candidate_multiplier() -> usize {
    3
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_pattern_length: default_max_pattern_length(),
            bm25_score_threshold: 0.0,
            bm25_k1: default_k1(),
            bm25_b: default_b(),
            vector_similarity_threshold: 0.0,
            hybrid_bm25_weight: default_weight(),
            hybrid_vector_weight: default_weight(),
            rrf_k: default_rrf_k(),
            hybrid_threshold: 0.0,
            candidate_multiplier: default_candidate_multiplier(),
        }
    }
}

impl RetrievalConfig {
    /// BM25 parameters for the lexical index.
    pub fn bm25_params(&self) -> opscout_lexical::Bm25Params {
        opscout_lexical::Bm25Params {
            k1: self.bm25_k1,
            b: self.bm25_b,
        }
    }

    /// Fusion parameters for a hybrid query returning `limit` results.
    pub fn fusion_params(&self, limit: usize) -> opscout_vector::FusionParams {
        opscout_vector::FusionParams {
            lexical_weight: self.hybrid_bm25_weight,
            semantic_weight: self.hybrid_vector_weight,
            k: self.rrf_k,
            threshold: self.hybrid_threshold,
            limit,
        }
    }

    /// Clamp a caller-supplied limit to `[1, max_limit]`.
    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.clamp(1, self.max_limit.max(1))
    }
}
