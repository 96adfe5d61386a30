//! Semantic search for opscout.
//!
//! Operators are embedded as `"name: description"` strings, kept in a flat
//! in-memory vector index, and persisted next to a metadata record that
//! carries the catalog fingerprint. A persisted index is reused only while
//! that fingerprint still matches the live catalog.
//!
//! # Features
//!
//! - `vector-fastembed`: Enable local embedding generation via fastembed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      opscout-vector                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider trait                                    │
//! │  ├── MockEmbeddingProvider / FailingEmbeddingProvider       │
//! │  ├── HttpEmbeddingProvider (OpenAI-compatible endpoints)    │
//! │  └── FastEmbedProvider (feature: vector-fastembed)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  FlatVectorIndex (cosine similarity, brute force)           │
//! │  Persistence (index blob + fingerprint metadata)            │
//! │  SemanticIndex (load-validate-or-build lifecycle)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Rank fusion (weighted RRF of lexical + semantic rankings)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// Core modules (always available)
pub mod embedding;
pub mod http;
pub mod index;
pub mod types;

// Lifecycle and fusion
pub mod fusion;
pub mod persistence;
pub mod semantic;

// Feature-gated backend modules
#[cfg(feature = "vector-fastembed")]
pub mod fastembed;

// Re-exports: core types
pub use types::VectorConfig;

// Re-exports: providers
pub use embedding::{
    create_embedding_provider, EmbeddingProvider, FailingEmbeddingProvider, MockEmbeddingProvider,
};
pub use http::HttpEmbeddingProvider;

// Re-exports: index lifecycle
pub use index::{FlatVectorIndex, VectorEntry};
pub use persistence::{is_index_fresh, IndexMetadata, IndexPaths};
pub use semantic::{IndexOrigin, SemanticIndex};

// Re-exports: fusion
pub use fusion::{reciprocal_rank_fusion, FusedHit, FusionParams, HitSource};

// Feature-gated re-exports
#[cfg(feature = "vector-fastembed")]
pub use fastembed::FastEmbedProvider;
