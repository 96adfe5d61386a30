//! opscout: multi-strategy search over a catalog of named operators.
//!
//! Given a natural-language query or a regex, opscout returns an ordered
//! list of operator names using one of four strategies:
//!
//! | Mode     | Ranking                                   | On failure    |
//! |----------|-------------------------------------------|---------------|
//! | `regex`  | catalog order, no scoring                 | error         |
//! | `bm25`   | Okapi BM25 over name + description        | error         |
//! | `vector` | cosine similarity of embeddings           | falls to bm25 |
//! | `hybrid` | weighted RRF of bm25 and vector rankings  | falls to bm25 |
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use opscout::{OperatorRetriever, RetrievalConfig, RetrievalMode};
//! use opscout_core::JsonCatalogProvider;
//!
//! # async fn demo() -> opscout_core::Result<()> {
//! let provider = Arc::new(JsonCatalogProvider::new("operators.json"));
//! let retriever = OperatorRetriever::new(provider, RetrievalConfig::default());
//! retriever.init().await?;
//!
//! let names = retriever.retrieve("remove html tags", 5, RetrievalMode::Bm25).await?;
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod llm;
pub mod mode;
pub mod pattern;
pub mod query_cache;
pub mod retriever;
pub mod strategy;
pub mod tools;

pub use cache::IndexCache;
pub use config::RetrievalConfig;
pub use llm::{CompletionProvider, LlmRetriever, MockCompletionProvider};
pub use mode::RetrievalMode;
pub use pattern::PatternMatcher;
pub use query_cache::QueryCache;
pub use retriever::OperatorRetriever;
pub use strategy::{RankStrategy, StrategyContext};
pub use tools::{
    brief_description, parse_arguments, DetailsLookup, OperatorDetails, OperatorSummary,
    OperatorTools, Parameter, SearchResults,
};
