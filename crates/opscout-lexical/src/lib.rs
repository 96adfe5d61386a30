//! Lexical search for opscout.
//!
//! Operator names are identifiers (`clean_html_mapper`, `ImageFaceBlur`),
//! so the tokenizer splits on identifier boundaries before scoring. The
//! index is small enough to live entirely in memory and is rebuilt from a
//! [`CatalogSnapshot`](opscout_core::CatalogSnapshot) whenever its
//! fingerprint changes.
//!
//! - [`tokenizer`]: identifier-aware tokenization shared by index and query
//! - [`bm25`]: Okapi BM25 scoring with threshold cutoff

pub mod bm25;
pub mod tokenizer;

pub use bm25::{Bm25Index, Bm25Params};
pub use tokenizer::tokenize;
