//! opscout core: shared types, errors, and the operator catalog.
//!
//! This crate has no internal opscout dependencies. Everything the
//! retrieval layers agree on lives here:
//!
//! - [`error`]: Error type and `Result` alias
//! - [`catalog`]: Operator records, catalog snapshots, content fingerprinting
//! - [`provider`]: The [`CatalogProvider`] trait and stock implementations

pub mod catalog;
pub mod error;
pub mod provider;

pub use catalog::{fingerprint, CatalogSnapshot, OperatorRecord, RankedHit};
pub use error::{Error, Result};
pub use provider::{CatalogProvider, JsonCatalogProvider, StaticCatalogProvider};
