//! Retrieval modes.

use std::fmt;
use std::str::FromStr;

use opscout_core::Error;
use serde::{Deserialize, Serialize};

/// The strategy a query is dispatched to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Regex over name and description, catalog order.
    Regex,
    /// BM25 lexical ranking.
    Bm25,
    /// Embedding similarity.
    #[default]
    Vector,
    /// RRF fusion of BM25 and vector rankings.
    Hybrid,
}

impl RetrievalMode {
    /// All modes, in declaration order.
    pub const ALL: [RetrievalMode; 4] = [Self::Regex, Self::Bm25, Self::Vector, Self::Hybrid];

    /// The lowercase mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regex => "regex",
            Self::Bm25 => "bm25",
            Self::Vector => "vector",
            Self::Hybrid => "hybrid",
        }
    }

    /// Whether failures in this mode fall back to BM25.
    pub fn falls_back_to_bm25(&self) -> bool {
        matches!(self, Self::Vector | Self::Hybrid)
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetrievalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regex" => Ok(Self::Regex),
            "bm25" => Ok(Self::Bm25),
            "vector" => Ok(Self::Vector),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(Error::invalid_argument(format!(
                "Unknown retrieval mode '{other}' (expected one of: regex, bm25, vector, hybrid)"
            ))),
        }
    }
}
