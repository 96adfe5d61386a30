//! Operator lookup tools for an agent or tool-calling host.
//!
//! Two operations sit on top of the dispatcher: a free-text search that
//! returns each hit with a one-sentence summary, and an exact-name detail
//! lookup that parses the operator's argument documentation. Both results
//! render to Markdown for display.

use std::sync::{Arc, OnceLock};

use opscout_core::{CatalogSnapshot, OperatorRecord, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mode::RetrievalMode;
use crate::retriever::OperatorRetriever;

/// Longest brief description, in characters, including the ellipsis.
pub const BRIEF_MAX_CHARS: usize = 150;

/// Most "did you mean" suggestions returned for an unknown name.
pub const MAX_SUGGESTIONS: usize = 5;

/// One search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSummary {
    /// Operator name.
    pub name: String,
    /// First sentence of the description.
    pub brief_description: String,
}

/// Result of [`OperatorTools::search_operators`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    /// The query as given.
    pub query: String,
    /// Hits, best first.
    pub operators: Vec<OperatorSummary>,
}

impl SearchResults {
    /// Operator names in result order.
    pub fn names(&self) -> Vec<&str> {
        self.operators.iter().map(|op| op.name.as_str()).collect()
    }

    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        if self.operators.is_empty() {
            return format!("No operators found for query: '{}'", self.query);
        }

        let mut out = format!(
            "**Found {} relevant operators**\nQuery: \"{}\"\n\n---\n\n",
            self.operators.len(),
            self.query
        );
        for (i, op) in self.operators.iter().enumerate() {
            out.push_str(&format!(
                "**{}. {}**\n   {}\n\n",
                i + 1,
                op.name,
                op.brief_description
            ));
        }
        out.push_str("---\n\n");
        out.push_str(
            "**Tip**: If these do not fit, rephrase the query with synonyms or different \
             constraints and search again.",
        );
        out
    }
}

/// One documented operator parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Declared type, as written in the docs.
    #[serde(rename = "type")]
    pub param_type: String,
    /// Parameter description.
    pub description: String,
}

/// Full record of one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorDetails {
    /// Operator name.
    pub name: String,
    /// Full description.
    pub description: String,
    /// Parameters parsed from the argument documentation.
    pub parameters: Vec<Parameter>,
}

impl OperatorDetails {
    /// Details for a catalog record.
    pub fn from_record(record: &OperatorRecord) -> Self {
        Self {
            name: record.name.clone(),
            description: record.description.clone(),
            parameters: parse_arguments(&record.arguments),
        }
    }

    /// Render as Markdown, including a config snippet.
    pub fn to_markdown(&self) -> String {
        let mut out = format!("# {}\n\n## Description\n\n{}\n\n## Parameters\n\n", self.name, self.description);
        if self.parameters.is_empty() {
            out.push_str("*No parameters documented*\n\n");
        } else {
            for param in &self.parameters {
                out.push_str(&format!(
                    "### `{}`\n- **Type**: `{}`\n- **Description**: {}\n\n",
                    param.name, param.param_type, param.description
                ));
            }
        }

        out.push_str("## Usage Example\n\n```yaml\nprocess:\n");
        out.push_str(&format!("  - {}:\n", self.name));
        for param in &self.parameters {
            out.push_str(&format!("      {}: <value>\n", param.name));
        }
        out.push_str("```\n");
        out
    }
}

/// Result of [`OperatorTools::get_operator_details`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetailsLookup {
    /// The operator exists.
    Found(OperatorDetails),
    /// No operator has that exact name.
    NotFound {
        /// The name that was looked up.
        name: String,
        /// Names containing the lookup text, case-insensitively.
        similar: Vec<String>,
    },
}

impl DetailsLookup {
    /// Render as Markdown.
    pub fn to_markdown(&self) -> String {
        match self {
            Self::Found(details) => details.to_markdown(),
            Self::NotFound { name, similar } => {
                let mut out = format!("Operator '{name}' not found.\n");
                if !similar.is_empty() {
                    out.push_str("\nDid you mean one of these?\n");
                    for candidate in similar {
                        out.push_str(&format!("  - {candidate}\n"));
                    }
                }
                out
            }
        }
    }
}

/// Search and detail tools over an [`OperatorRetriever`].
#[derive(Debug, Clone)]
pub struct OperatorTools {
    retriever: Arc<OperatorRetriever>,
    mode: RetrievalMode,
}

impl OperatorTools {
    /// Tools using vector mode (which falls back to BM25).
    pub fn new(retriever: Arc<OperatorRetriever>) -> Self {
        Self {
            retriever,
            mode: RetrievalMode::default(),
        }
    }

    /// Use `mode` for searches.
    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Search mode in use.
    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }

    /// Search operators by free-text description.
    ///
    /// `limit` defaults to the configured default and is clamped to
    /// `[1, max_limit]`.
    pub async fn search_operators(&self, query: &str, limit: Option<usize>) -> Result<SearchResults> {
        let config = self.retriever.config();
        let limit = config.clamp_limit(limit.unwrap_or(config.default_limit));

        let names = self.retriever.retrieve(query, limit, self.mode).await?;
        let snapshot = self.retriever.catalog().await?;
        let operators = names
            .iter()
            .filter_map(|name| snapshot.get(name))
            .map(|record| OperatorSummary {
                name: record.name.clone(),
                brief_description: brief_description(&record.description),
            })
            .collect();

        Ok(SearchResults {
            query: query.to_string(),
            operators,
        })
    }

    /// Look up one operator by exact name.
    pub async fn get_operator_details(&self, name: &str) -> Result<DetailsLookup> {
        let snapshot = self.retriever.catalog().await?;
        Ok(match snapshot.get(name) {
            Some(record) => DetailsLookup::Found(OperatorDetails::from_record(record)),
            None => DetailsLookup::NotFound {
                name: name.to_string(),
                similar: similar_names(&snapshot, name, MAX_SUGGESTIONS),
            },
        })
    }
}

/// First sentence of the first paragraph, capped at [`BRIEF_MAX_CHARS`].
pub fn brief_description(description: &str) -> String {
    let first_paragraph = description.split("\n\n").next().unwrap_or_default().trim();
    let first_sentence = first_paragraph.split('.').next().unwrap_or_default();

    if first_sentence.chars().count() > BRIEF_MAX_CHARS {
        let mut brief: String = first_sentence.chars().take(BRIEF_MAX_CHARS - 3).collect();
        brief.push_str("...");
        brief
    } else {
        first_sentence.to_string()
    }
}

/// Parse `name (type): description` lines from argument documentation.
pub fn parse_arguments(arguments: &str) -> Vec<Parameter> {
    static ARGUMENT_LINE: OnceLock<Option<Regex>> = OnceLock::new();
    let Some(re) = ARGUMENT_LINE
        .get_or_init(|| Regex::new(r"(\w+)\s*\(([^)]+)\):\s*([^\n]+)").ok())
        .as_ref()
    else {
        return Vec::new();
    };

    re.captures_iter(arguments)
        .map(|caps| Parameter {
            name: caps[1].to_string(),
            param_type: caps[2].trim().to_string(),
            description: caps[3].trim().to_string(),
        })
        .collect()
}

/// Catalog names containing `query`, case-insensitively, in catalog order.
pub fn similar_names(snapshot: &CatalogSnapshot, query: &str, limit: usize) -> Vec<String> {
    let needle = query.to_lowercase();
    snapshot
        .records()
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&needle))
        .take(limit)
        .map(|record| record.name.clone())
        .collect()
}
