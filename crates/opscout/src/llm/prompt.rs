//! Prompt construction and response parsing for LLM retrieval.

use std::collections::HashSet;

use opscout_core::{CatalogSnapshot, Error, Result};
use serde_json::Value;

const INSTRUCTIONS: &str = r#"You select tools from a large tool library. Pick the {limit} tools most relevant to the user's requirement.

# Analyze the requirement
Identify the core keywords, the functional goal, the usage scenario and any technical constraints such as data type or modality.

# Match tools
Compare the requirement against each tool's name and description. Weigh functional match most heavily, then scenario fit, then technical fit.

# Filter
Drop tools that duplicate another selected tool's function (keep the better one) and tools that cannot meet the basic requirement. Do not guess at tool attributes that are not described.

# Output
Return at most {limit} tools as a JSON array, best first, and nothing else:
[
  {
    "rank": 1,
    "tool_name": "Tool Name",
    "description": "Core functionality summary",
    "relevance_score": 98.7,
    "key_match": ["matching keywords or features"]
  }
]
"#;

/// Build the retrieval prompt for `query` over every operator in `snapshot`.
pub fn build_prompt(snapshot: &CatalogSnapshot, query: &str, limit: usize) -> String {
    let tools = snapshot
        .records()
        .iter()
        .map(|record| record.embedding_text())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{}\nUser requirement description:\n{query}\n\nAvailable tools:\n{tools}\n",
        INSTRUCTIONS.replace("{limit}", &limit.to_string())
    )
}

/// Extract operator names from a model response.
///
/// Accepts a bare JSON array or one wrapped in a Markdown code fence.
/// Entries without a string `tool_name`, names not in `snapshot` and
/// repeats are dropped with a warning. Other fields are ignored whatever
/// their type. At most `limit` names are returned.
pub fn parse_response(response: &str, snapshot: &CatalogSnapshot, limit: usize) -> Result<Vec<String>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let json = extract_json_array(response)
        .ok_or_else(|| Error::invalid_data("completion response contains no JSON array"))?;
    let entries: Vec<Value> = serde_json::from_str(json)
        .map_err(|e| Error::invalid_data(format!("completion response is not a JSON array: {e}")))?;

    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for entry in &entries {
        // Only the name matters; rank, score and key_match are advisory.
        let Some(name) = entry.get("tool_name").and_then(Value::as_str) else {
            log::warn!("Skipping tool entry without a tool_name: {entry}");
            continue;
        };
        if !snapshot.contains(name) {
            log::warn!("Model returned unknown operator '{name}', skipping");
            continue;
        }
        if seen.insert(name) {
            names.push(name.to_string());
        }
        if names.len() >= limit {
            break;
        }
    }
    Ok(names)
}

fn extract_json_array(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    (start < end).then(|| &response[start..=end])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use opscout_core::OperatorRecord;

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::new(vec![
            OperatorRecord::new("clean_html_mapper", "Remove HTML tags"),
            OperatorRecord::new("document_deduplicator", "Deduplicate documents"),
        ])
    }

    #[test]
    fn test_prompt_contains_query_limit_and_tools() {
        let prompt = build_prompt(&catalog(), "strip markup", 7);
        assert!(prompt.contains("Pick the 7 tools"));
        assert!(prompt.contains("User requirement description:\nstrip markup"));
        assert!(prompt.contains("clean_html_mapper: Remove HTML tags\ndocument_deduplicator: Deduplicate documents"));
        assert!(!prompt.contains("{limit}"));
    }

    #[test]
    fn test_parse_plain_array() {
        let response = r#"[
            {"rank": 1, "tool_name": "document_deduplicator", "relevance_score": 91.0},
            {"rank": 2, "tool_name": "clean_html_mapper", "key_match": ["html"]}
        ]"#;
        let names = parse_response(response, &catalog(), 10).unwrap();
        assert_eq!(names, vec!["document_deduplicator", "clean_html_mapper"]);
    }

    #[test]
    fn test_parse_fenced_array() {
        let response = "```json\n[{\"tool_name\": \"clean_html_mapper\"}]\n```";
        let names = parse_response(response, &catalog(), 10).unwrap();
        assert_eq!(names, vec!["clean_html_mapper"]);
    }

    #[test]
    fn test_parse_drops_unknown_malformed_and_repeated() {
        let response = r#"[
            {"rank": 1, "tool_name": "made_up_operator"},
            {"rank": 2},
            "not an object",
            {"rank": 3, "tool_name": "clean_html_mapper"},
            {"rank": 4, "tool_name": "clean_html_mapper"}
        ]"#;
        let names = parse_response(response, &catalog(), 10).unwrap();
        assert_eq!(names, vec!["clean_html_mapper"]);
    }

    #[test]
    fn test_parse_ignores_loosely_typed_fields() {
        let response = r#"[
            {"rank": "1", "tool_name": "clean_html_mapper", "relevance_score": "high"},
            {"rank": -2, "tool_name": "document_deduplicator", "key_match": "dedup"}
        ]"#;
        let names = parse_response(response, &catalog(), 5).unwrap();
        assert_eq!(names, vec!["clean_html_mapper", "document_deduplicator"]);

        let single = r#"[{"rank": 1, "tool_name": "clean_html_mapper", "key_match": "html"}]"#;
        assert_eq!(
            parse_response(single, &catalog(), 5).unwrap(),
            vec!["clean_html_mapper"]
        );
    }

    #[test]
    fn test_parse_skips_non_string_tool_name() {
        let response = r#"[{"tool_name": 7}, {"tool_name": null}, {"tool_name": "clean_html_mapper"}]"#;
        let names = parse_response(response, &catalog(), 5).unwrap();
        assert_eq!(names, vec!["clean_html_mapper"]);
    }

    #[test]
    fn test_parse_respects_limit() {
        let response = r#"[{"tool_name": "clean_html_mapper"}, {"tool_name": "document_deduplicator"}]"#;
        let names = parse_response(response, &catalog(), 1).unwrap();
        assert_eq!(names, vec!["clean_html_mapper"]);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        let err = parse_response("I could not find anything.", &catalog(), 5).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
