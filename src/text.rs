//! Text extraction helpers
//!
//! Inbound message content arrives in several shapes: plain strings, message
//! objects, arrays of either, or arbitrary JSON. `extract_text` reads all of
//! them through one fixed field priority and never fails.

use serde_json::Value;

/// Field names checked, in order, when reading text out of an object.
const TEXT_FIELDS: &[&str] = &["content", "text", "query", "token"];

/// Best-effort text extraction from a JSON value. Unknown shapes fall back
/// to their serialized form; null reads as the empty string.
pub fn extract_text(candidate: &Value) -> String {
    match candidate {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(extract_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => {
            for field in TEXT_FIELDS {
                if let Some(value) = map.get(*field) {
                    return match value {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                }
            }
            candidate.to_string()
        }
        other => other.to_string(),
    }
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_string() {
        assert_eq!(extract_text(&json!("hello")), "hello");
    }

    #[test]
    fn test_extract_field_priority() {
        assert_eq!(extract_text(&json!({"content": "a", "text": "b"})), "a");
        assert_eq!(extract_text(&json!({"text": "b", "query": "c"})), "b");
        assert_eq!(extract_text(&json!({"query": "c"})), "c");
        assert_eq!(extract_text(&json!({"token": "eth"})), "eth");
    }

    #[test]
    fn test_extract_array_joins_parts() {
        let value = json!(["one", {"content": "two"}, null, "three"]);
        assert_eq!(extract_text(&value), "one two three");
    }

    #[test]
    fn test_extract_never_fails_on_odd_shapes() {
        assert_eq!(extract_text(&json!(null)), "");
        assert_eq!(extract_text(&json!(42)), "42");
        assert_eq!(extract_text(&json!({"content": null})), "");

        // Unknown object shape falls back to serialization
        let fallback = extract_text(&json!({"other": 1}));
        assert!(fallback.contains("other"));
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  latest\n\tcrypto   news "), "latest crypto news");
        assert_eq!(normalize_query("   "), "");
    }
}
