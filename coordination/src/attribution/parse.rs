//! Parse evaluator output into a sender → percentage map.
//!
//! The evaluator is asked for a bare JSON object but often wraps it in
//! prose or a fenced block, so a permissive extraction runs second.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Sender id to the percentage the evaluator credited it with.
///
/// Values are kept as the evaluator produced them; coercion happens when
/// the verdict is computed.
pub type Attribution = Map<String, Value>;

/// First `{` through last `}`, across newlines.
static OBJECT_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("OBJECT_SPAN regex should compile"));

/// Parse `raw` as an attribution object.
///
/// Tries the whole text as JSON first, then the first brace-delimited
/// span. Returns `None` when neither yields a JSON object.
pub fn parse_attribution(raw: &str) -> Option<Attribution> {
    if let Some(map) = as_object(raw.trim()) {
        return Some(map);
    }

    let span = OBJECT_SPAN.find(raw)?;
    match as_object(span.as_str()) {
        Some(map) => Some(map),
        None => {
            debug!(len = raw.len(), "No attribution object in evaluator output");
            None
        }
    }
}

fn as_object(text: &str) -> Option<Attribution> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pure_json() {
        let parsed = parse_attribution(r#"{"alice": 70, "bob": 30}"#).unwrap();
        assert_eq!(parsed["alice"], json!(70));
        assert_eq!(parsed["bob"], json!(30));
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = "Here is my assessment:\n{\"alice\": 85.5,\n \"bob\": 14.5}\nHope that helps.";
        let parsed = parse_attribution(raw).unwrap();
        assert_eq!(parsed["alice"], json!(85.5));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_fenced_block() {
        let raw = "```json\n{\"alice\": \"60\", \"bob\": \"40\"}\n```";
        let parsed = parse_attribution(raw).unwrap();
        assert_eq!(parsed["alice"], json!("60"));
    }

    #[test]
    fn test_keys_keep_evaluator_order() {
        let parsed = parse_attribution(r#"{"zed": 10, "amy": 90}"#).unwrap();
        let keys: Vec<_> = parsed.keys().cloned().collect();
        assert_eq!(keys, vec!["zed", "amy"]);
    }

    #[test]
    fn test_no_object_is_none() {
        assert!(parse_attribution("I cannot attribute this.").is_none());
        assert!(parse_attribution("").is_none());
    }

    #[test]
    fn test_non_object_json_is_none() {
        assert!(parse_attribution("[1, 2, 3]").is_none());
        assert!(parse_attribution("42").is_none());
    }

    #[test]
    fn test_broken_span_is_none() {
        assert!(parse_attribution("result: {alice: seventy}").is_none());
    }

    #[test]
    fn test_two_objects_in_prose_is_none() {
        // The span runs from the first `{` to the last `}`.
        assert!(parse_attribution(r#"{"a":1} and {"b":2}"#).is_none());
    }

    #[test]
    fn test_nested_object_in_prose_survives() {
        let parsed = parse_attribution(r#"Result: {"a": {"b": 2}} ok"#).unwrap();
        assert_eq!(parsed["a"], json!({"b": 2}));
    }
}
