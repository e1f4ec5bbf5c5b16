//! Threshold-based win condition over an attribution.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::parse::Attribution;

/// Default percentage a single sender must exceed to win.
pub const DEFAULT_WIN_THRESHOLD: f64 = 80.0;

/// Outcome of one attribution round, as emitted to the task updater.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub game_won: bool,
    pub attributions: Attribution,
}

impl Verdict {
    /// Serialize as the JSON status payload.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"game_won\":{},\"attributions\":{{}}}}", self.game_won)
        })
    }

    /// The sender holding the largest coercible share, if any.
    pub fn leader(&self) -> Option<(&str, f64)> {
        self.attributions
            .iter()
            .filter_map(|(sender, v)| coerce_percentage(v).map(|p| (sender.as_str(), p)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Compute the verdict for `attributions`.
///
/// `game_won` is true exactly when the largest value exceeds `threshold`.
/// If any value cannot be read as a number the game is not won.
pub fn evaluate(attributions: Attribution, threshold: f64) -> Verdict {
    let game_won = max_percentage(&attributions).is_some_and(|max| max > threshold);
    Verdict {
        game_won,
        attributions,
    }
}

/// Largest value in the map, or `None` if it is empty or any value fails coercion.
pub fn max_percentage(attributions: &Attribution) -> Option<f64> {
    let mut max: Option<f64> = None;
    for value in attributions.values() {
        let p = coerce_percentage(value)?;
        max = Some(max.map_or(p, |m| m.max(p)));
    }
    max
}

/// Read a JSON value as a percentage. Numbers are taken as-is; strings are
/// trimmed and may carry a trailing `%`.
pub fn coerce_percentage(value: &Value) -> Option<f64> {
    let p = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if p.is_nan() {
        None
    } else {
        Some(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attribution(value: Value) -> Attribution {
        match value {
            Value::Object(map) => map,
            _ => panic!("test attribution must be an object"),
        }
    }

    #[test]
    fn test_won_above_threshold() {
        let verdict = evaluate(attribution(json!({"alice": 81, "bob": 19})), DEFAULT_WIN_THRESHOLD);
        assert!(verdict.game_won);
        assert_eq!(verdict.leader(), Some(("alice", 81.0)));
    }

    #[test]
    fn test_exactly_threshold_is_not_won() {
        let verdict = evaluate(attribution(json!({"alice": 80, "bob": 20})), DEFAULT_WIN_THRESHOLD);
        assert!(!verdict.game_won);
    }

    #[test]
    fn test_string_percentages_are_coerced() {
        let verdict = evaluate(
            attribution(json!({"alice": "90%", "bob": " 10 "})),
            DEFAULT_WIN_THRESHOLD,
        );
        assert!(verdict.game_won);
    }

    #[test]
    fn test_coercion_failure_is_not_won() {
        let verdict = evaluate(
            attribution(json!({"alice": 95, "bob": "a lot"})),
            DEFAULT_WIN_THRESHOLD,
        );
        assert!(!verdict.game_won);
        assert_eq!(verdict.attributions.len(), 2);
    }

    #[test]
    fn test_empty_is_not_won() {
        let verdict = evaluate(Attribution::new(), DEFAULT_WIN_THRESHOLD);
        assert!(!verdict.game_won);
        assert_eq!(verdict.leader(), None);
    }

    #[test]
    fn test_no_sum_invariant() {
        let verdict = evaluate(attribution(json!({"alice": 85, "bob": 85})), DEFAULT_WIN_THRESHOLD);
        assert!(verdict.game_won);
    }

    #[test]
    fn test_custom_threshold() {
        let verdict = evaluate(attribution(json!({"alice": 55})), 50.0);
        assert!(verdict.game_won);
    }

    #[test]
    fn test_payload_shape() {
        let verdict = evaluate(attribution(json!({"alice": 40})), DEFAULT_WIN_THRESHOLD);
        let payload: Value = serde_json::from_str(&verdict.to_json_string()).unwrap();
        assert_eq!(payload, json!({"game_won": false, "attributions": {"alice": 40}}));
    }

    #[test]
    fn test_coerce_rejects_non_numeric() {
        assert_eq!(coerce_percentage(&json!(null)), None);
        assert_eq!(coerce_percentage(&json!(true)), None);
        assert_eq!(coerce_percentage(&json!([50])), None);
        assert_eq!(coerce_percentage(&json!("NaN")), None);
        assert_eq!(coerce_percentage(&json!(12.5)), Some(12.5));
    }
}
