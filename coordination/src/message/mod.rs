//! Inbound message model.
//!
//! Mirrors the shape the agent-to-agent framework hands us: a message
//! made of text parts, each optionally carrying metadata, plus
//! message-level metadata. Only the fields the monitor reads are modelled.

pub mod normalize;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use normalize::{normalize, Fragment, NormalizedTurn, UNKNOWN};

/// Metadata key naming the peer that produced a part or message.
pub const SENDER_KEY: &str = "sender";
/// Metadata key naming the kind of content in a part or message.
pub const TYPE_KEY: &str = "type";
/// Metadata key the per-sender grouping snapshot is written under.
pub const BY_SENDER_KEY: &str = "by_sender";
/// Metadata key the per-type grouping snapshot is written under.
pub const BY_TYPE_KEY: &str = "by_type";

/// Free-form metadata attached to a message or part.
pub type Metadata = Map<String, Value>;

/// A single text part of a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Text content; non-text parts deserialize with an empty string.
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Part {
    /// Create a text part without metadata.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: None,
        }
    }

    /// Attach a sender to this part.
    pub fn with_sender(self, sender: &str) -> Self {
        self.with_meta(SENDER_KEY, Value::String(sender.to_string()))
    }

    /// Attach a content type to this part.
    pub fn with_type(self, kind: &str) -> Self {
        self.with_meta(TYPE_KEY, Value::String(kind.to_string()))
    }

    fn with_meta(mut self, key: &str, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value);
        self
    }
}

/// An inbound message as delivered by the surrounding framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(default = "new_message_id")]
    pub message_id: String,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Message {
    /// Create a message from parts, with no message-level metadata.
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            message_id: new_message_id(),
            parts,
            metadata: None,
        }
    }

    /// Convenience constructor for a single-part message.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Part::text(text)])
    }

    /// Set the message-level sender.
    pub fn with_sender(mut self, sender: &str) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(SENDER_KEY.to_string(), Value::String(sender.to_string()));
        self
    }

    /// Set the message-level content type.
    pub fn with_type(mut self, kind: &str) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(TYPE_KEY.to_string(), Value::String(kind.to_string()));
        self
    }

    /// All part texts joined by newlines.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Message-level metadata value for `key`, if present and non-empty.
    pub fn meta_str(&self, key: &str) -> Option<String> {
        lookup(self.metadata.as_ref(), key)
    }
}

/// Read a metadata key as a string. Strings are used verbatim, other JSON
/// values are rendered as JSON text. Empty strings and nulls are absent.
pub(crate) fn lookup(metadata: Option<&Metadata>, key: &str) -> Option<String> {
    let value = metadata?.get(key)?;
    let rendered = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_text_joins_parts() {
        let msg = Message::new(vec![Part::text("first"), Part::text("second")]);
        assert_eq!(msg.text(), "first\nsecond");
    }

    #[test]
    fn test_message_deserializes_framework_shape() {
        let msg: Message = serde_json::from_value(json!({
            "messageId": "m-1",
            "parts": [
                {"kind": "text", "text": "hello", "metadata": {"sender": "alice"}},
                {"kind": "file"}
            ],
            "metadata": {"type": "answer"}
        }))
        .unwrap();

        assert_eq!(msg.message_id, "m-1");
        assert_eq!(msg.parts.len(), 2);
        assert_eq!(msg.parts[1].text, "");
        assert_eq!(msg.meta_str(TYPE_KEY).as_deref(), Some("answer"));
        assert_eq!(msg.meta_str(SENDER_KEY), None);
    }

    #[test]
    fn test_missing_message_id_is_generated() {
        let msg: Message = serde_json::from_value(json!({"parts": []})).unwrap();
        assert!(!msg.message_id.is_empty());
    }

    #[test]
    fn test_lookup_renders_non_string_values() {
        let mut meta = Metadata::new();
        meta.insert("sender".into(), json!(7));
        meta.insert("type".into(), json!(""));
        meta.insert("other".into(), Value::Null);
        assert_eq!(lookup(Some(&meta), "sender").as_deref(), Some("7"));
        assert_eq!(lookup(Some(&meta), "type"), None);
        assert_eq!(lookup(Some(&meta), "other"), None);
        assert_eq!(lookup(None, "sender"), None);
    }
}
