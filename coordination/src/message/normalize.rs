//! Flatten an inbound message into sender-prefixed lines.
//!
//! Sender and type resolve part metadata first, then message metadata,
//! then the literal `"unknown"`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{lookup, Message, BY_SENDER_KEY, BY_TYPE_KEY, SENDER_KEY, TYPE_KEY};

/// Placeholder for a missing sender or type.
pub const UNKNOWN: &str = "unknown";

/// One part of a message after sender/type resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub sender: String,
    pub kind: String,
    pub text: String,
}

/// Result of normalizing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTurn {
    /// `"sender: text"` lines joined by newlines, in arrival order.
    pub text: String,
    /// Resolved parts, in arrival order.
    pub fragments: Vec<Fragment>,
    /// Whether the message or any of its parts named a sender.
    pub has_sender: bool,
}

impl NormalizedTurn {
    /// Distinct senders in first-seen order.
    pub fn senders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for fragment in &self.fragments {
            if !seen.contains(&fragment.sender.as_str()) {
                seen.push(&fragment.sender);
            }
        }
        seen
    }
}

/// Normalize `message` and write the grouping snapshot back into its metadata.
pub fn normalize(message: &mut Message) -> NormalizedTurn {
    let message_sender = message.meta_str(SENDER_KEY);
    let message_type = message.meta_str(TYPE_KEY);
    let mut has_sender = message_sender.is_some();

    let mut fragments = Vec::with_capacity(message.parts.len());
    for part in &message.parts {
        let part_sender = lookup(part.metadata.as_ref(), SENDER_KEY);
        has_sender |= part_sender.is_some();

        let sender = part_sender
            .or_else(|| message_sender.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let kind = lookup(part.metadata.as_ref(), TYPE_KEY)
            .or_else(|| message_type.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        fragments.push(Fragment {
            sender,
            kind,
            text: part.text.clone(),
        });
    }

    let text = fragments
        .iter()
        .map(|f| format!("{}: {}", f.sender, f.text))
        .collect::<Vec<_>>()
        .join("\n");

    let metadata = message.metadata.get_or_insert_with(Map::new);
    metadata.insert(
        BY_SENDER_KEY.to_string(),
        group(&fragments, |f| f.sender.as_str()),
    );
    metadata.insert(
        BY_TYPE_KEY.to_string(),
        group(&fragments, |f| f.kind.as_str()),
    );

    NormalizedTurn {
        text,
        fragments,
        has_sender,
    }
}

fn group<'a>(fragments: &'a [Fragment], key: impl Fn(&'a Fragment) -> &'a str) -> Value {
    let mut grouped: Map<String, Value> = Map::new();
    for fragment in fragments {
        let bucket = grouped
            .entry(key(fragment).to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = bucket {
            items.push(Value::String(fragment.text.clone()));
        }
    }
    Value::Object(grouped)
}
