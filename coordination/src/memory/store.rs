//! Monitor memory: the rolling history plus per-sender contributions.
//!
//! History is the memory context the model sees. Contributions keep every
//! raw fragment a sender produced and are never pruned.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::message::NormalizedTurn;

/// Sender id to the fragments it produced. Senders keep first-seen order,
/// fragments keep arrival order.
pub type Contributions = IndexMap<String, Vec<String>>;

/// Kind of history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryEntryKind {
    /// A normalized inbound turn.
    Turn,
    /// Compressed summary that replaced earlier entries.
    Summary,
}

impl std::fmt::Display for MemoryEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Turn => write!(f, "turn"),
            Self::Summary => write!(f, "summary"),
        }
    }
}

/// A single entry in the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Monotonic sequence number.
    pub seq: u64,
    pub kind: MemoryEntryKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of the memory for logging and inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub history_entries: usize,
    pub summary_count: usize,
    pub senders: usize,
    pub fragments: usize,
    /// Turns recorded since the store was created, including compressed ones.
    pub turns_recorded: u64,
}

/// In-process memory for a single monitor instance.
#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: Vec<MemoryEntry>,
    by_sender: Contributions,
    next_seq: u64,
    turns_recorded: u64,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            next_seq: 1,
            ..Self::default()
        }
    }

    fn push(&mut self, kind: MemoryEntryKind, content: String) -> u64 {
        let seq = self.next_seq.max(1);
        self.next_seq = seq + 1;
        self.messages.push(MemoryEntry {
            seq,
            kind,
            content,
            created_at: Utc::now(),
        });
        seq
    }

    /// Append a normalized turn to history and credit each fragment to
    /// its sender. Returns the sequence number of the new history entry.
    pub fn record_turn(&mut self, turn: &NormalizedTurn) -> u64 {
        for fragment in &turn.fragments {
            self.by_sender
                .entry(fragment.sender.clone())
                .or_default()
                .push(fragment.text.clone());
        }
        self.turns_recorded += 1;
        self.push(MemoryEntryKind::Turn, turn.text.clone())
    }

    /// Whether the history is long enough to be compressed.
    pub fn needs_summary(&self) -> bool {
        self.messages.len() >= 2
    }

    /// Replace the whole history with a single summary entry.
    pub fn replace_with_summary(&mut self, summary: String) -> u64 {
        self.messages.clear();
        self.push(MemoryEntryKind::Summary, summary)
    }

    /// History entries in order.
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.messages
    }

    /// History contents in order.
    pub fn history_texts(&self) -> Vec<String> {
        self.messages.iter().map(|e| e.content.clone()).collect()
    }

    /// History joined into one memory-context string.
    pub fn memory_context(&self) -> String {
        self.messages
            .iter()
            .map(|e| e.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn contributions(&self) -> &Contributions {
        &self.by_sender
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot {
            history_entries: self.messages.len(),
            summary_count: self
                .messages
                .iter()
                .filter(|e| e.kind == MemoryEntryKind::Summary)
                .count(),
            senders: self.by_sender.len(),
            fragments: self.by_sender.values().map(Vec::len).sum(),
            turns_recorded: self.turns_recorded,
        }
    }
}
