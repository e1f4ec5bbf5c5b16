//! Monitor Coordination Library
//!
//! This library provides the model-independent half of the monitor agent:
//! - Inbound message normalization into sender-prefixed lines
//! - Monitor memory: rolling history plus per-sender contributions
//! - Summarizer and attributor contracts, with attribution parsing and the
//!   threshold win condition
//! - Task status reporting sinks
//! - Peer messaging and wait-for-all fan-out polling
//!
//! # Turn flow
//!
//! ```text
//! Message ──normalize──▶ NormalizedTurn ──record_turn──▶ MemoryStore
//!                                                         │
//!                         compress_history (≥ 2 entries) ◀┘
//!                                                         │
//!                         attribute_memory ──▶ Verdict ──▶ StatusSink
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod attribution;
pub mod memory;
pub mod message;
pub mod peers;
pub mod status;

// Re-export key message types
pub use message::{normalize, Fragment, Message, Metadata, NormalizedTurn, Part, UNKNOWN};

// Re-export key memory types
pub use memory::{
    compress_history, Contributions, MemoryEntry, MemoryEntryKind, MemorySnapshot, MemoryStore,
    MockSummarizer, SummarizationError, SummarizationErrorKind, Summarizer, SummaryRequest,
};

// Re-export key attribution types
pub use attribution::{
    attribute_memory, evaluate, parse_attribution, Attribution, AttributionError,
    AttributionOutcome, AttributionRequest, Attributor, Verdict, DEFAULT_WIN_THRESHOLD,
};

// Re-export status types
pub use status::{
    Artifact, ChannelStatusSink, RecordingStatusSink, SharedStatusSink, SinkError, StatusEvent,
    StatusSink, StatusUpdate, TaskState,
};

// Re-export peer types
pub use peers::{format_replies, poll_peers, HttpMessenger, Messenger, PeerError, PeerReply};
