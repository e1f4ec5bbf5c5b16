//! Monitor memory: history and per-sender contribution tracking.
//!
//! # Modules
//!
//! - [`store`]: MemoryStore, MemoryEntry, per-sender contributions
//! - [`errors`]: Typed error taxonomy for summarization
//! - [`summarizer`]: Summarizer trait and history compression

pub mod errors;
pub mod store;
pub mod summarizer;

pub use errors::{SummarizationError, SummarizationErrorKind};
pub use store::{Contributions, MemoryEntry, MemoryEntryKind, MemorySnapshot, MemoryStore};
pub use summarizer::{compress_history, MockSummarizer, SummaryRequest, Summarizer};
