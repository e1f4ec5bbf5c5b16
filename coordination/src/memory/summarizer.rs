//! Summarizer contract for history compression.
//!
//! Defines the request shape and the async summarizer interface, plus a
//! deterministic mock for testing. The real implementation delegates to
//! the generative model in the agent crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::errors::SummarizationError;
use super::store::{Contributions, MemoryStore};

/// Input for one summarization call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Current history, oldest first.
    pub history: Vec<String>,
    /// Everything each sender has contributed so far.
    pub contributions: Contributions,
}

impl SummaryRequest {
    /// Build a request from the current memory.
    pub fn from_memory(memory: &MemoryStore) -> Self {
        Self {
            history: memory.history_texts(),
            contributions: memory.contributions().clone(),
        }
    }
}

/// Trait for summarizers.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Compress the history into a single summary text.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizationError>;
}

/// Compress `memory` if it holds two or more history entries.
///
/// On success the whole history is replaced with one summary entry and
/// `true` is returned. Failures leave the history untouched.
pub async fn compress_history(memory: &mut MemoryStore, summarizer: &dyn Summarizer) -> bool {
    if !memory.needs_summary() {
        return false;
    }

    let request = SummaryRequest::from_memory(memory);
    match summarizer.summarize(&request).await {
        Ok(summary) if !summary.trim().is_empty() => {
            let before = memory.len();
            memory.replace_with_summary(summary);
            debug!(entries_compressed = before, "History replaced with summary");
            true
        }
        Ok(_) => {
            warn!("Summarizer returned empty text; keeping history");
            false
        }
        Err(e) => {
            warn!(action = e.kind.suggested_action(), "{e}");
            false
        }
    }
}

/// Deterministic mock summarizer for testing.
///
/// Joins the history entries with `" | "`.
pub struct MockSummarizer {
    /// Simulated model name.
    pub model_name: String,
    /// Whether to simulate failure.
    pub should_fail: bool,
}

impl MockSummarizer {
    /// Create a working mock summarizer.
    pub fn new() -> Self {
        Self {
            model_name: "mock-summarizer".to_string(),
            should_fail: false,
        }
    }

    /// Create a mock that always fails.
    pub fn failing() -> Self {
        Self {
            model_name: "mock-summarizer-fail".to_string(),
            should_fail: true,
        }
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizationError> {
        if self.should_fail {
            return Err(SummarizationError::model_failed(
                &self.model_name,
                "simulated failure",
                request.history.len(),
            ));
        }
        Ok(request.history.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryEntryKind;
    use crate::message::{normalize, Message, Part};

    fn memory_with(turns: &[(&str, &str)]) -> MemoryStore {
        let mut memory = MemoryStore::new();
        for (sender, text) in turns {
            let turn = normalize(&mut Message::new(vec![Part::text(*text).with_sender(sender)]));
            memory.record_turn(&turn);
        }
        memory
    }

    #[tokio::test]
    async fn test_compress_collapses_history() {
        let mut memory = memory_with(&[("a", "one"), ("b", "two"), ("a", "three")]);
        let compressed = compress_history(&mut memory, &MockSummarizer::new()).await;

        assert!(compressed);
        assert_eq!(memory.len(), 1);
        assert_eq!(memory.entries()[0].kind, MemoryEntryKind::Summary);
        assert_eq!(memory.memory_context(), "a: one | b: two | a: three");
    }

    #[tokio::test]
    async fn test_single_entry_is_not_compressed() {
        let mut memory = memory_with(&[("a", "one")]);
        assert!(!compress_history(&mut memory, &MockSummarizer::new()).await);
        assert_eq!(memory.entries()[0].kind, MemoryEntryKind::Turn);
    }

    #[tokio::test]
    async fn test_failure_keeps_history() {
        let mut memory = memory_with(&[("a", "one"), ("b", "two")]);
        assert!(!compress_history(&mut memory, &MockSummarizer::failing()).await);
        assert_eq!(memory.history_texts(), vec!["a: one", "b: two"]);
    }

    #[tokio::test]
    async fn test_blank_summary_keeps_history() {
        struct Blank;

        #[async_trait]
        impl Summarizer for Blank {
            async fn summarize(&self, _: &SummaryRequest) -> Result<String, SummarizationError> {
                Ok("   ".into())
            }
        }

        let mut memory = memory_with(&[("a", "one"), ("b", "two")]);
        assert!(!compress_history(&mut memory, &Blank).await);
        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_request_from_memory() {
        let memory = memory_with(&[("a", "one"), ("b", "two")]);
        let request = SummaryRequest::from_memory(&memory);
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.contributions["b"], vec!["two"]);
    }
}
