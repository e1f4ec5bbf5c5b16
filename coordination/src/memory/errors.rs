//! Summarization error taxonomy.
//!
//! The monitor degrades silently on these, but callers still get a typed
//! reason to log.

use serde::{Deserialize, Serialize};

/// High-level failure kind for a summarization attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizationErrorKind {
    /// Nothing in the history to summarize.
    EmptyInput,
    /// The model call itself failed.
    ModelFailed,
    /// The model answered with no usable text.
    EmptySummary,
}

impl SummarizationErrorKind {
    /// Suggested action for this error kind.
    pub fn suggested_action(self) -> &'static str {
        match self {
            Self::EmptyInput => "skip summarization, nothing recorded yet",
            Self::ModelFailed => "keep the uncompressed history and retry next turn",
            Self::EmptySummary => "keep the uncompressed history",
        }
    }
}

impl std::fmt::Display for SummarizationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty_input"),
            Self::ModelFailed => write!(f, "model_failed"),
            Self::EmptySummary => write!(f, "empty_summary"),
        }
    }
}

/// Summarization error with context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizationError {
    pub kind: SummarizationErrorKind,
    /// The model that was used.
    pub model: String,
    /// What went wrong.
    pub reason: String,
    /// Number of history entries that were being summarized.
    pub entry_count: usize,
}

impl SummarizationError {
    /// Create a new summarization error.
    pub fn new(kind: SummarizationErrorKind, model: &str, reason: &str, entry_count: usize) -> Self {
        Self {
            kind,
            model: model.to_string(),
            reason: reason.to_string(),
            entry_count,
        }
    }

    /// The model call failed.
    pub fn model_failed(model: &str, reason: &str, entry_count: usize) -> Self {
        Self::new(SummarizationErrorKind::ModelFailed, model, reason, entry_count)
    }

    /// The model returned nothing usable.
    pub fn empty_summary(model: &str, entry_count: usize) -> Self {
        Self::new(
            SummarizationErrorKind::EmptySummary,
            model,
            "model returned no summary text",
            entry_count,
        )
    }
}

impl std::fmt::Display for SummarizationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "summarization failed [{}] [{}]: {} ({} entries)",
            self.kind, self.model, self.reason, self.entry_count
        )
    }
}

impl std::error::Error for SummarizationError {}
