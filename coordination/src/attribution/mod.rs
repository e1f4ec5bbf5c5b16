//! Attribution: crediting the memory context to the senders that shaped it.
//!
//! # Modules
//!
//! - [`parse`]: JSON-then-regex parsing of evaluator output
//! - [`verdict`]: win threshold over the parsed percentages

pub mod parse;
pub mod verdict;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::memory::{Contributions, MemoryStore};

pub use parse::{parse_attribution, Attribution};
pub use verdict::{coerce_percentage, evaluate, max_percentage, Verdict, DEFAULT_WIN_THRESHOLD};

/// Errors from an attribution call.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("Evaluator request failed: {0}")]
    RequestFailed(String),

    #[error("No memory context to attribute")]
    EmptyMemory,
}

/// Input for one attribution call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionRequest {
    /// Current (possibly compressed) memory context.
    pub memory_context: String,
    /// Raw fragments per sender.
    pub contributions: Contributions,
}

impl AttributionRequest {
    pub fn from_memory(memory: &MemoryStore) -> Self {
        Self {
            memory_context: memory.memory_context(),
            contributions: memory.contributions().clone(),
        }
    }
}

/// Trait for evaluators that split credit across senders.
#[async_trait]
pub trait Attributor: Send + Sync {
    /// Ask the evaluator for an attribution. Returns its raw text, or
    /// `None` when it produced nothing.
    async fn attribute(&self, request: &AttributionRequest)
        -> Result<Option<String>, AttributionError>;
}

/// Outcome of one attribution round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributionOutcome {
    /// Raw evaluator text, if the call produced any.
    pub raw: Option<String>,
    /// Parsed verdict, if the text held an attribution object.
    pub verdict: Option<Verdict>,
}

/// Run one attribution round against `memory`.
///
/// Never fails: an empty memory, a failed call, or unparseable output all
/// degrade to an outcome without a verdict.
pub async fn attribute_memory(
    memory: &MemoryStore,
    attributor: &dyn Attributor,
    threshold: f64,
) -> AttributionOutcome {
    if memory.is_empty() {
        return AttributionOutcome::default();
    }

    let request = AttributionRequest::from_memory(memory);
    let raw = match attributor.attribute(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Attribution call failed: {e}");
            return AttributionOutcome::default();
        }
    };

    let verdict = raw
        .as_deref()
        .and_then(parse_attribution)
        .map(|attributions| evaluate(attributions, threshold));

    if let Some(ref v) = verdict {
        info!(
            game_won = v.game_won,
            senders = v.attributions.len(),
            "Attribution computed"
        );
    }

    AttributionOutcome { raw, verdict }
}
