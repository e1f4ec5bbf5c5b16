//! Generative model boundary.
//!
//! The monitor only ever needs "contents in, text out", so the trait is
//! that and nothing more. [`gemini::GeminiClient`] is the production
//! implementation.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Errors from a model call
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API key not configured for {0}")]
    MissingApiKey(String),

    #[error("Model API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response parse error: {0}")]
    ParseError(String),
}

/// Per-call generation settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateConfig {
    pub system_instruction: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerateConfig {
    /// Config carrying only a system instruction.
    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            system_instruction: Some(instruction.into()),
            ..Self::default()
        }
    }
}

/// A text-generating model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a reply to `contents`. `Ok(None)` means the model answered
    /// with no text.
    async fn generate(
        &self,
        model: &str,
        contents: &[String],
        config: &GenerateConfig,
    ) -> Result<Option<String>, ModelError>;
}
