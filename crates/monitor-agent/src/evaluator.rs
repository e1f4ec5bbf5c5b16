//! Model-backed summarizer and attributor.
//!
//! Both wrap the same [`GenerativeModel`] and model id; only the prompt
//! differs.

use std::sync::Arc;

use async_trait::async_trait;
use coordination::{
    AttributionError, AttributionRequest, Attributor, SummarizationError, Summarizer,
    SummaryRequest,
};

use crate::llm::{GenerateConfig, GenerativeModel};
use crate::prompts;

/// Summarizer that asks the model to compress the history.
pub struct ModelSummarizer {
    model: Arc<dyn GenerativeModel>,
    model_id: String,
    config: GenerateConfig,
}

impl ModelSummarizer {
    pub fn new(model: Arc<dyn GenerativeModel>, model_id: &str, config: GenerateConfig) -> Self {
        Self {
            model,
            model_id: model_id.to_string(),
            config,
        }
    }
}

#[async_trait]
impl Summarizer for ModelSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizationError> {
        let contents = prompts::summary_contents(request);
        let entries = request.history.len();
        match self
            .model
            .generate(&self.model_id, &contents, &self.config)
            .await
        {
            Ok(Some(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            Ok(_) => Err(SummarizationError::empty_summary(&self.model_id, entries)),
            Err(e) => Err(SummarizationError::model_failed(
                &self.model_id,
                &e.to_string(),
                entries,
            )),
        }
    }
}

/// Attributor that asks the model for a sender → percentage object.
pub struct ModelAttributor {
    model: Arc<dyn GenerativeModel>,
    model_id: String,
    config: GenerateConfig,
}

impl ModelAttributor {
    pub fn new(model: Arc<dyn GenerativeModel>, model_id: &str, config: GenerateConfig) -> Self {
        Self {
            model,
            model_id: model_id.to_string(),
            config,
        }
    }
}

#[async_trait]
impl Attributor for ModelAttributor {
    async fn attribute(
        &self,
        request: &AttributionRequest,
    ) -> Result<Option<String>, AttributionError> {
        if request.memory_context.is_empty() {
            return Err(AttributionError::EmptyMemory);
        }
        let contents = prompts::attribution_contents(request);
        self.model
            .generate(&self.model_id, &contents, &self.config)
            .await
            .map_err(|e| AttributionError::RequestFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ModelError;
    use coordination::Contributions;
    use std::sync::Mutex;

    /// Scripted model that records what it was asked.
    struct Scripted {
        reply: Result<Option<&'static str>, &'static str>,
        seen: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl Scripted {
        fn new(reply: Result<Option<&'static str>, &'static str>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GenerativeModel for Scripted {
        async fn generate(
            &self,
            model: &str,
            contents: &[String],
            _config: &GenerateConfig,
        ) -> Result<Option<String>, ModelError> {
            self.seen
                .lock()
                .unwrap()
                .push((model.to_string(), contents.to_vec()));
            match self.reply {
                Ok(text) => Ok(text.map(str::to_string)),
                Err(e) => Err(ModelError::RequestFailed(e.into())),
            }
        }
    }

    fn summary_request() -> SummaryRequest {
        SummaryRequest {
            history: vec!["a: one".into(), "b: two".into()],
            contributions: Contributions::new(),
        }
    }

    #[tokio::test]
    async fn test_summarizer_trims_reply() {
        let model = Scripted::new(Ok(Some("  short summary \n")));
        let summarizer = ModelSummarizer::new(model.clone(), "m-1", GenerateConfig::default());

        let summary = summarizer.summarize(&summary_request()).await.unwrap();
        assert_eq!(summary, "short summary");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].0, "m-1");
        assert_eq!(seen[0].1.len(), 3);
    }

    #[tokio::test]
    async fn test_summarizer_empty_reply_is_error() {
        let summarizer =
            ModelSummarizer::new(Scripted::new(Ok(None)), "m", GenerateConfig::default());
        let err = summarizer.summarize(&summary_request()).await.unwrap_err();
        assert_eq!(err.kind, coordination::SummarizationErrorKind::EmptySummary);
    }

    #[tokio::test]
    async fn test_summarizer_model_failure() {
        let summarizer =
            ModelSummarizer::new(Scripted::new(Err("down")), "m", GenerateConfig::default());
        let err = summarizer.summarize(&summary_request()).await.unwrap_err();
        assert_eq!(err.kind, coordination::SummarizationErrorKind::ModelFailed);
        assert!(err.reason.contains("down"));
    }

    #[tokio::test]
    async fn test_attributor_passes_raw_text_through() {
        let attributor = ModelAttributor::new(
            Scripted::new(Ok(Some("{\"a\": 50}"))),
            "m",
            GenerateConfig::default(),
        );
        let request = AttributionRequest {
            memory_context: "a: one".into(),
            contributions: Contributions::new(),
        };
        let raw = attributor.attribute(&request).await.unwrap();
        assert_eq!(raw.as_deref(), Some("{\"a\": 50}"));
    }

    #[tokio::test]
    async fn test_attributor_rejects_empty_memory() {
        let attributor =
            ModelAttributor::new(Scripted::new(Ok(None)), "m", GenerateConfig::default());
        let request = AttributionRequest {
            memory_context: String::new(),
            contributions: Contributions::new(),
        };
        assert!(matches!(
            attributor.attribute(&request).await,
            Err(AttributionError::EmptyMemory)
        ));
    }
}
