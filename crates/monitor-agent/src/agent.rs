//! The monitor turn: normalize, remember, compress, attribute, report.
//!
//! One [`MonitorAgent`] holds the memory for one conversation. `run`
//! takes `&mut self`, so turns are processed strictly one at a time.

use std::sync::Arc;

use anyhow::{Context, Result};
use coordination::{
    attribute_memory, compress_history, format_replies, normalize, poll_peers, Artifact,
    Attributor, HttpMessenger, MemorySnapshot, MemoryStore, Message, Messenger, PeerReply,
    SinkError, StatusSink, StatusUpdate, Summarizer, Verdict,
};
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::evaluator::{ModelAttributor, ModelSummarizer};
use crate::llm::{GeminiClient, GenerateConfig, GenerativeModel};
use crate::prompts::EVALUATOR_TAG;

/// Working status sent when a turn starts.
pub const THINKING: &str = "Thinking...";
/// Artifact name for peer poll replies.
pub const PEER_REPLIES_ARTIFACT: &str = "peer-replies";
/// Artifact name for the verdict payload.
pub const VERDICT_ARTIFACT: &str = "Monitor verdict";

/// Per-agent behaviour knobs, split out of [`MonitorConfig`].
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub peer_urls: Vec<String>,
    pub win_threshold: f64,
    pub emit_raw_evaluation: bool,
}

impl From<&MonitorConfig> for AgentSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            peer_urls: config.peer_urls.clone(),
            win_threshold: config.win_threshold,
            emit_raw_evaluation: config.emit_raw_evaluation,
        }
    }
}

/// What a single turn did.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// No sender: peers were polled, memory untouched.
    Polled(Vec<PeerReply>),
    /// No sender and the poll failed; memory untouched.
    PollFailed(String),
    /// A sender but no text parts; memory untouched, no model call.
    Skipped,
    /// The turn was recorded and attributed.
    Evaluated {
        summarized: bool,
        verdict: Option<Verdict>,
    },
}

/// Monitor agent for a single conversation.
pub struct MonitorAgent {
    memory: MemoryStore,
    summarizer: Arc<dyn Summarizer>,
    attributor: Arc<dyn Attributor>,
    messenger: Arc<dyn Messenger>,
    settings: AgentSettings,
}

impl MonitorAgent {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        attributor: Arc<dyn Attributor>,
        messenger: Arc<dyn Messenger>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            memory: MemoryStore::new(),
            summarizer,
            attributor,
            messenger,
            settings,
        }
    }

    /// Build an agent backed by Gemini and the plain-HTTP messenger.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("GEMINI_API_KEY (or GOOGLE_API_KEY) is not set")?;
        let client = GeminiClient::new(api_key, &config.api_base, config.request_timeout())
            .context("Failed to build Gemini client")?;
        // Peer polls wait as long as the slowest peer takes.
        Ok(Self::with_model(
            Arc::new(client),
            Arc::new(HttpMessenger::new()),
            config,
        ))
    }

    /// Build an agent over any generative model.
    pub fn with_model(
        model: Arc<dyn GenerativeModel>,
        messenger: Arc<dyn Messenger>,
        config: &MonitorConfig,
    ) -> Self {
        let generate = GenerateConfig::with_instruction(config.system_instruction.clone());
        let summarizer = ModelSummarizer::new(model.clone(), &config.model, generate.clone());
        let attributor = ModelAttributor::new(model, &config.model, generate);
        Self::new(
            Arc::new(summarizer),
            Arc::new(attributor),
            messenger,
            AgentSettings::from(config),
        )
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn snapshot(&self) -> MemorySnapshot {
        self.memory.snapshot()
    }

    /// Process one inbound message, reporting through `sink`.
    ///
    /// Every update is `working` and none is final: the task stays open
    /// for the caller to close, and the end of the game travels in the
    /// verdict's `game_won`. Model and peer failures degrade silently;
    /// only sink failures are returned.
    pub async fn run(
        &mut self,
        mut message: Message,
        sink: &dyn StatusSink,
    ) -> Result<TurnOutcome, SinkError> {
        sink.update_status(StatusUpdate::working(THINKING)).await?;

        let turn = normalize(&mut message);
        info!(
            message_id = %message.message_id,
            parts = turn.fragments.len(),
            "> Received message: {}",
            turn.text
        );

        if !turn.has_sender {
            return self.poll(&message, sink).await;
        }

        if turn.fragments.is_empty() {
            info!(message_id = %message.message_id, "No text parts, nothing to record");
            return Ok(TurnOutcome::Skipped);
        }

        self.memory.record_turn(&turn);
        let summarized = compress_history(&mut self.memory, self.summarizer.as_ref()).await;

        let outcome = attribute_memory(
            &self.memory,
            self.attributor.as_ref(),
            self.settings.win_threshold,
        )
        .await;

        if let Some(ref verdict) = outcome.verdict {
            let payload = verdict.to_json_string();
            if let Some((leader, share)) = verdict.leader() {
                info!(leader, share, game_won = verdict.game_won, "Verdict");
            }
            sink.update_status(StatusUpdate::working(payload)).await?;
        }

        if self.settings.emit_raw_evaluation {
            if let Some(ref raw) = outcome.raw {
                sink.update_status(StatusUpdate::working(format!("{EVALUATOR_TAG} {raw}")))
                    .await?;
            }
        }

        if let Some(ref verdict) = outcome.verdict {
            sink.add_artifact(Artifact::new(VERDICT_ARTIFACT, verdict.to_json_string()))
                .await?;
        }

        let snapshot = self.memory.snapshot();
        info!(
            history = snapshot.history_entries,
            senders = snapshot.senders,
            summarized,
            "Turn complete"
        );

        Ok(TurnOutcome::Evaluated {
            summarized,
            verdict: outcome.verdict,
        })
    }

    async fn poll(
        &self,
        message: &Message,
        sink: &dyn StatusSink,
    ) -> Result<TurnOutcome, SinkError> {
        let text = message.text();
        match poll_peers(self.messenger.as_ref(), &text, &self.settings.peer_urls).await {
            Ok(replies) => {
                sink.add_artifact(Artifact::new(PEER_REPLIES_ARTIFACT, format_replies(&replies)))
                    .await?;
                Ok(TurnOutcome::Polled(replies))
            }
            Err(e) => {
                warn!("Peer poll failed: {e}");
                Ok(TurnOutcome::PollFailed(e.to_string()))
            }
        }
    }
}
