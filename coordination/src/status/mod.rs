//! Task status reporting.
//!
//! The surrounding framework hands every turn a task updater; the monitor
//! only needs its two operations, captured by [`StatusSink`].
//!
//! # Modules
//!
//! - [`bus`]: broadcast-backed sink for in-process subscribers

pub mod bus;

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bus::{ChannelStatusSink, SharedStatusSink};

/// Errors from a status sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Status sink closed")]
    Closed,

    #[error("Failed to deliver status: {0}")]
    DeliveryFailed(String),
}

/// Lifecycle state reported with a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskState {
    Working,
    Completed,
    Failed,
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Working => write!(f, "working"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A status update carrying agent text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub state: TaskState,
    pub text: String,
    /// Whether this update ends the task.
    #[serde(rename = "final")]
    pub final_update: bool,
}

impl StatusUpdate {
    pub fn working(text: impl Into<String>) -> Self {
        Self {
            state: TaskState::Working,
            text: text.into(),
            final_update: false,
        }
    }

    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            state: TaskState::Completed,
            text: text.into(),
            final_update: true,
        }
    }

}

/// A named text artifact attached to the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub text: String,
}

impl Artifact {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Anything reported through a sink, timestamped for subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatusEvent {
    Status {
        #[serde(flatten)]
        update: StatusUpdate,
        timestamp: DateTime<Utc>,
    },
    Artifact {
        #[serde(flatten)]
        artifact: Artifact,
        timestamp: DateTime<Utc>,
    },
}

impl StatusEvent {
    pub fn status(update: StatusUpdate) -> Self {
        Self::Status {
            update,
            timestamp: Utc::now(),
        }
    }

    pub fn artifact(artifact: Artifact) -> Self {
        Self::Artifact {
            artifact,
            timestamp: Utc::now(),
        }
    }

    /// Whether this event ends the task.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Status { update, .. } if update.final_update)
    }

    /// Event type name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Artifact { .. } => "artifact",
        }
    }
}

/// Report progress and results for the current task.
///
/// Once a final update has been delivered the task is terminal and every
/// later call fails with [`SinkError::Closed`].
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn update_status(&self, update: StatusUpdate) -> Result<(), SinkError>;

    async fn add_artifact(&self, artifact: Artifact) -> Result<(), SinkError>;
}

/// Sink that keeps everything it receives, in order, and refuses events
/// after a final update.
#[derive(Debug, Default)]
pub struct RecordingStatusSink {
    events: Mutex<Vec<StatusEvent>>,
}

impl RecordingStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    pub fn events(&self) -> Vec<StatusEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Recorded status updates, oldest first.
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Status { update, .. } => Some(update),
                StatusEvent::Artifact { .. } => None,
            })
            .collect()
    }

    /// Recorded artifacts, oldest first.
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                StatusEvent::Artifact { artifact, .. } => Some(artifact),
                StatusEvent::Status { .. } => None,
            })
            .collect()
    }

    /// Whether a final update has been recorded.
    pub fn is_terminal(&self) -> bool {
        self.events
            .lock()
            .map(|events| events.iter().any(StatusEvent::is_final))
            .unwrap_or(false)
    }

    fn push(&self, event: StatusEvent) -> Result<(), SinkError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| SinkError::DeliveryFailed(e.to_string()))?;
        if events.iter().any(StatusEvent::is_final) {
            return Err(SinkError::Closed);
        }
        events.push(event);
        Ok(())
    }
}

#[async_trait]
impl StatusSink for RecordingStatusSink {
    async fn update_status(&self, update: StatusUpdate) -> Result<(), SinkError> {
        self.push(StatusEvent::status(update))
    }

    async fn add_artifact(&self, artifact: Artifact) -> Result<(), SinkError> {
        self.push(StatusEvent::artifact(artifact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sink_keeps_order() {
        let sink = RecordingStatusSink::new();
        sink.update_status(StatusUpdate::working("Thinking..."))
            .await
            .unwrap();
        sink.add_artifact(Artifact::new("out", "text")).await.unwrap();
        sink.update_status(StatusUpdate::completed("done"))
            .await
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[1].event_type(), "artifact");
        assert_eq!(sink.updates().len(), 2);
        assert_eq!(sink.artifacts(), vec![Artifact::new("out", "text")]);
    }

    #[tokio::test]
    async fn test_recording_sink_rejects_events_after_final() {
        let sink = RecordingStatusSink::new();
        sink.update_status(StatusUpdate::completed("done"))
            .await
            .unwrap();
        assert!(sink.is_terminal());

        let err = sink
            .update_status(StatusUpdate::working("late"))
            .await
            .unwrap_err();
        assert!(matches!(err, SinkError::Closed));
        assert!(matches!(
            sink.add_artifact(Artifact::new("late", "x")).await,
            Err(SinkError::Closed)
        ));
        assert_eq!(sink.events().len(), 1);
    }

    #[test]
    fn test_status_event_serde_shape() {
        let event = StatusEvent::status(StatusUpdate::working("hi"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "status");
        assert_eq!(json["state"], "working");
        assert_eq!(json["final"], false);
        let parsed: StatusEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_task_state_display() {
        assert_eq!(TaskState::Working.to_string(), "working");
        assert_eq!(TaskState::Completed.to_string(), "completed");
        assert_eq!(TaskState::Failed.to_string(), "failed");
    }
}
