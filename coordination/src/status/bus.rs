//! Broadcast status sink
//!
//! Publishes status events on a Tokio broadcast channel so any number of
//! in-process subscribers (CLI printer, tests) can follow a task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::{Artifact, SinkError, StatusEvent, StatusSink, StatusUpdate};

/// Channel capacity for broadcast
const CHANNEL_CAPACITY: usize = 256;

/// Shared reference to a ChannelStatusSink
pub type SharedStatusSink = Arc<ChannelStatusSink>;

/// Status sink backed by a broadcast channel
pub struct ChannelStatusSink {
    sender: broadcast::Sender<StatusEvent>,
    terminal: AtomicBool,
}

impl ChannelStatusSink {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            terminal: AtomicBool::new(false),
        }
    }

    /// Create a shared reference to this sink
    pub fn shared(self) -> SharedStatusSink {
        Arc::new(self)
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: StatusEvent) {
        let event_type = event.event_type();
        match self.sender.send(event) {
            Ok(count) => debug!(event_type, receivers = count, "Status published"),
            // No receivers is fine; nobody is following this task
            Err(_) => debug!(event_type, "Status published (no receivers)"),
        }
    }

    /// Whether a final update has gone out
    pub fn is_terminal(&self) -> bool {
        self.terminal.load(Ordering::SeqCst)
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChannelStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusSink for ChannelStatusSink {
    async fn update_status(&self, update: StatusUpdate) -> Result<(), SinkError> {
        if update.final_update {
            if self.terminal.swap(true, Ordering::SeqCst) {
                return Err(SinkError::Closed);
            }
        } else if self.is_terminal() {
            return Err(SinkError::Closed);
        }
        self.publish(StatusEvent::status(update));
        Ok(())
    }

    async fn add_artifact(&self, artifact: Artifact) -> Result<(), SinkError> {
        if self.is_terminal() {
            return Err(SinkError::Closed);
        }
        self.publish(StatusEvent::artifact(artifact));
        Ok(())
    }
}
