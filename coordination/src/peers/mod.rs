//! Peer messaging and fan-out polling.
//!
//! The monitor reaches other agents only through an injected
//! [`Messenger`]. Polling fans one text out to every configured peer and
//! waits for all of them.

pub mod http;

use async_trait::async_trait;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use http::HttpMessenger;

/// Errors from peer messaging
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("Request to {url} failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Peer {url} returned HTTP {status}: {body}")]
    BadStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("No peers configured")]
    NoPeers,
}

/// Send raw text to another agent and get its reply.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn talk_to_agent(&self, text: &str, url: &str) -> Result<String, PeerError>;
}

/// One peer's reply to a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerReply {
    pub url: String,
    pub reply: String,
}

/// Render replies as `url: reply` lines.
pub fn format_replies(replies: &[PeerReply]) -> String {
    replies
        .iter()
        .map(|r| format!("{}: {}", r.url, r.reply))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Send `text` to every peer concurrently and wait for all replies.
///
/// Replies come back in `urls` order. The first failure fails the whole
/// poll; there is no timeout or retry beyond what the messenger does.
pub async fn poll_peers(
    messenger: &dyn Messenger,
    text: &str,
    urls: &[String],
) -> Result<Vec<PeerReply>, PeerError> {
    if urls.is_empty() {
        return Err(PeerError::NoPeers);
    }

    info!(peers = urls.len(), "Polling peers");
    let calls = urls.iter().map(|url| async move {
        let reply = messenger.talk_to_agent(text, url).await?;
        debug!(%url, len = reply.len(), "Peer replied");
        Ok::<_, PeerError>(PeerReply {
            url: url.clone(),
            reply,
        })
    });

    try_join_all(calls).await
}
