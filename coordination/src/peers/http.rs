//! Plain-HTTP messenger.
//!
//! POSTs `{"text": ...}` to the peer URL. A JSON object reply carrying a
//! `text` field yields that field; anything else yields the raw body.

use async_trait::async_trait;
use serde_json::Value;

use super::{Messenger, PeerError};

/// Reqwest-backed messenger.
#[derive(Debug, Clone)]
pub struct HttpMessenger {
    client: reqwest::Client,
}

impl HttpMessenger {
    /// Create a messenger with no request timeout.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpMessenger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Messenger for HttpMessenger {
    async fn talk_to_agent(&self, text: &str, url: &str) -> Result<String, PeerError> {
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| PeerError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PeerError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(PeerError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(reply_text(body))
    }
}

fn reply_text(body: String) -> String {
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(map)) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            _ => body,
        },
        _ => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_text_and_reads_text_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agent"))
            .and(body_json(serde_json::json!({"text": "status?"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "all good"})),
            )
            .mount(&server)
            .await;

        let messenger = HttpMessenger::new();
        let reply = messenger
            .talk_to_agent("status?", &format!("{}/agent", server.uri()))
            .await
            .unwrap();
        assert_eq!(reply, "all good");
    }

    #[tokio::test]
    async fn test_plain_body_is_returned_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&server)
            .await;

        let reply = HttpMessenger::new()
            .talk_to_agent("ping", &server.uri())
            .await
            .unwrap();
        assert_eq!(reply, "pong");
    }

    #[tokio::test]
    async fn test_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let err = HttpMessenger::new()
            .talk_to_agent("ping", &server.uri())
            .await
            .unwrap_err();
        match err {
            PeerError::BadStatus { status, body, .. } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("expected BadStatus, got {other:?}"),
        }
    }

    #[test]
    fn test_reply_text_non_string_field() {
        assert_eq!(reply_text(r#"{"text": 5}"#.into()), r#"{"text": 5}"#);
        assert_eq!(reply_text("[]".into()), "[]");
    }
}
