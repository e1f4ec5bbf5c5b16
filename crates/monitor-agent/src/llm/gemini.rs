//! Gemini `generateContent` client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{GenerateConfig, GenerativeModel, ModelError};

/// Reqwest-backed Gemini client.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against `base_url` (no trailing path).
    pub fn new(api_key: String, base_url: &str, timeout: Duration) -> Result<Self, ModelError> {
        if api_key.is_empty() {
            return Err(ModelError::MissingApiKey("gemini".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::RequestFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

/// Build the request body: one user content per input string.
pub(crate) fn request_body(contents: &[String], config: &GenerateConfig) -> Value {
    let contents: Vec<Value> = contents
        .iter()
        .map(|text| json!({"role": "user", "parts": [{"text": text}]}))
        .collect();

    let mut body = json!({ "contents": contents });

    if let Some(ref system) = config.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{"text": system}] });
    }

    let mut generation = serde_json::Map::new();
    if let Some(t) = config.temperature {
        generation.insert("temperature".into(), json!(t));
    }
    if let Some(max) = config.max_output_tokens {
        generation.insert("maxOutputTokens".into(), json!(max));
    }
    if !generation.is_empty() {
        body["generationConfig"] = Value::Object(generation);
    }

    body
}

/// Concatenated text of the first candidate, `None` when there is none.
pub(crate) fn response_text(resp: &Value) -> Option<String> {
    let parts = resp["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        contents: &[String],
        config: &GenerateConfig,
    ) -> Result<Option<String>, ModelError> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(contents, config))
            .send()
            .await
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let resp_json: Value = response
            .json()
            .await
            .map_err(|e| ModelError::ParseError(e.to_string()))?;

        let text = response_text(&resp_json);
        debug!(
            model,
            contents = contents.len(),
            chars = text.as_ref().map_or(0, String::len),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Gemini call complete"
        );
        Ok(text)
    }
}
