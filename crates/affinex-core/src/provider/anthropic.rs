//! Anthropic Messages API provider.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::{Value, json};

use super::{ExtractionError, ExtractionProvider, TEMPERATURE, TOP_P, body_snippet};
use crate::prompt::SYSTEM_PROMPT;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";
const MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.into(),
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

/// Pull the first text block out of a Messages API response.
fn parse_response(data: &Value) -> Result<String, ExtractionError> {
    let text = data["content"]
        .as_array()
        .and_then(|blocks| blocks.iter().find(|b| b["type"] == "text"))
        .and_then(|b| b["text"].as_str())
        .ok_or_else(|| {
            ExtractionError::MalformedResponse("no text block in response".into())
        })?;
    Ok(text.trim().to_string())
}

impl ExtractionProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "Anthropic"
    }

    fn extract<'a>(
        &'a self,
        prompt: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            let body = json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "system": SYSTEM_PROMPT,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": TEMPERATURE,
                "top_p": TOP_P,
            });

            let resp = client
                .post(API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| ExtractionError::Transport(e.to_string()))?;

            let status = resp.status().as_u16();
            if status == 401 || status == 403 {
                let message = body_snippet(&resp.text().await.unwrap_or_default());
                return Err(ExtractionError::Auth { status, message });
            }
            if !(200..300).contains(&status) {
                let message = body_snippet(&resp.text().await.unwrap_or_default());
                return Err(ExtractionError::Api { status, message });
            }

            let data: Value = resp
                .json()
                .await
                .map_err(|e| ExtractionError::MalformedResponse(e.to_string()))?;
            parse_response(&data)
        })
    }
}
