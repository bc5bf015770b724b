//! Google Gemini generateContent provider.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::{Value, json};

use super::{ExtractionError, ExtractionProvider, TEMPERATURE, TOP_P, body_snippet};
use crate::prompt::SYSTEM_PROMPT;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";

pub struct GeminiProvider {
    api_key: String,
    model: String,
}

impl GeminiProvider {
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

/// Concatenate the text parts of the first candidate.
fn parse_response(data: &Value) -> Result<String, ExtractionError> {
    let parts = data["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            ExtractionError::MalformedResponse("no candidate parts in response".into())
        })?;
    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        return Err(ExtractionError::MalformedResponse(
            "candidate contained no text".into(),
        ));
    }
    Ok(text.trim().to_string())
}

impl ExtractionProvider for GeminiProvider {
    fn name(&self) -> &str {
        "Gemini"
    }

    fn extract<'a>(
        &'a self,
        prompt: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{API_BASE}/{}:generateContent", self.model);
            let body = json!({
                "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
                "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
                "generationConfig": { "temperature": TEMPERATURE, "topP": TOP_P },
            });

            let resp = client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
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
