//! Extraction-provider capability and implementations.
//!
//! A provider sends one prompt to a language model and returns the raw
//! textual response. Implementations are interchangeable behind
//! [`ExtractionProvider`]; which one runs is decided by configuration, never
//! by branching in the orchestrator.

pub mod anthropic;
pub mod gemini;
pub mod mock;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::preprocess::truncate_chars;
use crate::{Config, ProviderKind};

/// Sampling parameters are pinned to minimize run-to-run variance.
pub const TEMPERATURE: f32 = 0.0;
pub const TOP_P: f32 = 1.0;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("authentication rejected (HTTP {status}): {message}")]
    Auth { status: u16, message: String },
    #[error("provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// A language-model provider that can run one extraction prompt.
pub trait ExtractionProvider: Send + Sync {
    /// Canonical provider name (e.g. "Anthropic", "Gemini").
    fn name(&self) -> &str;

    /// Send `prompt` with fixed sampling parameters and a system role,
    /// returning the model's raw text response trimmed of surrounding
    /// whitespace. Every transport, auth, or provider-side failure maps to
    /// an [`ExtractionError`]; nothing escapes this boundary. The response
    /// is not validated as TSV.
    fn extract<'a>(
        &'a self,
        prompt: &'a str,
        client: &'a reqwest::Client,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>>;
}

/// The selected provider has no credential configured.
#[derive(Error, Debug)]
#[error("no API credential configured for provider {0}")]
pub struct MissingCredential(pub &'static str);

/// Build the provider implementation selected by `config`.
pub fn build_provider(config: &Config) -> Result<Arc<dyn ExtractionProvider>, MissingCredential> {
    let api_key = config
        .api_key
        .clone()
        .ok_or(MissingCredential(config.provider.as_str()))?;

    Ok(match config.provider {
        ProviderKind::Anthropic => {
            let mut provider = anthropic::AnthropicProvider::new(api_key);
            if let Some(ref model) = config.model {
                provider = provider.with_model(model.clone());
            }
            Arc::new(provider)
        }
        ProviderKind::Gemini => {
            let mut provider = gemini::GeminiProvider::new(api_key);
            if let Some(ref model) = config.model {
                provider = provider.with_model(model.clone());
            }
            Arc::new(provider)
        }
    })
}

/// Flatten and trim an error body into a log-friendly failure reason.
pub(crate) fn body_snippet(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 200 {
        format!("{}...", truncate_chars(&flat, 200))
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_provider_requires_credential() {
        let config = Config::default();
        assert!(build_provider(&config).is_err());
    }

    #[test]
    fn build_provider_selects_by_kind() {
        let config = Config {
            api_key: Some("k".into()),
            ..Config::default()
        };
        assert_eq!(build_provider(&config).unwrap().name(), "Anthropic");

        let config = Config {
            provider: ProviderKind::Gemini,
            api_key: Some("k".into()),
            ..Config::default()
        };
        assert_eq!(build_provider(&config).unwrap().name(), "Gemini");
    }

    #[test]
    fn body_snippet_flattens_and_caps() {
        assert_eq!(body_snippet("a\n  b\tc"), "a b c");
        let long = "x".repeat(500);
        let snip = body_snippet(&long);
        assert!(snip.ends_with("..."));
        assert_eq!(snip.chars().count(), 203);
    }
}
