//! Mock provider for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{ExtractionError, ExtractionProvider};

/// A configurable canned response for [`MockProvider`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Simulate a successful extraction returning this TSV body.
    Text(String),
    /// Simulate a provider-side failure.
    Error(String),
}

/// A hand-rolled mock implementing [`ExtractionProvider`] for tests.
///
/// Supports:
/// - A fixed response (used for every call), **or**
/// - A sequence of responses (one per call, repeating the last if exhausted).
/// - Optional per-call latency.
/// - Call counting via [`call_count()`](MockProvider::call_count).
pub struct MockProvider {
    /// If non-empty, each call pops the next response.
    responses: Mutex<Vec<MockResponse>>,
    /// Fallback when the sequence is exhausted (or single-response mode).
    fallback: MockResponse,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockProvider {
    /// Create a mock that always returns `response`.
    pub fn new(response: MockResponse) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a mock that returns responses in order, repeating the last one.
    pub fn with_sequence(mut responses: Vec<MockResponse>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        let fallback = responses.last().cloned().unwrap();
        // Reverse so we can pop() from the front cheaply.
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set simulated network latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `extract()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        let mut seq = self.responses.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl ExtractionProvider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    fn extract<'a>(
        &'a self,
        _prompt: &'a str,
        _client: &'a reqwest::Client,
        _timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<String, ExtractionError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }

            match response {
                MockResponse::Text(body) => Ok(body.trim().to_string()),
                MockResponse::Error(msg) => Err(ExtractionError::Api {
                    status: 500,
                    message: msg,
                }),
            }
        })
    }
}
