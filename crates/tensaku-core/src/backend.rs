//! Chat backend trait and implementations.
//!
//! This module defines the abstraction layer for OpenAI-compatible chat
//! providers and provides a mock implementation for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Result, TensakuError};
use crate::types::{ChatRequest, ChatResponse, FinishReason, Usage};

/// Execute an async operation with exponential backoff retry.
///
/// Retries only on transient errors (network failures). Non-retryable errors
/// are returned immediately.
pub async fn with_retry<F, Fut, T>(
    max_retries: u32,
    initial_backoff: Duration,
    backend_name: &str,
    mut f: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    let mut backoff = initial_backoff;

    for attempt in 0..=max_retries {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !is_retryable(&e) {
                    return Err(e);
                }

                last_error = Some(e);

                if attempt < max_retries {
                    tracing::warn!(
                        backend = backend_name,
                        attempt = attempt + 1,
                        max_retries = max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                }
            }
        }
    }

    Err(last_error.unwrap())
}

/// Check if an error is retryable.
///
/// Only network errors are considered retryable. Config, serialization,
/// and other errors should not be retried.
pub fn is_retryable(error: &TensakuError) -> bool {
    matches!(error, TensakuError::Network(_))
}

/// Trait for chat backend providers.
///
/// Implementations of this trait provide the actual connection to chat
/// completion services (hosted APIs or local servers like Ollama).
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// Check if the backend is available and properly configured.
    async fn health_check(&self) -> Result<()>;
}

/// A mock backend for testing purposes.
///
/// Returns pre-configured responses in order, useful for deterministic
/// testing of the review pipeline.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    responses: std::sync::Mutex<Vec<ChatResponse>>,
    request_log: std::sync::Mutex<Vec<ChatRequest>>,
}

impl MockBackend {
    /// Create a new mock backend with the given responses.
    ///
    /// Responses are returned in order. If more requests are made than
    /// responses available, an error is returned.
    pub fn new(responses: Vec<ChatResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            responses: std::sync::Mutex::new(responses),
            request_log: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Create a mock backend with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![ChatResponse::new(
            "mock_msg_1",
            "mock-model",
            text,
            FinishReason::Stop,
            Usage::new(10, 20),
        )])
    }

    /// Create a mock backend with several text responses, returned in order.
    pub fn with_texts(texts: Vec<String>) -> Self {
        let responses = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                ChatResponse::new(
                    format!("mock_msg_{}", i + 1),
                    "mock-model",
                    text,
                    FinishReason::Stop,
                    Usage::new(10, 20),
                )
            })
            .collect();
        Self::new(responses)
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.request_log.lock().unwrap().push(request);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(TensakuError::Backend(
                "MockBackend: no more responses available".to_string(),
            ));
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

/// A backend that wraps another backend with request/response logging.
pub struct LoggingBackend<B: ChatBackend> {
    inner: B,
    name: String,
}

impl<B: ChatBackend> LoggingBackend<B> {
    /// Create a new logging backend.
    pub fn new(inner: B) -> Self {
        let name = format!("logging({})", inner.name());
        Self { inner, name }
    }
}

#[async_trait]
impl<B: ChatBackend> ChatBackend for LoggingBackend<B> {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        tracing::debug!(
            backend = self.inner.name(),
            model = %request.model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::debug!(
                    backend = self.inner.name(),
                    response_id = %response.id,
                    finish_reason = ?response.finish_reason,
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    duration_ms = elapsed.as_millis() as u64,
                    "Completion successful"
                );
            }
            Err(e) => {
                tracing::warn!(
                    backend = self.inner.name(),
                    error = %e,
                    duration_ms = elapsed.as_millis() as u64,
                    "Completion failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> Result<()> {
        self.inner.health_check().await
    }
}

/// A backend that can be shared across threads.
pub type SharedBackend = Arc<dyn ChatBackend>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[tokio::test]
    async fn test_mock_backend_single_response() {
        let backend = MockBackend::with_text("Hello!");

        let request = ChatRequest::new("test-model", vec![ChatMessage::user("Hi")]);
        let response = backend.complete(request).await.unwrap();

        assert_eq!(response.content, "Hello!");
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_multiple_responses() {
        let backend =
            MockBackend::with_texts(vec!["First".to_string(), "Second".to_string()]);

        let r1 = backend
            .complete(ChatRequest::new("m", vec![ChatMessage::user("1")]))
            .await
            .unwrap();
        let r2 = backend
            .complete(ChatRequest::new("m", vec![ChatMessage::user("2")]))
            .await
            .unwrap();

        assert_eq!(r1.content, "First");
        assert_eq!(r2.content, "Second");
        assert_eq!(backend.request_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted() {
        let backend = MockBackend::new(vec![]);

        let request = ChatRequest::new("m", vec![ChatMessage::user("Hi")]);
        let result = backend.complete(request).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mock_backend_health_check() {
        let backend = MockBackend::with_text("test");
        assert!(backend.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_logging_backend() {
        let inner = MockBackend::with_text("Logged!");
        let backend = LoggingBackend::new(inner);

        assert_eq!(backend.name(), "logging(mock)");

        let request = ChatRequest::new("m", vec![ChatMessage::user("Hi")]);
        let response = backend.complete(request).await.unwrap();

        assert_eq!(response.content, "Logged!");
    }

    #[tokio::test]
    async fn test_with_retry_gives_up_on_non_retryable() {
        let mut calls = 0u32;
        let result: Result<()> = with_retry(3, Duration::from_millis(1), "test", || {
            calls += 1;
            async { Err(TensakuError::Config("bad".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_with_retry_retries_network_errors() {
        let mut calls = 0u32;
        let result: Result<()> = with_retry(2, Duration::from_millis(1), "test", || {
            calls += 1;
            async { Err(TensakuError::Network("down".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3);
    }
}
