//! OpenAI-compatible API backend implementation.
//!
//! This module provides the `OpenAiBackend` which connects to any
//! `/chat/completions` endpoint speaking the OpenAI wire format, including
//! hosted APIs and local Ollama.

use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::Duration;

use crate::backend::{ChatBackend, with_retry};
use crate::error::{Result, TensakuError};
use crate::types::{ChatRequest, ChatResponse, FinishReason, Usage};

/// Default API base URL (local Ollama).
const DEFAULT_API_BASE: &str = "http://localhost:11434/v1";

/// Default timeout for requests (longer for local inference).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// API key (optional; local servers accept requests without one).
    pub api_key: Option<String>,

    /// Model to use for completions.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries for transient errors.
    pub max_retries: u32,

    /// Initial backoff duration for retries.
    pub retry_backoff: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl OpenAiConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

/// OpenAI-compatible chat backend.
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TensakuError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Add headers to a request.
    fn add_headers(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(header::CONTENT_TYPE, "application/json");
        match &self.config.api_key {
            Some(key) => builder.header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => builder,
        }
    }

    /// Convert our ChatRequest to the wire format.
    ///
    /// The config model overrides the request model so one configured backend
    /// always hits the provider it was set up for.
    fn to_wire_request(&self, request: &ChatRequest) -> WireChatRequest {
        WireChatRequest {
            model: self.config.model.clone(),
            messages: request.messages.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: Some(false),
        }
    }

    /// Parse a wire response into our format.
    fn parse_response(&self, response: WireChatResponse) -> ChatResponse {
        let choice = response.choices.into_iter().next();

        let (content, finish_reason) = match choice {
            Some(c) => {
                let finish_reason = match c.finish_reason.as_deref() {
                    Some("stop") => FinishReason::Stop,
                    Some("length") => FinishReason::Length,
                    _ => FinishReason::Other,
                };
                (c.message.content.unwrap_or_default(), finish_reason)
            }
            None => (String::new(), FinishReason::Other),
        };

        let usage = response
            .usage
            .map(|u| Usage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        ChatResponse {
            id: response.id,
            model: response.model,
            content,
            finish_reason,
            usage,
        }
    }

    /// Make a single request.
    async fn send_request(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let wire_request = self.to_wire_request(request);
        let url = self.completions_url();

        tracing::debug!(
            model = %self.config.model,
            messages = wire_request.messages.len(),
            "Chat completion request"
        );

        let response = self
            .add_headers(self.client.post(&url))
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| TensakuError::Network(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TensakuError::Backend(format!(
                "API error ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let wire_response: WireChatResponse = response
            .json()
            .await
            .map_err(|e| TensakuError::Serialization(format!("Failed to parse response: {}", e)))?;

        Ok(self.parse_response(wire_response))
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        with_retry(
            self.config.max_retries,
            self.config.retry_backoff,
            "openai",
            || self.send_request(&request),
        )
        .await
    }

    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models", self.config.base_url);

        let response = self
            .add_headers(self.client.get(&url))
            .send()
            .await
            .map_err(|e| TensakuError::Network(format!("Health check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(TensakuError::Backend(format!(
                "Health check returned {}",
                response.status().as_u16()
            )));
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types (OpenAI-compatible)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, serde::Serialize)]
struct WireChatRequest {
    model: String,
    messages: Vec<crate::types::ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, serde::Deserialize)]
struct WireChatResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<WireChoice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, serde::Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WireMessage {
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}
