//! Mindmap LLM Backend Layer
//!
//! Text-generation backends behind a common [`ChatBackend`] interface.
//!
//! # Backends
//!
//! - `MockBackend`: Deterministic mock for testing
//! - `ChatCompletionsBackend`: Any OpenAI-compatible `/chat/completions`
//!   endpoint (LM Studio, OpenRouter, ...)
//!
//! Every call is a single attempt. Retrying is left to whoever drives the
//! backend.
//!
//! # Examples
//!
//! ```
//! use mindmap_domain::ChatMessage;
//! use mindmap_llm::{ChatBackend, CompletionRequest, MockBackend};
//!
//! # async fn example() -> Result<(), mindmap_llm::LlmError> {
//! let backend = MockBackend::new(r#"{"title":"t","keywords":[]}"#);
//! let request = CompletionRequest::new("model", vec![ChatMessage::user("text")]);
//! let reply = backend.complete(&request).await?;
//! assert_eq!(reply, r#"{"title":"t","keywords":[]}"#);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod chat;

use async_trait::async_trait;
use mindmap_domain::ChatMessage;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use chat::ChatCompletionsBackend;

/// Errors that can occur while talking to a backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Connection or transport failure, no HTTP status was received
    #[error("Backend unreachable: {0}")]
    Unavailable(String),

    /// The backend did not answer within the wait bound
    #[error("Backend did not respond in time")]
    Timeout,

    /// The backend answered with a non-success status
    #[error("Backend returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },

    /// The backend answered successfully but the envelope had no completion
    #[error("Invalid backend reply (HTTP {status}): {body}")]
    InvalidResponse {
        /// HTTP status code
        status: u16,
        /// Response body as text
        body: String,
    },

    /// The backend could not be constructed
    #[error("Backend configuration error: {0}")]
    Configuration(String),
}

/// Chat-style completion payload
///
/// Serializes to the wire shape `{model, messages, temperature, max_tokens}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,

    /// Conversation turns
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature
    pub temperature: f64,

    /// Completion token ceiling
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Create a request with low temperature and a 400 token ceiling
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: 0.2,
            max_tokens: 400,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion token ceiling
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Content of the last user turn, if any
    pub fn user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == mindmap_domain::Role::User)
            .map(|m| m.content.as_str())
    }
}

/// A text-generation backend that returns one completion per request
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the conversation and return the raw completion text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError>;

    /// Short name for logs
    fn name(&self) -> &str {
        "backend"
    }
}

#[async_trait]
impl<B: ChatBackend + ?Sized> ChatBackend for Arc<B> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        (**self).complete(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock backend for deterministic testing
///
/// Returns pre-configured replies without making any network calls.
///
/// # Examples
///
/// ```
/// use mindmap_domain::ChatMessage;
/// use mindmap_llm::{ChatBackend, CompletionRequest, LlmError, MockBackend};
///
/// # async fn example() {
/// let mut backend = MockBackend::new("default");
/// backend.add_response("வணக்கம்", "specific");
/// backend.add_error("bad", LlmError::Timeout);
///
/// let req = |text: &str| CompletionRequest::new("m", vec![ChatMessage::user(text)]);
/// assert_eq!(backend.complete(&req("வணக்கம்")).await.unwrap(), "specific");
/// assert_eq!(backend.complete(&req("other")).await.unwrap(), "default");
/// assert_eq!(backend.complete(&req("bad")).await, Err(LlmError::Timeout));
/// assert_eq!(backend.call_count(), 3);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockBackend {
    default_reply: Result<String, LlmError>,
    responses: Arc<Mutex<HashMap<String, Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl MockBackend {
    /// Create a mock that answers every request with `reply`
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_default(Ok(reply.into()))
    }

    /// Create a mock that fails every request with `error`
    pub fn failing(error: LlmError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_reply: Result<String, LlmError>) -> Self {
        Self {
            default_reply,
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Sleep before answering, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Answer `reply` when the user turn equals `user_text`
    pub fn add_response(&mut self, user_text: impl Into<String>, reply: impl Into<String>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_text.into(), Ok(reply.into()));
    }

    /// Fail with `error` when the user turn equals `user_text`
    pub fn add_error(&mut self, user_text: impl Into<String>, error: LlmError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_text.into(), Err(error));
    }

    /// Number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// The most recent request received
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new(r#"{"title":"","keywords":[]}"#)
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let specific = request.user_text().and_then(|text| {
            self.responses
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(text)
                .cloned()
        });

        specific.unwrap_or_else(|| self.default_reply.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
