//! Chat-Completions Backend Implementation
//!
//! Talks to any server exposing the OpenAI `/chat/completions` shape, such
//! as a local LM Studio instance or OpenRouter.
//!
//! # Features
//!
//! - Async HTTP communication with a pooled `reqwest` client
//! - Optional bearer token and extra headers (OpenRouter wants `HTTP-Referer`
//!   and `X-Title`)
//! - Bounded wait per request
//! - Exactly one attempt per call
//!
//! # Examples
//!
//! ```no_run
//! use mindmap_llm::ChatCompletionsBackend;
//! use std::time::Duration;
//!
//! let backend = ChatCompletionsBackend::new(
//!     "http://localhost:1234/v1/chat/completions",
//!     Duration::from_secs(30),
//! )
//! .unwrap()
//! .with_api_key("sk-or-...")
//! .with_header("X-Title", "Tamil NLP Keyword Extractor");
//! ```

use crate::{ChatBackend, CompletionRequest, LlmError};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default timeout for backend requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Backend for OpenAI-compatible chat-completions endpoints
#[derive(Debug, Clone)]
pub struct ChatCompletionsBackend {
    endpoint: String,
    api_key: Option<String>,
    extra_headers: Vec<(String, String)>,
    client: reqwest::Client,
}

/// Completion envelope returned by the endpoint
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

impl ChatCompletionsBackend {
    /// Create a backend for the full completions URL
    ///
    /// # Parameters
    ///
    /// - `endpoint`: complete URL, e.g. `https://openrouter.ai/api/v1/chat/completions`
    /// - `timeout`: upper bound on the whole request, connect through body
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: None,
            extra_headers: Vec::new(),
            client,
        })
    }

    /// Create a backend with the default 30 second timeout
    pub fn with_default_timeout(endpoint: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(endpoint, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Send `Authorization: Bearer <key>` with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Send an extra header with every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    fn map_transport_error(e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Unavailable(e.to_string())
        }
    }
}

#[async_trait]
impl ChatBackend for ChatCompletionsBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let start = Instant::now();

        let mut builder = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request);

        if let Some(key) = &self.api_key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
        }
        for (name, value) in &self.extra_headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, endpoint = %self.endpoint, "Backend request failed");
            Self::map_transport_error(e)
        })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to read error body");
                String::new()
            });
            warn!(status = %status, "Backend returned error status");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(Self::map_transport_error)?;

        let content = serde_json::from_str::<ChatCompletionResponse>(&body)
            .ok()
            .and_then(|envelope| envelope.choices.into_iter().next())
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse {
                status: status.as_u16(),
                body: body.clone(),
            })?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis() as u64,
            reply_chars = content.chars().count(),
            "Backend completion"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}
