//! Configuration for the Extractor

use crate::prompt::{Instruction, InstructionVariant};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the extraction pipeline
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Full chat-completions URL of the generation backend
    pub backend_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Bearer token for the backend; never read from or written to TOML
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Refuse to start when `api_key` is absent
    pub require_api_key: bool,

    /// Maximum time for a single backend call (seconds)
    pub timeout_secs: u64,

    /// Sampling temperature, kept low for repeatable extraction
    pub temperature: f64,

    /// Completion token ceiling
    pub max_tokens: u32,

    /// Built-in instruction to use when no file is given
    pub instruction: InstructionVariant,

    /// Custom instruction text, read once at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_file: Option<PathBuf>,

    /// `HTTP-Referer` header value (OpenRouter requires one)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,

    /// `X-Title` header value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
}

impl ExtractorConfig {
    /// Get the backend timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.backend_url.trim().is_empty() {
            return Err("backend_url must not be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature {} out of range [0.0, 2.0]",
                self.temperature
            ));
        }
        if self.require_api_key
            && self.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            return Err("an API key is required but none was provided".to_string());
        }
        Ok(())
    }

    /// Resolve the active instruction
    ///
    /// Reads `instruction_file` when set, otherwise renders the built-in
    /// variant.
    pub fn load_instruction(&self) -> Result<Instruction, String> {
        match &self.instruction_file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    format!("Failed to read instruction file {}: {}", path.display(), e)
                })?;
                Instruction::custom(text)
            }
            None => Ok(Instruction::builtin(self.instruction)),
        }
    }
}

impl Default for ExtractorConfig {
    /// Hosted OpenRouter backend with the flat instruction
    fn default() -> Self {
        Self {
            backend_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            api_key: None,
            require_api_key: true,
            timeout_secs: 30,
            temperature: 0.2,
            max_tokens: 400,
            instruction: InstructionVariant::Flat,
            instruction_file: None,
            referer: Some("http://localhost".to_string()),
            app_title: Some("Tamil NLP Keyword Extractor".to_string()),
        }
    }
}

impl ExtractorConfig {
    /// Local preset: an LM Studio style server, no credential needed
    pub fn local(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
            model: "meta-llama-3.1-8b-instruct".to_string(),
            require_api_key: false,
            referer: None,
            app_title: None,
            ..Self::default()
        }
    }

    /// Hierarchical preset: nested keywords need a larger token budget
    pub fn hierarchical() -> Self {
        Self {
            instruction: InstructionVariant::Hierarchical,
            max_tokens: 800,
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }
}
