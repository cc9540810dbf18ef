//! Request and stage types for extraction

use std::fmt;

/// Request to extract an outline from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Text to extract from, passed to the backend verbatim
    pub text: String,
}

impl ExtractionRequest {
    /// Create a request
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the text has any non-whitespace content
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Pipeline stages, in the order a request passes through them
///
/// `Received → PromptBuilt → BackendInvoked → Sanitized → Validated`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Request accepted, input not yet checked
    Received,
    /// Conversation assembled
    PromptBuilt,
    /// Backend call made
    BackendInvoked,
    /// Fences stripped from the reply
    Sanitized,
    /// Reply parsed and mapped onto an outline
    Validated,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::PromptBuilt => "prompt_built",
            Stage::BackendInvoked => "backend_invoked",
            Stage::Sanitized => "sanitized",
            Stage::Validated => "validated",
        };
        f.write_str(name)
    }
}
