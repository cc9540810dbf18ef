//! Error types for the Extractor

use crate::types::Stage;
use mindmap_llm::LlmError;
use std::fmt;
use thiserror::Error;

/// Errors that can end an extraction
///
/// Every failure anywhere in the pipeline is reported as exactly one of
/// these variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Request text was empty or absent
    #[error("Missing text: request text is empty")]
    MissingInput,

    /// Connection or transport failure talking to the backend
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Backend exceeded the wait bound
    #[error("Backend did not respond within the configured timeout")]
    BackendTimeout,

    /// Backend answered with a non-success status or an unusable envelope
    #[error("Backend returned HTTP {status}: {body}")]
    BackendError {
        /// HTTP status reported by the backend
        status: u16,
        /// Response body as text
        body: String,
    },

    /// Sanitized reply is not valid JSON
    #[error("Model output is not valid JSON: {detail}")]
    MalformedOutput {
        /// Parser diagnostic
        detail: String,
        /// Sanitized reply
        raw: String,
    },

    /// Reply is valid JSON but lacks a required field
    #[error("Model output violates schema at '{field}': {reason}")]
    SchemaViolation {
        /// Path of the offending field, e.g. `title` or `keywords[2].level1`
        field: String,
        /// What was wrong with it
        reason: String,
        /// Sanitized reply
        raw: String,
    },
}

/// Fieldless discriminant of [`ExtractionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ExtractionError::MissingInput`]
    MissingInput,
    /// See [`ExtractionError::BackendUnavailable`]
    BackendUnavailable,
    /// See [`ExtractionError::BackendTimeout`]
    BackendTimeout,
    /// See [`ExtractionError::BackendError`]
    BackendError,
    /// See [`ExtractionError::MalformedOutput`]
    MalformedOutput,
    /// See [`ExtractionError::SchemaViolation`]
    SchemaViolation,
}

impl ErrorKind {
    /// Human-readable category shown to callers in the `error` field
    pub fn category(self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "Missing text",
            ErrorKind::BackendUnavailable => "Backend unavailable",
            ErrorKind::BackendTimeout => "Backend timeout",
            ErrorKind::BackendError => "Backend API error",
            ErrorKind::MalformedOutput => "Malformed model output",
            ErrorKind::SchemaViolation => "Schema violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MissingInput => "MissingInput",
            ErrorKind::BackendUnavailable => "BackendUnavailable",
            ErrorKind::BackendTimeout => "BackendTimeout",
            ErrorKind::BackendError => "BackendError",
            ErrorKind::MalformedOutput => "MalformedOutput",
            ErrorKind::SchemaViolation => "SchemaViolation",
        };
        f.write_str(name)
    }
}

impl ExtractionError {
    /// Kind of failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::MissingInput => ErrorKind::MissingInput,
            ExtractionError::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            ExtractionError::BackendTimeout => ErrorKind::BackendTimeout,
            ExtractionError::BackendError { .. } => ErrorKind::BackendError,
            ExtractionError::MalformedOutput { .. } => ErrorKind::MalformedOutput,
            ExtractionError::SchemaViolation { .. } => ErrorKind::SchemaViolation,
        }
    }

    /// Pipeline stage the failure originated in
    pub fn stage(&self) -> Stage {
        match self {
            ExtractionError::MissingInput => Stage::Received,
            ExtractionError::BackendUnavailable(_)
            | ExtractionError::BackendTimeout
            | ExtractionError::BackendError { .. } => Stage::BackendInvoked,
            ExtractionError::MalformedOutput { .. } | ExtractionError::SchemaViolation { .. } => {
                Stage::Validated
            }
        }
    }

    /// Backend content, present only when it was actually retrieved
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            ExtractionError::MalformedOutput { raw, .. }
            | ExtractionError::SchemaViolation { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// HTTP status reported by the backend, if the failure carries one
    pub fn backend_status(&self) -> Option<u16> {
        match self {
            ExtractionError::BackendError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<LlmError> for ExtractionError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Unavailable(msg) | LlmError::Configuration(msg) => {
                ExtractionError::BackendUnavailable(msg)
            }
            LlmError::Timeout => ExtractionError::BackendTimeout,
            LlmError::Status { status, body } | LlmError::InvalidResponse { status, body } => {
                ExtractionError::BackendError { status, body }
            }
        }
    }
}
