//! HTTP request handlers for the extraction service.
//!
//! Implements keyword extraction and health check endpoints using axum.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use mindmap_domain::Outline;
use mindmap_extractor::{ErrorKind, ExtractionError, ExtractionRequest, Extractor};
use mindmap_llm::ChatBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Backend handle shared by every request
pub type SharedBackend = Arc<dyn ChatBackend>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Read-only extraction pipeline
    pub extractor: Arc<Extractor<SharedBackend>>,
}

impl AppState {
    /// Wrap an extractor for sharing across handlers
    pub fn new(extractor: Extractor<SharedBackend>) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

/// Extraction request body
///
/// The text may arrive under either key; `text` wins when both are usable.
#[derive(Debug, Default, Deserialize)]
pub struct ExtractKeywordsRequest {
    /// Paragraph to analyze
    #[serde(default)]
    pub text: Option<String>,

    /// Alternative key used by older clients
    #[serde(default)]
    pub paragraph: Option<String>,
}

impl ExtractKeywordsRequest {
    /// First non-blank text field, if any
    pub fn into_text(self) -> Option<String> {
        [self.text, self.paragraph]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process is serving
    pub status: String,
}

/// Error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error category
    pub error: String,

    /// Diagnostic detail
    pub details: String,

    /// HTTP status reported by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Backend content, only when it was retrieved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl From<&ExtractionError> for ErrorResponse {
    fn from(e: &ExtractionError) -> Self {
        ErrorResponse {
            error: e.kind().category().to_string(),
            details: e.to_string(),
            status: e.backend_status(),
            raw_output: e.raw_output().map(str::to_string),
        }
    }
}

/// HTTP status for each failure kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::MissingInput => StatusCode::BAD_REQUEST,
        ErrorKind::BackendUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::BackendError => StatusCode::BAD_GATEWAY,
        ErrorKind::MalformedOutput | ErrorKind::SchemaViolation => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Failure reported by the extraction pipeline
    Extraction(ExtractionError),

    /// Body could not be read as an extraction request
    UnreadableBody(JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Extraction(e) => {
                (status_for(e.kind()), Json(ErrorResponse::from(&e))).into_response()
            }
            AppError::UnreadableBody(rejection) => {
                let body = ErrorResponse {
                    error: ErrorKind::MissingInput.category().to_string(),
                    details: format!("Unreadable request body: {}", rejection.body_text()),
                    status: None,
                    raw_output: None,
                };
                (status_for(ErrorKind::MissingInput), Json(body)).into_response()
            }
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::Extraction(e)
    }
}

/// POST /extract_keywords - Extract an outline from Tamil text
async fn extract_keywords(
    State(state): State<AppState>,
    payload: Result<Json<ExtractKeywordsRequest>, JsonRejection>,
) -> Result<Json<Outline>, AppError> {
    let body = payload.map_err(|rejection| {
        warn!(error = %rejection, "Unreadable request body");
        AppError::UnreadableBody(rejection)
    })?;

    // Blank input is answered here; the pipeline is never started for it
    let text = body.0.into_text().ok_or(ExtractionError::MissingInput)?;
    info!(text_chars = text.chars().count(), "Extraction request received");

    let outline = state.extractor.extract(ExtractionRequest::new(text)).await?;
    Ok(Json(outline))
}

/// GET /health - Liveness check
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    AxumRouter::new()
        .route("/extract_keywords", post(extract_keywords))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
