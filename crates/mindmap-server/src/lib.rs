//! Mindmap Server
//!
//! HTTP entry point for Tamil keyword extraction. Wires configuration, the
//! chat-completions backend and the extraction pipeline into an axum server.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod handlers;

use axum::http::{header, HeaderValue, Method};
use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState, SharedBackend};
use mindmap_extractor::{Extractor, ExtractorConfig};
use mindmap_llm::{ChatCompletionsBackend, LlmError};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend could not be constructed
    #[error("Backend error: {0}")]
    Backend(#[from] LlmError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Logs go to stderr so that stdout stays clean for `mindmap extract`.
/// Honours `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the HTTP backend described by `config`
pub fn build_backend(config: &ExtractorConfig) -> Result<ChatCompletionsBackend, LlmError> {
    let mut backend = ChatCompletionsBackend::new(config.backend_url.clone(), config.timeout())?;
    if let Some(key) = &config.api_key {
        backend = backend.with_api_key(key.clone());
    }
    if let Some(referer) = &config.referer {
        backend = backend.with_header("HTTP-Referer", referer.clone());
    }
    if let Some(title) = &config.app_title {
        backend = backend.with_header("X-Title", title.clone());
    }
    Ok(backend)
}

/// Build the extraction pipeline described by `config`
///
/// Resolves the instruction (reading `instruction_file` if set) once, here.
pub fn build_extractor(config: &ExtractorConfig) -> Result<Extractor<SharedBackend>, ServerError> {
    let backend: SharedBackend = Arc::new(build_backend(config)?);
    Extractor::new(backend, config.clone())
        .map_err(|e| ServerError::Config(ConfigError::Invalid(e)))
}

/// CORS policy for the configured origins
///
/// An empty list or a `"*"` entry allows any origin.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, ConfigError> {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let allowed = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| ConfigError::Invalid(format!("invalid CORS origin: {}", o)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Start the HTTP server
///
/// Validates configuration, builds the pipeline and serves until the
/// process is stopped. Tracing must already be initialized.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;

    info!("Starting mindmap server");
    info!("Bind address: {}", config.bind_addr());
    info!("Backend: {} (model {})", config.extractor.backend_url, config.extractor.model);
    info!("Backend timeout: {} seconds", config.extractor.timeout_secs);

    let extractor = build_extractor(&config.extractor)?;
    let app = create_router(AppState::new(extractor)).layer(cors_layer(&config.cors_origins)?);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
