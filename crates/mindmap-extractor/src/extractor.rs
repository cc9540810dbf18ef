//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::parser::{find_unanchored_terms, parse_outline};
use crate::prompt::{Instruction, PromptBuilder};
use crate::sanitize::sanitize_reply;
use crate::types::{ExtractionRequest, Stage};
use mindmap_domain::Outline;
use mindmap_llm::{ChatBackend, CompletionRequest};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// The Extractor turns Tamil text into an [`Outline`]
///
/// Holds only read-only state, so one instance can serve any number of
/// concurrent requests.
pub struct Extractor<B>
where
    B: ChatBackend,
{
    backend: B,
    config: ExtractorConfig,
    instruction: Instruction,
}

impl<B> Extractor<B>
where
    B: ChatBackend,
{
    /// Create a new Extractor
    ///
    /// The instruction is resolved from `config` here, reading
    /// `instruction_file` when one is set.
    pub fn new(backend: B, config: ExtractorConfig) -> Result<Self, String> {
        let instruction = config.load_instruction()?;
        Ok(Self {
            backend,
            config,
            instruction,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Active instruction
    pub fn instruction(&self) -> &Instruction {
        &self.instruction
    }

    /// Extract an outline from text
    ///
    /// Runs `Received → PromptBuilt → BackendInvoked → Sanitized → Validated`.
    /// The first failing stage ends the run and its error is returned as is.
    pub async fn extract(&self, request: ExtractionRequest) -> Result<Outline, ExtractionError> {
        let request_id = Uuid::now_v7();
        let span = info_span!("extract", %request_id, backend = self.backend.name());

        async move {
            let start = Instant::now();
            let result = self.run_pipeline(&request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(outline) => info!(
                    keywords = outline.keywords.len(),
                    elapsed_ms, "Extraction succeeded"
                ),
                Err(e) => warn!(
                    kind = %e.kind(),
                    stage = %e.stage(),
                    elapsed_ms,
                    "Extraction failed: {}",
                    e
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run_pipeline(&self, request: &ExtractionRequest) -> Result<Outline, ExtractionError> {
        debug!(stage = %Stage::Received, text_chars = request.text.chars().count());
        if request.is_blank() {
            return Err(ExtractionError::MissingInput);
        }

        let messages = PromptBuilder::new(&self.instruction, &request.text).build();
        let completion = CompletionRequest::new(self.config.model.clone(), messages)
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);
        debug!(stage = %Stage::PromptBuilt, model = %completion.model);

        // The backend may enforce its own bound; this one covers backends that don't
        let reply = timeout(self.config.timeout(), self.backend.complete(&completion))
            .await
            .map_err(|_| ExtractionError::BackendTimeout)??;
        debug!(stage = %Stage::BackendInvoked, reply_chars = reply.chars().count());

        let sanitized = sanitize_reply(&reply);
        debug!(stage = %Stage::Sanitized, sanitized_chars = sanitized.chars().count());

        let outline = parse_outline(&sanitized)?;
        debug!(stage = %Stage::Validated, title = %outline.title);

        let unanchored = find_unanchored_terms(&outline, &request.text);
        if !unanchored.is_empty() {
            warn!(
                count = unanchored.len(),
                terms = ?unanchored,
                "Backend returned keywords not found verbatim in the input"
            );
        }

        Ok(outline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use mindmap_domain::Role;
    use mindmap_llm::{LlmError, MockBackend};

    fn create_test_extractor(backend: MockBackend) -> Extractor<MockBackend> {
        let config = ExtractorConfig::local("http://localhost:1234/v1/chat/completions");
        Extractor::new(backend, config).unwrap()
    }

    #[tokio::test]
    async fn test_empty_text_never_reaches_backend() {
        let backend = MockBackend::default();
        let extractor = create_test_extractor(backend.clone());

        for text in ["", "   \n\t"] {
            let err = extractor.extract(ExtractionRequest::new(text)).await.unwrap_err();
            assert_eq!(err, ExtractionError::MissingInput);
            assert_eq!(err.stage(), Stage::Received);
        }
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_request_carries_config_and_verbatim_text() {
        let backend = MockBackend::new(r#"{"title":"t","keywords":[]}"#);
        let mut config = ExtractorConfig::local("http://localhost:1234");
        config.model = "custom-model".to_string();
        config.temperature = 0.0;
        config.max_tokens = 123;
        let extractor = Extractor::new(backend.clone(), config).unwrap();

        let text = "  சென்னை  ";
        extractor.extract(ExtractionRequest::new(text)).await.unwrap();

        let sent = backend.last_request().unwrap();
        assert_eq!(sent.model, "custom-model");
        assert_eq!(sent.temperature, 0.0);
        assert_eq!(sent.max_tokens, 123);
        assert_eq!(sent.messages[0].role, Role::System);
        assert_eq!(sent.messages[0].content, extractor.instruction().as_str());
        assert_eq!(sent.messages[1].content, text);
    }

    #[tokio::test]
    async fn test_backend_error_kind_preserved() {
        let backend = MockBackend::failing(LlmError::Status {
            status: 500,
            body: "upstream exploded".to_string(),
        });
        let extractor = create_test_extractor(backend.clone());

        let err = extractor.extract(ExtractionRequest::new("உரை")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BackendError);
        assert_eq!(err.backend_status(), Some(500));
        assert!(err.to_string().contains("upstream exploded"));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_slow_backend_hits_timeout() {
        let backend = MockBackend::default().with_delay(std::time::Duration::from_secs(3));
        let mut config = ExtractorConfig::local("http://localhost:1234");
        config.timeout_secs = 1;
        let extractor = Extractor::new(backend, config).unwrap();

        let err = extractor.extract(ExtractionRequest::new("உரை")).await.unwrap_err();
        assert_eq!(err, ExtractionError::BackendTimeout);
    }

    #[tokio::test]
    async fn test_unanchored_keywords_do_not_fail() {
        let backend = MockBackend::new(r#"{"title":"t","keywords":["இல்லாத சொல்"]}"#);
        let extractor = create_test_extractor(backend);

        let outline = extractor.extract(ExtractionRequest::new("வேறு உரை")).await.unwrap();
        assert_eq!(outline.keywords.len(), 1);
    }
}
