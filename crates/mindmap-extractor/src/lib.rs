//! Mindmap Extractor
//!
//! Turns a block of Tamil text into a mind-map outline using a text-generation
//! backend.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → ChatBackend → sanitize_reply → parse_outline → Outline
//! ```
//!
//! Every stage returns a `Result`; the first failure ends the run and is
//! reported as one [`ExtractionError`] variant.
//!
//! # Example Usage
//!
//! ```no_run
//! use mindmap_extractor::{ExtractionRequest, Extractor, ExtractorConfig};
//! use mindmap_llm::MockBackend;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = MockBackend::new(r#"{"title":"அரசு","keywords":["தமிழ்நாடு"]}"#);
//! let config = ExtractorConfig::local("http://localhost:1234/v1/chat/completions");
//! let extractor = Extractor::new(backend, config)?;
//!
//! let outline = extractor
//!     .extract(ExtractionRequest::new("தமிழ்நாடு அரசு"))
//!     .await?;
//!
//! println!("{}: {} keywords", outline.title, outline.keywords.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod parser;
mod prompt;
mod sanitize;
mod types;


pub use config::ExtractorConfig;
pub use error::{ErrorKind, ExtractionError};
pub use extractor::Extractor;
pub use parser::{find_unanchored_terms, parse_outline};
pub use prompt::{Instruction, InstructionVariant, PromptBuilder, STOPWORDS};
pub use sanitize::{sanitize_reply, FENCE_MARKER};
pub use types::{ExtractionRequest, Stage};
