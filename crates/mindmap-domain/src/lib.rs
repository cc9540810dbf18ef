//! Mindmap Domain Layer
//!
//! Value types shared by every other crate in the workspace. Nothing here
//! performs I/O.
//!
//! ## Key Concepts
//!
//! - **Outline**: a short title plus the extracted keyword hierarchy, the unit
//!   handed to the mind-map renderer
//! - **Keywords**: either a flat list of strings or a list of [`KeywordNode`]s
//! - **KeywordNode**: a main concept (`level1`) with its sub-concepts (`level2`)
//! - **ChatMessage**: one turn of the conversation sent to the generation backend

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod message;
pub mod outline;

// Re-exports for convenience
pub use message::{ChatMessage, Role};
pub use outline::{KeywordNode, Keywords, Outline};
