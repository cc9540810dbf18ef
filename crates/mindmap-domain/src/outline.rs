//! Outline types
//!
//! An [`Outline`] is what a successful extraction produces. Its serialized
//! form is exactly what the mind-map frontend consumes:
//!
//! ```json
//! {"title": "அரசு கட்டமைப்பு", "keywords": ["தமிழ்நாடு", "தலைமை செயலகம்"]}
//! ```
//!
//! or, for the hierarchical variant:
//!
//! ```json
//! {"title": "...", "keywords": [{"level1": "...", "level2": ["...", "..."]}]}
//! ```

use serde::{Deserialize, Serialize};

/// A main keyword with the sub-keywords nested under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordNode {
    /// Main concept
    pub level1: String,

    /// Sub-concepts in the order the backend produced them
    #[serde(default)]
    pub level2: Vec<String>,
}

impl KeywordNode {
    /// Create a node from a main keyword and its sub-keywords
    pub fn new<I, S>(level1: impl Into<String>, level2: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            level1: level1.into(),
            level2: level2.into_iter().map(Into::into).collect(),
        }
    }
}

/// Keyword list of an outline, flat or nested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Keywords {
    /// Plain list of keyword strings
    Flat(Vec<String>),
    /// Main keywords, each carrying its sub-keywords
    Nested(Vec<KeywordNode>),
}

impl Keywords {
    /// Number of top-level keywords
    pub fn len(&self) -> usize {
        match self {
            Keywords::Flat(words) => words.len(),
            Keywords::Nested(nodes) => nodes.len(),
        }
    }

    /// Whether there are no top-level keywords
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every keyword string, main and sub, in document order
    pub fn iter_terms(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Keywords::Flat(words) => Box::new(words.iter().map(String::as_str)),
            Keywords::Nested(nodes) => Box::new(nodes.iter().flat_map(|node| {
                std::iter::once(node.level1.as_str())
                    .chain(node.level2.iter().map(String::as_str))
            })),
        }
    }
}

impl Default for Keywords {
    fn default() -> Self {
        Keywords::Flat(Vec::new())
    }
}

/// Title plus keyword hierarchy returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Short title (2-5 words)
    pub title: String,

    /// Extracted keywords
    pub keywords: Keywords,
}

impl Outline {
    /// Create an outline
    pub fn new(title: impl Into<String>, keywords: Keywords) -> Self {
        Self {
            title: title.into(),
            keywords,
        }
    }
}
