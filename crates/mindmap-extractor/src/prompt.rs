//! Extraction instruction and conversation assembly

use mindmap_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

/// Connector words that must never be chosen as keywords or used in a title
pub const STOPWORDS: &[&str] = &[
    "இந்த", "அந்த", "இது", "அது", "என்கிற", "ஆனால்", "என்று", "எனும்", "மற்றும்",
    "மூலம்", "உள்ள", "ஒரு", "பற்றி", "போன்ற", "ஆகிய", "இருந்து", "மீது",
];

/// Built-in instruction flavours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionVariant {
    /// `keywords` is a list of strings
    #[default]
    Flat,
    /// `keywords` is a list of `{level1, level2}` objects
    Hierarchical,
}

/// The system turn sent ahead of every request
///
/// Cheap to clone; the text is shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    text: Arc<str>,
}

impl Instruction {
    /// Render one of the built-in instructions
    pub fn builtin(variant: InstructionVariant) -> Self {
        Self {
            text: render_builtin(variant).into(),
        }
    }

    /// Use caller-provided instruction text
    pub fn custom(text: impl Into<String>) -> Result<Self, String> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err("instruction text must not be empty".to_string());
        }
        Ok(Self { text: text.into() })
    }

    /// Instruction text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for Instruction {
    fn default() -> Self {
        Self::builtin(InstructionVariant::Flat)
    }
}

/// Builds the two-turn conversation for one request
pub struct PromptBuilder<'a> {
    instruction: &'a Instruction,
    text: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(instruction: &'a Instruction, text: &'a str) -> Self {
        Self { instruction, text }
    }

    /// Build the conversation: instruction as system turn, text as user turn
    ///
    /// The text is passed through untouched.
    pub fn build(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.instruction.as_str()),
            ChatMessage::user(self.text),
        ]
    }
}

fn render_builtin(variant: InstructionVariant) -> String {
    let mut prompt = String::new();

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    prompt.push_str("TEXT PROCESSING RULES\n\n");
    prompt.push_str("Ignore extra spaces, emojis and symbols when reading the paragraph.\n");
    let _ = writeln!(
        prompt,
        "Never select stopwords or connector words: {}.",
        STOPWORDS.join(", ")
    );
    prompt.push_str(TEXT_RULES);
    prompt.push_str("\n\n");

    prompt.push_str(KEYWORD_RULES);
    prompt.push_str("\n\n");
    if variant == InstructionVariant::Hierarchical {
        prompt.push_str(HIERARCHY_RULES);
        prompt.push_str("\n\n");
    }

    prompt.push_str(YEAR_RULES);
    prompt.push_str("\n\n");
    prompt.push_str(TITLE_RULES);
    prompt.push_str("\n\n");

    prompt.push_str(match variant {
        InstructionVariant::Flat => FLAT_OUTPUT_FORMAT,
        InstructionVariant::Hierarchical => NESTED_OUTPUT_FORMAT,
    });

    prompt
}

const PREAMBLE: &str = "You are a Tamil educational keyword extraction assistant. \
Read the Tamil paragraph supplied by the user and extract only its most important \
educational concepts, to be drawn as a mind map.";

const TEXT_RULES: &str = r#"Choose only meaningful nouns or noun phrases of 1 to 3 Tamil words.
No verbs, no filler phrases, no adjectives on their own.
Every keyword MUST appear exactly as written in the paragraph. Never invent words."#;

const KEYWORD_RULES: &str = r#"KEYWORD RULES

Extract between 8 and 12 keywords.
If there are fewer strong terms, add secondary but relevant nouns.
Prefer names, places, events, years, tournaments, roles and achievements.
Keep keywords short and easy to memorize."#;

const HIERARCHY_RULES: &str = r#"HIERARCHY RULES

Each main keyword is "level1".
Under each main keyword list 0 to 4 sub-keywords as "level2".
Sub-keywords must also appear exactly as written in the paragraph.
A sub-keyword belongs to one main keyword only; never repeat it under another."#;

const YEAR_RULES: &str = r#"YEAR RULE

A year must never appear alone.
A year is allowed only when attached to an event or action from the paragraph.
Allowed: "டி20 உலகக் கோப்பை 2007", "2024 ஓய்வு", "சாம்பியன்ஸ் டிராபி 2025".
Not allowed: "2007", "2014", "2024", "2025"."#;

const TITLE_RULES: &str = r#"TITLE RULES

Create one short Tamil title of 2 to 5 words.
The title must reflect the main idea.
No stopwords in the title."#;

const FLAT_OUTPUT_FORMAT: &str = r#"OUTPUT FORMAT

Return ONLY this JSON object, no markdown code blocks, no explanations:
{
  "title": "<Tamil title>",
  "keywords": ["<keyword1>", "<keyword2>", "..."]
}"#;

const NESTED_OUTPUT_FORMAT: &str = r#"OUTPUT FORMAT

Return ONLY this JSON object, no markdown code blocks, no explanations:
{
  "title": "<Tamil title>",
  "keywords": [
    { "level1": "<main keyword>", "level2": ["<sub keyword>", "..."] }
  ]
}"#;
