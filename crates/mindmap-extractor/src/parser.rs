//! Map sanitized backend output onto an Outline

use crate::error::ExtractionError;
use mindmap_domain::{KeywordNode, Keywords, Outline};
use serde_json::{Map, Value};

/// Parse a sanitized reply into an outline
///
/// Only the structural shape is checked here. Whether keywords really occur
/// in the input text is the backend's job; see [`find_unanchored_terms`].
pub fn parse_outline(sanitized: &str) -> Result<Outline, ExtractionError> {
    let json: Value =
        serde_json::from_str(sanitized).map_err(|e| ExtractionError::MalformedOutput {
            detail: e.to_string(),
            raw: sanitized.to_string(),
        })?;

    let violation = |field: &str, reason: &str| ExtractionError::SchemaViolation {
        field: field.to_string(),
        reason: reason.to_string(),
        raw: sanitized.to_string(),
    };

    let obj = json
        .as_object()
        .ok_or_else(|| violation("$", "expected a JSON object"))?;

    let title = match obj.get("title") {
        None => return Err(violation("title", "missing required field")),
        Some(v) => v
            .as_str()
            .ok_or_else(|| violation("title", "expected a string"))?
            .to_string(),
    };

    let items = match obj.get("keywords") {
        None => return Err(violation("keywords", "missing required field")),
        Some(v) => v
            .as_array()
            .ok_or_else(|| violation("keywords", "expected an array"))?,
    };

    let keywords = match items.first() {
        None => Keywords::Flat(Vec::new()),
        Some(Value::Object(_)) => {
            let mut nodes = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let node_obj = item.as_object().ok_or_else(|| {
                    violation(&format!("keywords[{}]", idx), "expected a keyword object")
                })?;
                nodes.push(parse_node(node_obj, idx).map_err(|(field, reason)| {
                    violation(&field, reason)
                })?);
            }
            Keywords::Nested(nodes)
        }
        Some(_) => {
            let mut words = Vec::with_capacity(items.len());
            for (idx, item) in items.iter().enumerate() {
                let word = item.as_str().ok_or_else(|| {
                    violation(&format!("keywords[{}]", idx), "expected a string")
                })?;
                words.push(word.to_string());
            }
            Keywords::Flat(words)
        }
    };

    Ok(Outline { title, keywords })
}

/// Parse a single `{level1, level2}` object
fn parse_node(obj: &Map<String, Value>, idx: usize) -> Result<KeywordNode, (String, &'static str)> {
    let level1 = match obj.get("level1") {
        None => return Err((format!("keywords[{}].level1", idx), "missing required field")),
        Some(v) => v
            .as_str()
            .ok_or_else(|| (format!("keywords[{}].level1", idx), "expected a string"))?
            .to_string(),
    };

    let subs = match obj.get("level2") {
        None => return Err((format!("keywords[{}].level2", idx), "missing required field")),
        Some(v) => v
            .as_array()
            .ok_or_else(|| (format!("keywords[{}].level2", idx), "expected an array"))?,
    };

    let level2 = subs
        .iter()
        .enumerate()
        .map(|(sub_idx, sub)| {
            sub.as_str().map(str::to_string).ok_or_else(|| {
                (
                    format!("keywords[{}].level2[{}]", idx, sub_idx),
                    "expected a string",
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(KeywordNode { level1, level2 })
}

/// Keywords (main or sub) that do not occur verbatim in `text`
///
/// Also reports an empty keyword, which trivially "occurs" but is useless.
pub fn find_unanchored_terms<'a>(outline: &'a Outline, text: &str) -> Vec<&'a str> {
    outline
        .keywords
        .iter_terms()
        .filter(|term| term.trim().is_empty() || !text.contains(term))
        .collect()
}
