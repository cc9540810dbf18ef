//! Strip decorative fences from backend replies

/// Marker that opens a fenced block
pub const FENCE_MARKER: &str = "```";

/// Remove a fenced wrapper from a backend reply
///
/// When the trimmed reply starts with [`FENCE_MARKER`], its first and last
/// lines are dropped and the rest is trimmed. This repeats while the result
/// still starts with a fence. A reply without a fence comes back trimmed.
/// No JSON parsing happens here.
pub fn sanitize_reply(raw: &str) -> String {
    let mut text = raw.trim().to_string();

    while text.starts_with(FENCE_MARKER) {
        let lines: Vec<&str> = text.split('\n').collect();
        let interior = if lines.len() > 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            String::new()
        };
        text = interior.trim().to_string();
    }

    text
}
