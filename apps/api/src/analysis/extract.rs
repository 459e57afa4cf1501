//! Pulls the JSON object out of a free-form model reply.

/// Returns the span from the first `{` to the last `}` (inclusive), or `None`
/// when the reply has no such span. Prose on either side is discarded; nothing
/// between the braces is inspected.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
