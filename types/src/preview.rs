//! Preview derivation for trace list display.

/// Word count at which previews are cut.
const PREVIEW_WORD_LIMIT: usize = 7;

/// Derive the shortened list rendering of a trace's text.
///
/// Whitespace runs (including newlines) collapse to single spaces and the
/// ends are trimmed. Text at or under the word limit passes through in full;
/// longer text keeps the first seven words with a `...` suffix.
///
/// The result is stored on the trace at creation, not recomputed on read, so
/// this derivation must stay reproducible independent of storage backend.
#[must_use]
pub fn preview(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }
    if words.len() <= PREVIEW_WORD_LIMIT {
        return words.join(" ");
    }
    format!("{}...", words[..PREVIEW_WORD_LIMIT].join(" "))
}
