//! Auto-title derivation.

/// Maximum number of characters kept from the first message.
pub const TITLE_MAX_CHARS: usize = 50;

const TRUNCATION_MARKER: &str = "...";

/// Title derived from a conversation's first user message: the first 50
/// characters of the trimmed text, followed by `...` when it was longer.
pub fn derive_title(first_message: &str) -> String {
    let mut chars = first_message.trim().chars();
    let mut title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        title.push_str(TRUNCATION_MARKER);
    }
    title
}
