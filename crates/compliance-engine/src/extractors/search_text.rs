// Selection of the text a violation is searched by
use super::locator::parse_locator;
use crate::patterns::looks_like_code;
use shared_types::Violation;

/// Decide whether a candidate string is usable for text search.
///
/// A usable string has at least `min_len` characters after trimming,
/// contains a letter, and carries no source-code tokens.
pub fn is_valid_search_text(text: &str, min_len: usize) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < min_len {
        return false;
    }
    if !trimmed.chars().any(char::is_alphabetic) {
        return false;
    }
    !looks_like_code(trimmed)
}

/// Best search string for a violation: `context_text` when valid, else the
/// locator excerpt when valid, else nothing.
pub fn search_text_for(violation: &Violation, min_len: usize) -> Option<String> {
    let context = violation
        .context_text
        .as_deref()
        .map(str::trim)
        .filter(|t| is_valid_search_text(t, min_len))
        .map(str::to_string);
    if context.is_some() {
        return context;
    }

    violation
        .position_in_doc
        .as_deref()
        .and_then(parse_locator)
        .and_then(|loc| loc.excerpt)
        .filter(|t| is_valid_search_text(t, min_len))
}
