//! Salient-token extraction for fuzzy matching

use crate::patterns::is_stop_word;

/// Tokens shorter than this are never keywords
const MIN_KEYWORD_CHARS: usize = 4;

/// Extract up to `max_count` distinct keywords from `text`, in order of first
/// appearance.
///
/// Tokens are maximal runs of alphabetic characters (Latin, Cyrillic or any
/// other script), lowercased. Short tokens and stop-words are skipped.
pub fn extract_keywords(text: &str, max_count: usize) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    if max_count == 0 {
        return keywords;
    }

    let lower = text.to_lowercase();
    for token in lower.split(|c: char| !c.is_alphabetic()) {
        if token.chars().count() < MIN_KEYWORD_CHARS || is_stop_word(token) {
            continue;
        }
        let token = token.replace('ё', "е");
        if keywords.contains(&token) {
            continue;
        }
        keywords.push(token);
        if keywords.len() == max_count {
            break;
        }
    }

    keywords
}
