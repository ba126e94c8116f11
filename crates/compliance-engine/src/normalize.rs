//! Canonical text form used before every comparison in the resolver.
//!
//! Lowercases, drops invisible rendering artifacts (soft hyphens, zero-width
//! spaces), folds every dash variant to `-`, folds `ё` to `е`, and collapses
//! whitespace runs to a single space. The result is trimmed.

use crate::patterns::{DASH_CHARS, INVISIBLE_CHARS};

pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if INVISIBLE_CHARS.contains(&c) {
            continue;
        }
        if c.is_whitespace() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        let c = match c {
            c if DASH_CHARS.contains(&c) => '-',
            'ё' => 'е',
            c => c,
        };
        out.push(c);
    }

    out
}

/// Normalized form with all spaces removed, for matching text that a
/// renderer split into runs at arbitrary points.
pub fn compact(text: &str) -> String {
    normalize(text).chars().filter(|c| *c != ' ').collect()
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].trim_end(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_whitespace_and_dashes() {
        assert_eq!(normalize("Table  1 — Name"), normalize("table 1 - name"));
        assert_eq!(normalize("  Таблица\t1 –\nНазвание "), "таблица 1 - название");
    }

    #[test]
    fn test_strips_soft_hyphen_and_zero_width() {
        assert_eq!(normalize("при\u{00AD}мер\u{200B}"), "пример");
    }

    #[test]
    fn test_yo_folding() {
        assert_eq!(normalize("Ёлка и ёж"), "елка и еж");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t "), "");
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact("Табл ица  1"), "таблица1");
    }

    #[test]
    fn test_prefix_chars_multibyte() {
        assert_eq!(prefix_chars("введение", 3), "вве");
        assert_eq!(prefix_chars("abc", 10), "abc");
        assert_eq!(prefix_chars("ab cd", 3), "ab");
    }
}
