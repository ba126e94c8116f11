//! Word lists and regex patterns shared by the text matching stages

use lazy_static::lazy_static;
use regex::Regex;

/// Dash variants folded to ASCII hyphen-minus during normalization
pub const DASH_CHARS: &[char] = &[
    '\u{2010}', // hyphen
    '\u{2011}', // non-breaking hyphen
    '\u{2012}', // figure dash
    '\u{2013}', // en dash
    '\u{2014}', // em dash
    '\u{2015}', // horizontal bar
    '\u{2212}', // minus sign
    '\u{FE58}',
    '\u{FE63}',
    '\u{FF0D}',
];

/// Characters dropped entirely (rendering artifacts)
pub const INVISIBLE_CHARS: &[char] = &['\u{00AD}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{FEFF}'];

/// Stop-words ignored by the keyword extractor (English and Russian).
/// Only words longer than three characters matter; shorter tokens are
/// dropped before this list is consulted.
pub const STOP_WORDS: &[&str] = &[
    // English
    "about", "also", "been", "being", "both", "could", "does", "each", "from", "have",
    "here", "into", "more", "most", "must", "only", "other", "page", "para", "same",
    "shall", "should", "some", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "through", "under", "very", "were", "what", "when",
    "where", "which", "while", "will", "with", "would", "your",
    // Russian
    "будет", "были", "было", "быть", "вместе", "всего", "всех", "для", "если", "есть",
    "зачем", "здесь", "и", "или", "когда", "которая", "которые", "который", "которых",
    "либо", "между", "может", "можно", "нужно", "однако", "очень", "перед", "после",
    "потому", "также", "тогда", "того", "только", "тоже", "чтобы", "через", "этих",
    "этого", "этой", "этот", "является", "являются",
];

lazy_static! {
    /// Source-code tokens that mark a snippet as unusable for text search.
    /// `import` and `function` must be whole words so prose such as
    /// "important" or "functional" is not rejected.
    pub static ref CODE_TOKENS: Regex =
        Regex::new(r"(?i)\b(?:import|function)\b|\b(?:def|class|const|let|var|from)\s|=>")
            .expect("static regex");

    /// Leading `Page <N>` of a locator, with Russian spellings accepted
    pub static ref LOCATOR_PAGE: Regex =
        Regex::new(r"(?i)^\s*(?:page|стр(?:аница)?)\.?\s*(\d+)").expect("static regex");

    /// Remainder of a locator after the page: `, Para <M>: <excerpt>`
    pub static ref LOCATOR_REST: Regex = Regex::new(
        r"(?is)^\s*(?:,\s*(?:para(?:graph)?|абз(?:ац)?)\.?\s*(\d+))?\s*(?::\s*(.*))?$"
    )
    .expect("static regex");
}

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

pub fn looks_like_code(text: &str) -> bool {
    CODE_TOKENS.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_tokens() {
        assert!(looks_like_code("import numpy as np"));
        assert!(looks_like_code("def main(): pass"));
        assert!(looks_like_code("const x = () => 1"));
        assert!(looks_like_code("from typing import List"));
    }

    #[test]
    fn test_prose_is_not_code() {
        assert!(!looks_like_code("An important functional requirement"));
        assert!(!looks_like_code("Таблица 1 - Результаты измерений"));
        assert!(!looks_like_code("The classification of letters"));
    }

    #[test]
    fn test_stop_words_bilingual() {
        assert!(is_stop_word("which"));
        assert!(is_stop_word("которые"));
        assert!(!is_stop_word("таблица"));
    }
}
