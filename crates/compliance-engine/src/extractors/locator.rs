// Parsing of the `position_in_doc` locator string
use crate::patterns::{LOCATOR_PAGE, LOCATOR_REST};

/// Page, paragraph and excerpt embedded in a `position_in_doc` string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub page: u32,
    /// 1-indexed paragraph number, when the locator carries one
    pub paragraph: Option<u32>,
    /// Leading text of the paragraph with any trailing ellipsis removed
    pub excerpt: Option<String>,
}

/// Parse `"Page <N>, Para <M>: <leading text>..."`.
///
/// Returns `None` when no page number can be extracted. A paragraph number
/// of zero is treated as absent. When the part after the page number is
/// malformed, only the page is kept.
pub fn parse_locator(position_in_doc: &str) -> Option<Locator> {
    let page_caps = LOCATOR_PAGE.captures(position_in_doc)?;
    let page = page_caps.get(1)?.as_str().parse::<u32>().ok()?;
    let rest = &position_in_doc[page_caps.get(0)?.end()..];

    let Some(caps) = LOCATOR_REST.captures(rest) else {
        return Some(Locator {
            page,
            paragraph: None,
            excerpt: None,
        });
    };

    let paragraph = caps
        .get(1)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|p| *p > 0);
    let excerpt = caps
        .get(2)
        .map(|m| strip_ellipsis(m.as_str()))
        .filter(|s| !s.is_empty());

    Some(Locator {
        page,
        paragraph,
        excerpt,
    })
}

fn strip_ellipsis(text: &str) -> String {
    let mut s = text.trim();
    loop {
        let trimmed = s
            .strip_suffix("...")
            .or_else(|| s.strip_suffix('…'))
            .map(str::trim_end);
        match trimmed {
            Some(rest) => s = rest,
            None => break,
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_full_locator() {
        let loc = parse_locator("Page 3, Para 12: Введение в предметную область...").unwrap();
        assert_eq!(
            loc,
            Locator {
                page: 3,
                paragraph: Some(12),
                excerpt: Some("Введение в предметную область".to_string()),
            }
        );
    }

    #[test]
    fn test_page_only() {
        let loc = parse_locator("Page 7").unwrap();
        assert_eq!(loc.page, 7);
        assert_eq!(loc.paragraph, None);
        assert_eq!(loc.excerpt, None);
    }

    #[test]
    fn test_case_insensitive_and_unicode_ellipsis() {
        let loc = parse_locator("page 1, paragraph 2: Table 1 — Name…").unwrap();
        assert_eq!(loc.paragraph, Some(2));
        assert_eq!(loc.excerpt.as_deref(), Some("Table 1 — Name"));
    }

    #[test]
    fn test_russian_locator() {
        let loc = parse_locator("Стр. 4, Абз. 9: Заключение").unwrap();
        assert_eq!(loc.page, 4);
        assert_eq!(loc.paragraph, Some(9));
    }

    #[test]
    fn test_excerpt_keeps_inner_colons() {
        let loc = parse_locator("Page 1, Para 1: Note: see table").unwrap();
        assert_eq!(loc.excerpt.as_deref(), Some("Note: see table"));
    }

    #[test]
    fn test_zero_paragraph_is_absent() {
        let loc = parse_locator("Page 2, Para 0: text").unwrap();
        assert_eq!(loc.paragraph, None);
    }

    #[test]
    fn test_malformed() {
        assert!(parse_locator("").is_none());
        assert!(parse_locator("somewhere in the middle").is_none());
        assert!(parse_locator("Page X, Para 2").is_none());
    }

    #[test]
    fn test_malformed_paragraph_keeps_page() {
        let loc = parse_locator("Page 1, Para ?: Введение в предметную область").unwrap();
        assert_eq!(
            loc,
            Locator {
                page: 1,
                paragraph: None,
                excerpt: None,
            }
        );
        assert_eq!(parse_locator("Стр. 5 ???").unwrap().page, 5);
    }

    #[test]
    fn test_empty_excerpt() {
        let loc = parse_locator("Page 1, Para 3: ...").unwrap();
        assert_eq!(loc.excerpt, None);
    }
}
