//! Violation → vertical page offset resolution
//!
//! Strategies are tried from most to least precise; the first one that
//! produces a position wins:
//!
//! | Level | Strategy | Method | Confidence |
//! |-------|----------|--------|------------|
//! | 1 | Verbatim query in the joined page text | `exact_match` / `text_search` | 0.98 / 0.92 |
//! | 2 | Query against runs glued with their neighbours, spaces ignored | `fragment_span` | 0.88 |
//! | 3 | Keyword coverage of a sliding fragment window | `keyword_match` | window score, ≤ 0.9 |
//! | 4 | Paragraph number interpolated over the page | `paragraph_estimate` | 0.5 |
//! | 5 | Even spacing among the page's violations | `distribute_fallback` | 0.3 (0.0 without text) |
//!
//! Levels 1–3 need a usable search string; a violation whose locator does not
//! parse, or whose page has no text at all, goes straight to level 5. Every returned `y` is clamped into the
//! page's [`PageBounds`]. Resolution is pure: the same inputs always produce
//! the same output.

use crate::bounds::PageBounds;
use crate::config::EngineConfig;
use crate::extractors::{parse_locator, search_text_for, Locator};
use crate::index::{IndexedFragment, TextLayerIndex};
use crate::keywords::extract_keywords;
use crate::normalize::{compact, normalize, prefix_chars};
use shared_types::{ResolutionMethod, Violation};
use tracing::{debug, instrument};

pub const EXACT_CONFIDENCE: f64 = 0.98;
pub const SHORT_SNIPPET_CONFIDENCE: f64 = 0.92;
pub const SPAN_CONFIDENCE: f64 = 0.88;
pub const KEYWORD_CONFIDENCE_CAP: f64 = 0.9;
pub const PARAGRAPH_CONFIDENCE: f64 = 0.5;
pub const FALLBACK_CONFIDENCE: f64 = 0.3;

/// Keyword matching needs at least this many keywords to be meaningful
const MIN_KEYWORDS: usize = 2;

/// Where a violation sits among the violations of its page, for the
/// even-distribution fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackSlot {
    /// 0-based position among the page's violations
    pub index: usize,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub y: f64,
    pub confidence: f64,
    pub method: ResolutionMethod,
}

pub struct PositionResolver<'a> {
    config: &'a EngineConfig,
}

impl<'a> PositionResolver<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve one violation against an indexed page.
    #[instrument(level = "debug", skip_all, fields(id = %violation.id))]
    pub fn resolve(
        &self,
        violation: &Violation,
        index: &TextLayerIndex,
        page_height: f64,
        slot: FallbackSlot,
    ) -> Resolution {
        let bounds = PageBounds::from_config(page_height, self.config);
        let resolution = self
            .cascade(violation, index, &bounds)
            .unwrap_or_else(|| self.distribute(index, page_height, slot));

        let resolution = Resolution {
            y: bounds.clamp(resolution.y),
            ..resolution
        };
        debug!(
            method = resolution.method.as_str(),
            confidence = resolution.confidence,
            y = resolution.y,
            "resolved violation position"
        );
        resolution
    }

    fn cascade(
        &self,
        violation: &Violation,
        index: &TextLayerIndex,
        bounds: &PageBounds,
    ) -> Option<Resolution> {
        let locator = violation.position_in_doc.as_deref().and_then(parse_locator)?;
        // Nothing to anchor to on a page without text
        if index.is_empty() {
            return None;
        }

        if let Some(text) = search_text_for(violation, self.config.min_search_text_len) {
            let query = normalize(&text);
            let found = self
                .verbatim(&query, index)
                .or_else(|| self.fragment_span(&text, index))
                .or_else(|| self.keyword_window(&text, index));
            if found.is_some() {
                return found;
            }
        }

        self.paragraph_estimate(&locator, index, bounds)
    }

    /// Level 1: the query prefix as a substring of the joined page text,
    /// retried with the short snippet.
    fn verbatim(&self, query: &str, index: &TextLayerIndex) -> Option<Resolution> {
        let full = prefix_chars(query, self.config.query_max_chars);
        if let Some(fragment) = index.find(full) {
            return Some(hit(fragment, EXACT_CONFIDENCE, ResolutionMethod::ExactMatch));
        }

        let short = prefix_chars(query, self.config.query_min_chars);
        if short.len() < full.len() {
            if let Some(fragment) = index.find(short) {
                return Some(hit(
                    fragment,
                    SHORT_SNIPPET_CONFIDENCE,
                    ResolutionMethod::TextSearch,
                ));
            }
        }
        None
    }

    /// Level 2: glue each fragment to its next neighbours without separators
    /// and look for the space-free query. Catches words a renderer split
    /// into several runs.
    fn fragment_span(&self, text: &str, index: &TextLayerIndex) -> Option<Resolution> {
        let needle = compact(prefix_chars(&normalize(text), self.config.query_max_chars));
        if needle.is_empty() {
            return None;
        }

        let fragments = index.fragments();
        for start in 0..fragments.len() {
            let last = (start + self.config.span_neighbors).min(fragments.len() - 1);
            let mut joined = String::new();
            // byte offset in `joined` where each glued fragment ends
            let mut ends = Vec::with_capacity(last - start + 1);
            for fragment in &fragments[start..=last] {
                joined.extend(fragment.text.chars().filter(|c| *c != ' '));
                ends.push(joined.len());
            }
            if let Some(offset) = joined.find(&needle) {
                let within = ends.iter().position(|end| offset < *end).unwrap_or(0);
                return Some(hit(
                    &fragments[start + within],
                    SPAN_CONFIDENCE,
                    ResolutionMethod::FragmentSpan,
                ));
            }
        }
        None
    }

    /// Level 3: best window of consecutive fragments by keyword coverage.
    /// Earlier windows win ties.
    fn keyword_window(&self, text: &str, index: &TextLayerIndex) -> Option<Resolution> {
        let keywords = extract_keywords(text, self.config.keyword_max_count);
        if keywords.len() < MIN_KEYWORDS {
            return None;
        }

        let fragments = index.fragments();
        let window = self.config.keyword_window.min(fragments.len());
        let mut best: Option<(usize, f64)> = None;

        for start in 0..=(fragments.len() - window) {
            let slice = &fragments[start..start + window];
            let hits = keywords
                .iter()
                .filter(|kw| slice.iter().any(|f| f.text.contains(kw.as_str())))
                .count();
            let score = hits as f64 / keywords.len() as f64;
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((start, score)),
            }
        }

        let (start, score) = best?;
        if score < self.config.keyword_threshold {
            return None;
        }

        let slice = &fragments[start..start + window];
        let anchor = slice
            .iter()
            .find(|f| keywords.iter().any(|kw| f.text.contains(kw.as_str())))
            .unwrap_or(&slice[0]);
        Some(hit(
            anchor,
            score.min(KEYWORD_CONFIDENCE_CAP),
            ResolutionMethod::KeywordMatch,
        ))
    }

    /// Level 4: interpolate the paragraph's place on the page assuming a
    /// uniform paragraph density. The text block spanned by the page's
    /// fragments is used when there is one, the margin band otherwise.
    fn paragraph_estimate(
        &self,
        locator: &Locator,
        index: &TextLayerIndex,
        bounds: &PageBounds,
    ) -> Option<Resolution> {
        let paragraph = locator.paragraph?;
        let per_page = self.config.estimated_paragraphs_per_page.max(1);

        // Paragraph numbers count from the start of the document; numbers
        // that fall before this page's share pin to its first paragraph.
        let preceding = locator.page.saturating_sub(1).saturating_mul(per_page);
        let local = paragraph.saturating_sub(preceding).max(1);
        let ratio = f64::from(local.min(per_page)) / f64::from(per_page);

        let (top, bottom) = match (index.fragments().first(), index.fragments().last()) {
            (Some(first), Some(last)) if last.anchor_y() > first.anchor_y() => {
                (first.anchor_y(), last.anchor_y())
            }
            _ => (bounds.top, bounds.bottom),
        };

        Some(Resolution {
            y: top + ratio * (bottom - top),
            confidence: PARAGRAPH_CONFIDENCE,
            method: ResolutionMethod::ParagraphEstimate,
        })
    }

    /// Level 5: never fails.
    fn distribute(&self, index: &TextLayerIndex, page_height: f64, slot: FallbackSlot) -> Resolution {
        let count = slot.count.max(1);
        let position = slot.index.min(count - 1) + 1;
        let confidence = if index.is_empty() {
            0.0
        } else {
            FALLBACK_CONFIDENCE
        };
        Resolution {
            y: page_height / (count as f64 + 1.0) * position as f64,
            confidence,
            method: ResolutionMethod::DistributeFallback,
        }
    }
}

fn hit(fragment: &IndexedFragment, confidence: f64, method: ResolutionMethod) -> Resolution {
    Resolution {
        y: fragment.anchor_y(),
        confidence,
        method,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::{Severity, TextFragment};

    proptest! {
        #[test]
        fn resolved_y_within_bounds(
            page_height in 100.0f64..2000.0,
            ys in prop::collection::vec(-500.0f64..3000.0, 0..12),
            paragraph in 0u32..200,
            index in 0usize..10,
            count in 1usize..10,
        ) {
            let config = EngineConfig::default();
            let resolver = PositionResolver::new(&config);
            let fragments: Vec<TextFragment> = ys
                .iter()
                .enumerate()
                .map(|(i, y)| TextFragment::new(format!("строка текста номер {}", i), *y))
                .collect();
            let text_index = TextLayerIndex::build(&fragments);
            let v = Violation {
                id: "p".to_string(),
                rule_type: "margin_left".to_string(),
                severity: Severity::Warning,
                description: String::new(),
                expected_value: String::new(),
                actual_value: String::new(),
                position_in_doc: Some(format!("Page 1, Para {}: строка текста номер 3", paragraph)),
                context_text: None,
            };
            let r = resolver.resolve(&v, &text_index, page_height, FallbackSlot { index, count });
            let bounds = PageBounds::from_config(page_height, &config);
            prop_assert!(bounds.contains(r.y), "y {} outside {:?}", r.y, bounds);
            prop_assert!((0.0..=1.0).contains(&r.confidence));
        }
    }
}
