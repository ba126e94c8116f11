//! Searchable representation of one rendered page's text layer
//!
//! Fragments are normalized and joined with single spaces into one string so
//! a query that wraps across lines can be found with one substring search.
//! Each contributing fragment records the byte range it occupies in that
//! string. The index is rebuilt whenever the page's fragments change and is
//! never shared between pages.

use crate::normalize::normalize;
use shared_types::TextFragment;

/// Byte range `[start, end)` of `full_text` contributed by one fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentSpan {
    pub start: usize,
    pub end: usize,
    /// Position in [`TextLayerIndex::fragments`]
    pub fragment: usize,
}

/// A fragment that survived normalization, with its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedFragment {
    pub text: String,
    pub y: f64,
    pub x: Option<f64>,
    pub height: Option<f64>,
}

impl IndexedFragment {
    /// Vertical point a marker for this fragment is aligned with: the middle
    /// of the line when its height is known, its top otherwise.
    pub fn anchor_y(&self) -> f64 {
        match self.height {
            Some(h) if h.is_finite() && h > 0.0 => self.y + h / 2.0,
            _ => self.y,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextLayerIndex {
    full_text: String,
    spans: Vec<FragmentSpan>,
    fragments: Vec<IndexedFragment>,
}

impl TextLayerIndex {
    /// Build the index from fragments in reading order. Fragments that
    /// normalize to nothing, or carry a non-finite `y`, are skipped.
    pub fn build(fragments: &[TextFragment]) -> Self {
        let mut index = TextLayerIndex::default();

        for fragment in fragments {
            if !fragment.y.is_finite() {
                continue;
            }
            let text = normalize(&fragment.text);
            if text.is_empty() {
                continue;
            }

            if !index.full_text.is_empty() {
                index.full_text.push(' ');
            }
            let start = index.full_text.len();
            index.full_text.push_str(&text);
            index.spans.push(FragmentSpan {
                start,
                end: index.full_text.len(),
                fragment: index.fragments.len(),
            });
            index.fragments.push(IndexedFragment {
                text,
                y: fragment.y,
                x: fragment.x,
                height: fragment.height,
            });
        }

        index
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn spans(&self) -> &[FragmentSpan] {
        &self.spans
    }

    pub fn fragments(&self) -> &[IndexedFragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragment containing byte `offset` of the full text. An offset that
    /// falls on a joining space belongs to the following fragment.
    pub fn fragment_at(&self, offset: usize) -> Option<&IndexedFragment> {
        let pos = self.spans.partition_point(|span| span.end <= offset);
        self.spans
            .get(pos)
            .and_then(|span| self.fragments.get(span.fragment))
    }

    /// First occurrence of an already-normalized `query`, returned as the
    /// fragment the match starts in.
    pub fn find(&self, query: &str) -> Option<&IndexedFragment> {
        if query.is_empty() {
            return None;
        }
        self.full_text
            .find(query)
            .and_then(|offset| self.fragment_at(offset))
    }
}
