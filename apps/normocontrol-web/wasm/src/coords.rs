//! Coordinate transformation from PDF space into page-top layout space
//!
//! pdf.js reports text items with a baseline origin in PDF space
//! (bottom-left origin, points). The placement engine works in the rendered
//! page's layout space (top-left origin, pixels), so every item is converted
//! before it becomes a [`TextFragment`].

use serde::{Deserialize, Serialize};
use shared_types::TextFragment;

/// A text item as returned by pdf.js `page.getTextContent()`. Marked-content
/// entries carry no `str` and come out empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfTextItem {
    #[serde(rename = "str", default)]
    pub text: String,
    /// `[a, b, c, d, e, f]` text matrix; `(e, f)` is the baseline origin
    #[serde(default)]
    pub transform: [f64; 6],
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Convert PDF coordinates to DOM coordinates
pub fn pdf_to_dom(
    pdf_x: f64,
    pdf_y: f64,
    container_width: f64,
    container_height: f64,
    media_box: [f64; 4],
) -> (f64, f64) {
    let [mb_x, mb_y, mb_width, mb_height] = media_box;

    // Convert to percentage
    let x_pct = (pdf_x - mb_x) / mb_width;
    let y_pct = 1.0 - ((pdf_y - mb_y) / mb_height); // Flip Y axis

    // Convert to DOM coordinates
    let dom_x = x_pct * container_width;
    let dom_y = y_pct * container_height;

    (dom_x, dom_y)
}

/// Convert one pdf.js text item into a fragment positioned from the top of
/// the rendered page. The fragment's `y` is the top of the glyph box.
pub fn text_item_to_fragment(
    item: &PdfTextItem,
    container_width: f64,
    container_height: f64,
    media_box: [f64; 4],
) -> TextFragment {
    let [_, _, c, d, e, f] = item.transform;
    let [_, _, mb_width, mb_height] = media_box;

    let (dom_x, baseline_y) = pdf_to_dom(e, f, container_width, container_height, media_box);

    // Font height from the text matrix; pdf.js leaves `height` at 0 for
    // some fonts.
    let font_height = if item.height > 0.0 {
        item.height
    } else {
        c.hypot(d)
    };
    let scale_y = container_height / mb_height;
    let scale_x = container_width / mb_width;
    let height = font_height * scale_y;

    TextFragment {
        text: item.text.clone(),
        y: baseline_y - height,
        x: Some(dom_x),
        width: Some(item.width * scale_x),
        height: Some(height),
    }
}

/// Convert a page's text items, dropping whitespace-only ones. Order is kept.
pub fn text_items_to_fragments(
    items: &[PdfTextItem],
    container_width: f64,
    container_height: f64,
    media_box: [f64; 4],
) -> Vec<TextFragment> {
    items
        .iter()
        .filter(|item| !item.text.trim().is_empty())
        .map(|item| text_item_to_fragment(item, container_width, container_height, media_box))
        .collect()
}
