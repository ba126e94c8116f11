//! Safe vertical band of a page

use crate::config::EngineConfig;

/// `[top, bottom]` interval every marker position must fall inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    pub top: f64,
    pub bottom: f64,
}

impl PageBounds {
    /// Band for a page of `page_height` units. On a page shorter than both
    /// margins together the band collapses to the page middle.
    pub fn new(page_height: f64, top_margin: f64, bottom_margin: f64) -> Self {
        let top = top_margin.min(page_height / 2.0).max(0.0);
        let bottom = (page_height - bottom_margin).max(top);
        Self { top, bottom }
    }

    pub fn from_config(page_height: f64, config: &EngineConfig) -> Self {
        Self::new(page_height, config.top_margin, config.bottom_margin)
    }

    pub fn clamp(&self, y: f64) -> f64 {
        if y.is_nan() {
            return self.top;
        }
        y.clamp(self.top, self.bottom)
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom
    }
}
