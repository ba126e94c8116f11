//! Placement of formatting-violation markers on rendered PDF pages
//!
//! The checker backend reports violations against a `.docx` source; the
//! viewer shows the converted PDF. This crate maps each violation to a
//! vertical offset on its rendered page from the page's text layer, keeps
//! markers legible when many land close together, and derives the category
//! and score shown in the sidebar.

pub mod bounds;
pub mod categories;
pub mod cluster;
pub mod config;
pub mod error;
pub mod extractors;
pub mod index;
pub mod keywords;
pub mod normalize;
pub mod overlap;
pub mod patterns;
pub mod resolver;
pub mod scoring;

pub use bounds::PageBounds;
pub use categories::{categorize, Category};
pub use cluster::Cluster;
pub use config::EngineConfig;
pub use error::EngineError;
pub use extractors::{parse_locator, Locator};
pub use index::TextLayerIndex;
pub use keywords::extract_keywords;
pub use normalize::normalize;
pub use overlap::OverlapResolver;
pub use resolver::{FallbackSlot, PositionResolver, Resolution};
pub use scoring::{effective_score, score, ScoreSummary};

use serde::{Deserialize, Serialize};
use shared_types::{ResolvedPosition, TextFragment, Violation};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{info, instrument};

/// One rendered page as reported by the host viewer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageInput {
    /// 1-indexed page number
    pub page_number: u32,
    pub page_height: f64,
    /// Text fragments in reading order. `None` when the host has no text
    /// layer for this page at all.
    #[serde(default)]
    pub fragments: Option<Vec<TextFragment>>,
}

/// Final marker layout of one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagePlacement {
    pub page_number: u32,
    /// False when the page had no text layer; nothing was resolved
    pub available: bool,
    pub positions: BTreeMap<String, ResolvedPosition>,
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

impl PagePlacement {
    pub fn unavailable(page_number: u32) -> Self {
        Self {
            page_number,
            available: false,
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<&ResolvedPosition> {
        self.positions.get(key)
    }
}

/// PlacementEngine entry point
pub struct PlacementEngine {
    config: EngineConfig,
}

impl PlacementEngine {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Place the markers of `violations` that belong to `page.page_number`.
    ///
    /// The text layer is indexed once; each violation is resolved, then all
    /// positions go through overlap resolution and optional clustering.
    /// Calling this again with the same inputs gives the same result.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidPageHeight`] when the page height is not a
    /// positive finite number.
    #[instrument(skip_all, fields(page = page.page_number))]
    pub fn place_page(
        &self,
        page: &PageInput,
        violations: &[Violation],
    ) -> Result<PagePlacement, EngineError> {
        if !(page.page_height.is_finite() && page.page_height > 0.0) {
            return Err(EngineError::InvalidPageHeight(page.page_height));
        }
        let Some(fragments) = page.fragments.as_deref() else {
            info!("no text layer, markers unavailable");
            return Ok(PagePlacement::unavailable(page.page_number));
        };

        let on_page = unique_by_key(violations_for_page(violations, page.page_number));
        let index = TextLayerIndex::build(fragments);
        let resolver = PositionResolver::new(&self.config);

        let mut resolved: BTreeMap<String, Resolution> = BTreeMap::new();
        for (i, violation) in on_page.iter().enumerate() {
            let slot = FallbackSlot {
                index: i,
                count: on_page.len(),
            };
            let resolution = resolver.resolve(violation, &index, page.page_height, slot);
            resolved.insert(violation.key(), resolution);
        }

        let raw: BTreeMap<String, f64> = resolved.iter().map(|(k, r)| (k.clone(), r.y)).collect();
        let overlap = OverlapResolver::new(page.page_height, &self.config);
        let finals = overlap.optimize(&on_page, &raw);

        let clusters = if self.config.clustering {
            let severities: HashMap<String, _> =
                on_page.iter().map(|v| (v.key(), v.severity)).collect();
            cluster::build_clusters(&finals, &severities, self.config.cluster_threshold)
        } else {
            Vec::new()
        };

        let positions: BTreeMap<String, ResolvedPosition> = finals
            .into_iter()
            .filter_map(|(key, y)| {
                let r = resolved.get(&key)?;
                Some((
                    key.clone(),
                    ResolvedPosition {
                        key,
                        y,
                        confidence: r.confidence,
                        method: r.method,
                    },
                ))
            })
            .collect();

        info!(
            fragments = index.len(),
            markers = positions.len(),
            clusters = clusters.len(),
            "placed page markers"
        );

        Ok(PagePlacement {
            page_number: page.page_number,
            available: true,
            positions,
            clusters,
        })
    }
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Violations whose locator names `page`, in input order. Violations without
/// a parsable page number belong to page 1.
pub fn violations_for_page(violations: &[Violation], page: u32) -> Vec<&Violation> {
    violations
        .iter()
        .filter(|v| locator_page(v).unwrap_or(1) == page)
        .collect()
}

/// Violations whose locator carries no parsable page number. They are placed
/// on page 1 by the distribution fallback.
pub fn unlocated(violations: &[Violation]) -> Vec<&Violation> {
    violations
        .iter()
        .filter(|v| locator_page(v).is_none())
        .collect()
}

fn locator_page(violation: &Violation) -> Option<u32> {
    violation
        .position_in_doc
        .as_deref()
        .and_then(parse_locator)
        .map(|loc| loc.page)
}

fn unique_by_key(violations: Vec<&Violation>) -> Vec<&Violation> {
    let mut seen = HashSet::new();
    violations
        .into_iter()
        .filter(|v| seen.insert(v.key()))
        .collect()
}
