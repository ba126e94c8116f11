//! Per-page marker state driven by the renderer's retry ladder
//!
//! The text layer of a rendered page is only trustworthy once the browser has
//! finished reflow, so the host re-runs resolution a few times after the page
//! load event. Every attempt recomputes the whole page from scratch and
//! replaces the previous mapping; nothing carries over between attempts.

use crate::coords::{text_items_to_fragments, PdfTextItem};
use compliance_engine::{EngineConfig, EngineError, PageInput, PagePlacement, PlacementEngine};
use shared_types::{ResolvedPosition, TextFragment, Violation};
use wasm_bindgen::prelude::*;

/// Marker state of one rendered page
#[wasm_bindgen]
pub struct PageSession {
    page_number: u32,
    page_height: f64,
    /// `None` until the host reports a text layer, or when it has none
    fragments: Option<Vec<TextFragment>>,
    violations: Vec<Violation>,
    engine: PlacementEngine,
    attempt: u32,
    placement: Option<PagePlacement>,
}

impl PageSession {
    /// Internal constructor (testable without JsValue)
    pub fn create(
        page_number: u32,
        page_height: f64,
        violations: Vec<Violation>,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        let violations = compliance_engine::violations_for_page(&violations, page_number)
            .into_iter()
            .cloned()
            .collect();
        Ok(Self {
            page_number,
            page_height,
            fragments: None,
            violations,
            engine: PlacementEngine::with_config(config)?,
            attempt: 0,
            placement: None,
        })
    }

    /// Replace the text layer, e.g. after the page was re-rendered
    pub fn set_fragments(&mut self, fragments: Option<Vec<TextFragment>>) {
        self.fragments = fragments;
    }

    pub fn set_page_height(&mut self, page_height: f64) {
        self.page_height = page_height;
    }

    /// Run one attempt of the ladder. The result replaces whatever an earlier
    /// attempt produced.
    pub fn run_attempt(&mut self) -> Result<&PagePlacement, EngineError> {
        self.attempt += 1;
        let input = PageInput {
            page_number: self.page_number,
            page_height: self.page_height,
            fragments: self.fragments.clone(),
        };
        let placement = self.engine.place_page(&input, &self.violations)?;
        tracing::debug!(
            page = self.page_number,
            attempt = self.attempt,
            markers = placement.positions.len(),
            "resolution attempt"
        );
        Ok(&*self.placement.insert(placement))
    }

    pub fn placement(&self) -> Option<&PagePlacement> {
        self.placement.as_ref()
    }

    pub fn position(&self, key: &str) -> Option<&ResolvedPosition> {
        self.placement.as_ref().and_then(|p| p.get(key))
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn delays(&self) -> &[u32] {
        &self.engine.config().retry_delays_ms
    }

    /// Layout of the markers of an expanded cluster badge
    pub fn expanded_cluster(&self, cluster_id: &str) -> Option<Vec<(String, f64)>> {
        let placement = self.placement.as_ref()?;
        let cluster = placement.clusters.iter().find(|c| c.id == cluster_id)?;
        let config = self.engine.config();
        let bounds = compliance_engine::PageBounds::from_config(self.page_height, config);
        Some(cluster.expanded_layout(config.cluster_stack_spacing, bounds))
    }
}

// WASM bindings
#[wasm_bindgen]
impl PageSession {
    /// Create a session for one page. `violations_json` is the full list of
    /// the document; only the violations located on this page are kept.
    #[wasm_bindgen(constructor)]
    pub fn new(
        page_number: u32,
        page_height: f64,
        violations_json: &str,
        config_toml: Option<String>,
    ) -> Result<PageSession, JsValue> {
        let violations: Vec<Violation> = serde_json::from_str(violations_json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse violations: {}", e)))?;
        let config = match config_toml {
            Some(ref toml) if !toml.trim().is_empty() => EngineConfig::from_str(toml)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
            _ => EngineConfig::default(),
        };
        Self::create(page_number, page_height, violations, config)
            .map_err(|e| JsValue::from_str(&format!("Failed to create session: {}", e)))
    }

    #[wasm_bindgen(getter, js_name = pageNumber)]
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Number of attempts run so far
    #[wasm_bindgen(getter)]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Set the text layer from pdf.js `getTextContent().items`, converted
    /// into the rendered page of the given size. The rendered height becomes
    /// the page height.
    #[wasm_bindgen(js_name = setTextItems)]
    pub fn set_text_items(
        &mut self,
        items: JsValue,
        container_width: f64,
        container_height: f64,
        media_box: Vec<f64>,
    ) -> Result<(), JsValue> {
        let items: Vec<PdfTextItem> = serde_wasm_bindgen::from_value(items)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse text items: {}", e)))?;
        let media_box: [f64; 4] = media_box
            .try_into()
            .map_err(|_| JsValue::from_str("Media box must have 4 numbers"))?;
        self.fragments = Some(text_items_to_fragments(
            &items,
            container_width,
            container_height,
            media_box,
        ));
        self.page_height = container_height;
        Ok(())
    }

    /// Set the text layer from already positioned fragments
    #[wasm_bindgen(js_name = setFragmentsJson)]
    pub fn set_fragments_json(&mut self, fragments_json: &str) -> Result<(), JsValue> {
        let fragments: Vec<TextFragment> = serde_json::from_str(fragments_json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse fragments: {}", e)))?;
        self.set_fragments(Some(fragments));
        Ok(())
    }

    /// The renderer produced no text layer for this page
    #[wasm_bindgen(js_name = markTextLayerUnavailable)]
    pub fn mark_text_layer_unavailable(&mut self) {
        self.set_fragments(None);
    }

    /// Run one attempt and return the page placement
    #[wasm_bindgen(js_name = resolveAttempt)]
    pub fn resolve_attempt(&mut self) -> Result<JsValue, JsValue> {
        let placement = self
            .run_attempt()
            .map_err(|e| JsValue::from_str(&format!("Resolution failed: {}", e)))?;
        serde_wasm_bindgen::to_value(placement)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Latest placement as JSON, `None` before the first attempt
    #[wasm_bindgen(js_name = getPlacementJson)]
    pub fn get_placement_json(&self) -> Option<String> {
        self.placement
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok())
    }

    #[wasm_bindgen(js_name = getExpandedClusterJson)]
    pub fn get_expanded_cluster_json(&self, cluster_id: &str) -> Option<String> {
        self.expanded_cluster(cluster_id)
            .and_then(|layout| serde_json::to_string(&layout).ok())
    }

    /// Delays of the retry ladder, in milliseconds after the page load event
    #[wasm_bindgen(js_name = retryDelaysMs)]
    pub fn retry_delays_ms(&self) -> Vec<u32> {
        self.delays().to_vec()
    }

    /// Schedule `callback` once per ladder step with `setTimeout`. The
    /// callback is expected to call `resolveAttempt`. Returns the timer ids.
    #[wasm_bindgen(js_name = scheduleRetries)]
    pub fn schedule_retries(&self, callback: &js_sys::Function) -> Result<Vec<i32>, JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        self.delays()
            .iter()
            .map(|delay| {
                let timeout = i32::try_from(*delay).unwrap_or(i32::MAX);
                window.set_timeout_with_callback_and_timeout_and_arguments_0(callback, timeout)
            })
            .collect()
    }
}
