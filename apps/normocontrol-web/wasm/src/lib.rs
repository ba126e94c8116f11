use compliance_engine::categories::{group_by_category, ALL_CATEGORIES};
use compliance_engine::{
    effective_score, score, unlocated, EngineConfig, EngineError, PageInput, PlacementEngine,
};
use shared_types::{CheckResult, Violation};
use wasm_bindgen::prelude::*;

// Export modules
pub mod coords;
pub mod page_session;
pub mod violation_panel;

// Re-export commonly used items
pub use coords::{pdf_to_dom, text_item_to_fragment, text_items_to_fragments, PdfTextItem};
pub use page_session::PageSession;
pub use violation_panel::{ViolationItem, ViolationPanel};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&JsValue::from_str("normocontrol-wasm loaded"));
}

fn engine_from_toml(config_toml: Option<&str>) -> Result<PlacementEngine, EngineError> {
    match config_toml {
        Some(toml) if !toml.trim().is_empty() => {
            PlacementEngine::with_config(EngineConfig::from_str(toml)?)
        }
        _ => Ok(PlacementEngine::new()),
    }
}

/// Place one page's markers (testable without JsValue)
pub fn place_page_from_json(
    page_json: &str,
    violations_json: &str,
    config_toml: Option<&str>,
) -> Result<String, EngineError> {
    let page: PageInput = serde_json::from_str(page_json)?;
    let violations: Vec<Violation> = serde_json::from_str(violations_json)?;
    let placement = engine_from_toml(config_toml)?.place_page(&page, &violations)?;
    Ok(serde_json::to_string(&placement)?)
}

/// Violations grouped by category in legend order (testable without JsValue)
pub fn categories_from_json(violations_json: &str) -> Result<String, EngineError> {
    let violations: Vec<Violation> = serde_json::from_str(violations_json)?;
    let groups: Vec<_> = group_by_category(&violations)
        .into_iter()
        .map(|(category, members)| {
            serde_json::json!({
                "category": category,
                "label": category.label(),
                "icon": category.icon(),
                "count": members.len(),
                "keys": members.iter().map(|v| v.key()).collect::<Vec<_>>(),
            })
        })
        .collect();
    Ok(serde_json::to_string(&groups)?)
}

/// Severity counts, local score and displayed score (testable without JsValue)
pub fn score_from_json(result_json: &str) -> Result<String, EngineError> {
    let result: CheckResult = serde_json::from_str(result_json)?;
    let summary = score(&result.violations);
    let report = serde_json::json!({
        "summary": summary,
        "effective_score": effective_score(&result),
        "backend_score": result.score,
        "unlocated": unlocated(&result.violations).iter().map(|v| v.key()).collect::<Vec<_>>(),
    });
    Ok(serde_json::to_string(&report)?)
}

/// WASM entry point for one page placement
///
/// # Arguments
/// * `page_json` - `{ "page_number", "page_height", "fragments" }`; `fragments`
///   is null when the page has no text layer
/// * `violations_json` - all violations of the document
/// * `config_toml` - optional engine configuration overrides
///
/// # Returns
/// JSON string of PagePlacement
#[wasm_bindgen]
pub fn place_page_json(
    page_json: &str,
    violations_json: &str,
    config_toml: Option<String>,
) -> Result<String, JsValue> {
    place_page_from_json(page_json, violations_json, config_toml.as_deref())
        .map_err(|e| JsValue::from_str(&format!("Placement failed: {}", e)))
}

#[wasm_bindgen]
pub fn categorize_json(violations_json: &str) -> Result<String, JsValue> {
    categories_from_json(violations_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to categorize: {}", e)))
}

#[wasm_bindgen]
pub fn score_json(result_json: &str) -> Result<String, JsValue> {
    score_from_json(result_json)
        .map_err(|e| JsValue::from_str(&format!("Failed to score: {}", e)))
}

/// Legend entries for every category, including empty ones
#[wasm_bindgen]
pub fn get_categories() -> Result<String, JsValue> {
    let categories: Vec<_> = ALL_CATEGORIES
        .iter()
        .map(|c| {
            serde_json::json!({
                "category": c,
                "label": c.label(),
                "icon": c.icon(),
            })
        })
        .collect();

    serde_json::to_string(&categories)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize categories: {}", e)))
}
