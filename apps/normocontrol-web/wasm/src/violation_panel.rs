use compliance_engine::categories::{categorize, Category};
use compliance_engine::{effective_score, parse_locator, score, ScoreSummary};
use serde::{Deserialize, Serialize};
use shared_types::{CheckResult, Severity, Violation};
use wasm_bindgen::prelude::*;

/// One row of the sidebar list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationItem {
    /// Marker key, shared with the page placement
    pub key: String,
    pub violation: Violation,
    pub category: Category,
    pub category_label: String,
    pub color: String,
    /// Page from the locator; `None` when it has none and the marker sits on page 1
    pub page: Option<u32>,
    pub is_highlighted: bool,
}

/// Sidebar state for one checked document
#[wasm_bindgen]
#[derive(Default)]
pub struct ViolationPanel {
    result: CheckResult,
    items: Vec<ViolationItem>,
    selected_key: Option<String>,
}

impl ViolationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_result(&mut self, result: CheckResult) {
        self.items = result
            .violations
            .iter()
            .map(|violation| {
                let category = categorize(violation);
                ViolationItem {
                    key: violation.key(),
                    violation: violation.clone(),
                    category,
                    category_label: category.label().to_string(),
                    color: violation.severity.color().to_string(),
                    page: violation
                        .position_in_doc
                        .as_deref()
                        .and_then(parse_locator)
                        .map(|loc| loc.page),
                    is_highlighted: false,
                }
            })
            .collect();
        self.result = result;
        self.selected_key = None;
    }

    pub fn items(&self) -> &[ViolationItem] {
        &self.items
    }

    pub fn filter_by_severity(&self, severity: Severity) -> Vec<&ViolationItem> {
        self.items
            .iter()
            .filter(|item| item.violation.severity == severity)
            .collect()
    }

    pub fn filter_by_category(&self, category: Category) -> Vec<&ViolationItem> {
        self.items
            .iter()
            .filter(|item| item.category == category)
            .collect()
    }

    pub fn items_for_page(&self, page: u32) -> Vec<&ViolationItem> {
        self.items
            .iter()
            .filter(|item| item.page.unwrap_or(1) == page)
            .collect()
    }

    pub fn summary(&self) -> ScoreSummary {
        score(&self.result.violations)
    }

    pub fn score(&self) -> f64 {
        effective_score(&self.result)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_default()
    }

    /// Highlight the item with `key`; an unknown key clears the selection
    pub fn select(&mut self, key: &str) {
        for item in &mut self.items {
            item.is_highlighted = false;
        }

        if let Some(item) = self.items.iter_mut().find(|item| item.key == key) {
            item.is_highlighted = true;
            self.selected_key = Some(key.to_string());
        } else {
            self.selected_key = None;
        }
    }

    pub fn get_selected(&self) -> Option<&ViolationItem> {
        self.selected_key
            .as_ref()
            .and_then(|key| self.items.iter().find(|item| &item.key == key))
    }

    fn count(&self, severity: Severity) -> u32 {
        self.items
            .iter()
            .filter(|item| item.violation.severity == severity)
            .count() as u32
    }
}

// WASM bindings
#[wasm_bindgen]
impl ViolationPanel {
    #[wasm_bindgen(constructor)]
    pub fn new_wasm() -> Self {
        Self::new()
    }

    /// Load a check result as sent by the backend
    #[wasm_bindgen(js_name = loadResultJson)]
    pub fn load_result_json(&mut self, result_json: &str) -> Result<(), JsValue> {
        let result: CheckResult = serde_json::from_str(result_json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse check result: {}", e)))?;
        self.set_result(result);
        Ok(())
    }

    #[wasm_bindgen(js_name = getItemsJson)]
    pub fn get_items_json(&self) -> String {
        self.to_json()
    }

    #[wasm_bindgen(js_name = getPageItemsJson)]
    pub fn get_page_items_json(&self, page: u32) -> String {
        serde_json::to_string(&self.items_for_page(page)).unwrap_or_default()
    }

    /// Items of one severity; unknown severity names count as `error`
    #[wasm_bindgen(js_name = getSeverityItemsJson)]
    pub fn get_severity_items_json(&self, severity: &str) -> String {
        serde_json::to_string(&self.filter_by_severity(Severity::parse(severity)))
            .unwrap_or_default()
    }

    /// Items of one category, e.g. `"page_setup"`. An unknown name yields `[]`.
    #[wasm_bindgen(js_name = getCategoryItemsJson)]
    pub fn get_category_items_json(&self, category: &str) -> String {
        let items = match serde_json::from_value::<Category>(serde_json::Value::from(category)) {
            Ok(category) => self.filter_by_category(category),
            Err(_) => Vec::new(),
        };
        serde_json::to_string(&items).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = getCriticalCount)]
    pub fn get_critical_count(&self) -> u32 {
        self.count(Severity::Critical)
    }

    #[wasm_bindgen(js_name = getErrorCount)]
    pub fn get_error_count(&self) -> u32 {
        self.count(Severity::Error)
    }

    #[wasm_bindgen(js_name = getWarningCount)]
    pub fn get_warning_count(&self) -> u32 {
        self.count(Severity::Warning)
    }

    #[wasm_bindgen(js_name = getInfoCount)]
    pub fn get_info_count(&self) -> u32 {
        self.count(Severity::Info)
    }

    /// Score shown in the header: the backend's when present
    #[wasm_bindgen(js_name = getScore)]
    pub fn get_score(&self) -> f64 {
        self.score()
    }

    #[wasm_bindgen(js_name = getSummaryJson)]
    pub fn get_summary_json(&self) -> String {
        serde_json::to_string(&self.summary()).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = selectViolation)]
    pub fn select_violation_wasm(&mut self, key: &str) {
        self.select(key);
    }

    #[wasm_bindgen(js_name = getSelectedJson)]
    pub fn get_selected_json(&self) -> Option<String> {
        self.get_selected()
            .and_then(|item| serde_json::to_string(item).ok())
    }

    #[wasm_bindgen(js_name = clearViolations)]
    pub fn clear_violations(&mut self) {
        self.result = CheckResult::default();
        self.items.clear();
        self.selected_key = None;
    }
}
