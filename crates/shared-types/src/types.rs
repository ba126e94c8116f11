use serde::{Deserialize, Deserializer};

/// One checked document as returned by the backend check/history endpoints.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CheckResult {
    #[serde(default, deserialize_with = "opaque_id_opt")]
    pub document_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
    /// Authoritative score computed by the backend, when it sent one.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub checked_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A single formatting deviation reported by the checker backend.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub rule_type: String, // e.g. "margin_left", "font_name", "table_caption"
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_value: String,
    #[serde(default)]
    pub actual_value: String,
    /// Locator of the form `"Page <N>, Para <M>: <leading text>..."`.
    #[serde(default)]
    pub position_in_doc: Option<String>,
    /// Longer verbatim excerpt; preferred over the locator excerpt when usable.
    #[serde(default)]
    pub context_text: Option<String>,
}

impl Violation {
    /// Marker key: id plus locator. Two violations with the same key are the
    /// same marker on a page.
    pub fn key(&self) -> String {
        format!("{}{}", self.id, self.position_in_doc.as_deref().unwrap_or(""))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Parse a backend severity string. Unknown values count as `Error`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "warning" => Severity::Warning,
            "info" => Severity::Info,
            _ => Severity::Error,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Penalty subtracted from 100 per violation of this severity.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Critical => 20.0,
            Severity::Error => 5.0,
            Severity::Warning => 2.0,
            Severity::Info => 0.5,
        }
    }

    /// Legend colour used for markers and sidebar badges.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Critical => "#d32f2f",
            Severity::Error => "#f57c00",
            Severity::Warning => "#fbc02d",
            Severity::Info => "#1976d2",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Severity::parse(&raw))
    }
}

/// One atomic run of rendered text. `y` is measured from the top of the page.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextFragment {
    pub text: String,
    pub y: f64,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, y: f64) -> Self {
        Self {
            text: text.into(),
            y,
            x: None,
            width: None,
            height: None,
        }
    }
}

/// Which step of the resolution cascade produced a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    ExactMatch,
    TextSearch,
    FragmentSpan,
    KeywordMatch,
    ParagraphEstimate,
    DistributeFallback,
}

impl ResolutionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionMethod::ExactMatch => "exact_match",
            ResolutionMethod::TextSearch => "text_search",
            ResolutionMethod::FragmentSpan => "fragment_span",
            ResolutionMethod::KeywordMatch => "keyword_match",
            ResolutionMethod::ParagraphEstimate => "paragraph_estimate",
            ResolutionMethod::DistributeFallback => "distribute_fallback",
        }
    }

    /// True for the two levels that found the query verbatim in the page text.
    pub fn is_text_match(&self) -> bool {
        matches!(
            self,
            ResolutionMethod::ExactMatch | ResolutionMethod::TextSearch
        )
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResolvedPosition {
    pub key: String,
    pub y: f64,
    pub confidence: f64,
    pub method: ResolutionMethod,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OpaqueId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<OpaqueId> for String {
    fn from(id: OpaqueId) -> Self {
        match id {
            OpaqueId::Text(s) => s,
            OpaqueId::Int(n) => n.to_string(),
            OpaqueId::Float(n) => n.to_string(),
        }
    }
}

// Backend ids are sometimes numeric, sometimes UUID strings.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    OpaqueId::deserialize(deserializer).map(String::from)
}

fn opaque_id_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<OpaqueId>::deserialize(deserializer)?.map(String::from))
}
