// Severity counts and the fallback document score
use serde::{Deserialize, Serialize};
use shared_types::{CheckResult, Severity, Violation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub critical: u32,
    pub error: u32,
    pub warning: u32,
    pub info: u32,
    pub total: u32,
    /// `100 - (critical*20 + error*5 + warning*2 + info*0.5)`, clamped to 0..=100
    pub score: f64,
}

/// Count violations by severity and compute the local score.
pub fn score(violations: &[Violation]) -> ScoreSummary {
    let mut summary = ScoreSummary::default();
    let mut penalty = 0.0;

    for violation in violations {
        match violation.severity {
            Severity::Critical => summary.critical += 1,
            Severity::Error => summary.error += 1,
            Severity::Warning => summary.warning += 1,
            Severity::Info => summary.info += 1,
        }
        penalty += violation.severity.weight();
    }

    summary.total = violations.len() as u32;
    summary.score = (100.0 - penalty).clamp(0.0, 100.0);
    summary
}

/// Score to display for a check: the backend's when it sent one, the local
/// formula otherwise.
pub fn effective_score(result: &CheckResult) -> f64 {
    match result.score {
        Some(backend) if backend.is_finite() => backend,
        _ => score(&result.violations).score,
    }
}
