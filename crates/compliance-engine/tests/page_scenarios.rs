//! End-to-end placement scenarios over a realistic page text layer

use compliance_engine::{EngineConfig, PageInput, PlacementEngine};
use pretty_assertions::assert_eq;
use shared_types::{ResolutionMethod, Severity, TextFragment, Violation};

const PAGE_HEIGHT: f64 = 842.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn violation(id: &str, severity: Severity, position: &str, context: Option<&str>) -> Violation {
    Violation {
        id: id.to_string(),
        rule_type: "first_line_indent".to_string(),
        severity,
        description: "Первая строка абзаца должна иметь отступ".to_string(),
        expected_value: "1.25 см".to_string(),
        actual_value: "0 см".to_string(),
        position_in_doc: Some(position.to_string()),
        context_text: context.map(str::to_string),
    }
}

fn thesis_page() -> PageInput {
    let fragments = vec![
        TextFragment::new("1 ВВЕДЕНИЕ", 60.0),
        TextFragment::new("Актуальность темы исследования обусловлена ростом", 90.0),
        TextFragment::new("числа студенческих работ, проходящих нормоконтроль.", 105.0),
        TextFragment::new("Цель работы состоит в автоматизации проверки.", 250.0),
        TextFragment::new("Заключение содержит основные выводы по работе.", 700.0),
        TextFragment::new("3", 810.0),
    ];
    PageInput {
        page_number: 1,
        page_height: PAGE_HEIGHT,
        fragments: Some(fragments),
    }
}

fn scenario_violations() -> Vec<Violation> {
    vec![
        violation(
            "101",
            Severity::Error,
            "Page 1, Para 1: Актуальность темы исследования обусловлена...",
            None,
        ),
        violation(
            "102",
            Severity::Warning,
            "Page 1, Para 5: Методика эксперимента описана в разделе три...",
            None,
        ),
        violation(
            "103",
            Severity::Critical,
            "Page 1, Para 9: Заключение содержит основные выводы...",
            None,
        ),
    ]
}

#[test]
fn three_violations_partial_text_match() {
    init_tracing();
    let engine = PlacementEngine::new();
    let violations = scenario_violations();
    let placement = engine.place_page(&thesis_page(), &violations).unwrap();
    assert_eq!(placement.positions.len(), 3);

    let first = placement.get(&violations[0].key()).unwrap();
    let second = placement.get(&violations[1].key()).unwrap();
    let third = placement.get(&violations[2].key()).unwrap();

    assert!(first.method.is_text_match());
    assert!(first.confidence >= 0.9);
    assert_eq!(first.y, 90.0);

    assert!(matches!(
        second.method,
        ResolutionMethod::ParagraphEstimate | ResolutionMethod::DistributeFallback
    ));
    assert!(second.confidence <= 0.5);

    assert!(third.method.is_text_match());
    assert!(third.confidence >= 0.9);
    assert_eq!(third.y, 700.0);

    let min_gap = engine.config().min_gap;
    let ys = [first.y, second.y, third.y];
    for i in 0..ys.len() {
        for j in (i + 1)..ys.len() {
            assert!((ys[i] - ys[j]).abs() >= min_gap, "{:?}", ys);
        }
    }
}

#[test]
fn context_text_equal_to_fragment_is_exact() {
    let engine = PlacementEngine::new();
    let violations = vec![violation(
        "7",
        Severity::Info,
        "Page 1, Para 3: Цель работы...",
        Some("Цель работы состоит в автоматизации проверки."),
    )];
    let placement = engine.place_page(&thesis_page(), &violations).unwrap();
    let pos = placement.get(&violations[0].key()).unwrap();
    assert_eq!(pos.method, ResolutionMethod::ExactMatch);
    assert!(pos.confidence >= 0.9);
    assert_eq!(pos.y, 250.0);
}

#[test]
fn code_like_context_falls_through() {
    let engine = PlacementEngine::new();
    let mut page = thesis_page();
    if let Some(fragments) = page.fragments.as_mut() {
        fragments.push(TextFragment::new("import numpy as np", 400.0));
    }
    let violations = vec![violation(
        "8",
        Severity::Warning,
        "Page 1, Para 7: import numpy as np",
        Some("import numpy as np"),
    )];
    let placement = engine.place_page(&page, &violations).unwrap();
    let pos = placement.get(&violations[0].key()).unwrap();
    assert!(!pos.method.is_text_match());
    assert!(pos.confidence <= 0.5);
}

#[test]
fn many_markers_at_one_point_are_spread() {
    init_tracing();
    let engine = PlacementEngine::new();
    let violations: Vec<Violation> = (0..10)
        .map(|i| {
            violation(
                &format!("m{}", i),
                Severity::Warning,
                "Page 1, Para 3: Цель работы состоит в автоматизации проверки...",
                None,
            )
        })
        .collect();
    let placement = engine.place_page(&thesis_page(), &violations).unwrap();
    assert_eq!(placement.positions.len(), 10);

    let mut ys: Vec<f64> = placement.positions.values().map(|p| p.y).collect();
    ys.sort_by(f64::total_cmp);
    let config = engine.config();
    for pair in ys.windows(2) {
        assert!(pair[1] - pair[0] >= config.min_gap - 1e-6, "{:?}", ys);
    }
    assert!(ys[0] >= config.top_margin);
    assert!(ys[ys.len() - 1] <= PAGE_HEIGHT - config.bottom_margin);
}

#[test]
fn retries_are_idempotent() {
    let engine = PlacementEngine::new();
    let violations = scenario_violations();
    let first = engine.place_page(&thesis_page(), &violations).unwrap();
    let second = engine.place_page(&thesis_page(), &violations).unwrap();
    assert_eq!(first, second);
}

#[test]
fn violations_of_other_pages_are_ignored() {
    let engine = PlacementEngine::new();
    let mut violations = scenario_violations();
    violations.push(violation(
        "200",
        Severity::Error,
        "Page 2, Para 14: Актуальность темы исследования обусловлена...",
        None,
    ));
    let placement = engine.place_page(&thesis_page(), &violations).unwrap();
    assert_eq!(placement.positions.len(), 3);
    assert!(placement.get(&violations[3].key()).is_none());
}

#[test]
fn config_loaded_from_toml_changes_gap() {
    let config = EngineConfig::from_str("min_gap = 40.0").unwrap();
    let engine = PlacementEngine::with_config(config).unwrap();
    let violations: Vec<Violation> = (0..3)
        .map(|i| {
            violation(
                &format!("g{}", i),
                Severity::Info,
                "Page 1, Para 1: Актуальность темы исследования обусловлена...",
                None,
            )
        })
        .collect();
    let placement = engine.place_page(&thesis_page(), &violations).unwrap();
    let mut ys: Vec<f64> = placement.positions.values().map(|p| p.y).collect();
    ys.sort_by(f64::total_cmp);
    assert_eq!(ys, vec![90.0, 130.0, 170.0]);
}
