//! Integration tests for the rating pipeline against fixture files

use readability_core::{
    rank_improvements, render_json, render_text, sort_reports, MethodRatingReport, RatedScope,
    RatingPipeline, ReadabilityError, ScopeKind, ScoreResult, ScoringBackend,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Engine stand-in: scores are a pure function of the code text, calls are
/// counted across threads.
struct CountingBackend {
    calls: AtomicUsize,
}

impl CountingBackend {
    fn new() -> Self {
        CountingBackend {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn score_of(code: &str) -> f64 {
        (code.len() % 89) as f64 / 89.0
    }
}

impl ScoringBackend for CountingBackend {
    fn score_code(&self, code: &str, _is_whole_unit: bool) -> Result<ScoreResult, ReadabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ScoreResult::new(Self::score_of(code)))
    }

    fn score_with_metrics(
        &self,
        code: &str,
        _hint: ScopeKind,
    ) -> Result<ScoreResult, ReadabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut metrics = BTreeMap::new();
        metrics.insert("BW Max line length".to_string(), 400.0);
        metrics.insert("BW Avg comparisons".to_string(), code.len() as f64 / 50.0);
        Ok(ScoreResult::new(Self::score_of(code)).with_metrics(metrics))
    }
}

#[test]
fn rating_a_fixture_file_yields_one_scope_per_method() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let rated = pipeline.rate(&fixture_path("Calculator.java")).unwrap();

    assert_eq!(rated.len(), 3);
    assert_eq!(pipeline.backend().calls(), 3);
    let names: Vec<&str> = rated.iter().map(RatedScope::method_name).collect();
    assert_eq!(names, vec!["add", "subtract", "clampedDouble"]);
    assert!(rated[0].has_doc_comment());
    assert!(!rated[1].has_doc_comment());
}

#[test]
fn repeated_rating_of_an_unmodified_file_is_free() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let path = fixture_path("Nested.java");

    let first = pipeline.rate(&path).unwrap();
    let calls_after_first = pipeline.backend().calls();
    let second = pipeline.rate(&path).unwrap();

    assert_eq!(pipeline.backend().calls(), calls_after_first);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.score(), b.score());
        assert_eq!(a.result(), b.result());
    }
}

#[test]
fn duplicate_methods_cost_one_call_and_share_payloads() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let rated = pipeline.rate(&fixture_path("Duplicates.java")).unwrap();

    assert_eq!(rated.len(), 2);
    assert_eq!(pipeline.backend().calls(), 1);
    assert_eq!(rated[0].code(), rated[1].code());
    assert_eq!(rated[0].result(), rated[1].result());
    assert_ne!(rated[0].start_line(true), rated[1].start_line(true));
}

#[test]
fn methodless_files_trigger_nothing() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let rated = pipeline.rate(&fixture_path("NoMethods.java")).unwrap();
    assert!(rated.is_empty());
    assert_eq!(pipeline.backend().calls(), 0);
}

#[test]
fn missing_file_is_a_parse_unavailable_failure() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let err = pipeline.rate(&fixture_path("DoesNotExist.java")).unwrap_err();
    assert!(matches!(err, ReadabilityError::ParseUnavailable { .. }));
}

#[test]
fn worker_cap_of_one_still_produces_ordered_results() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new()).with_workers(Some(1));
    let rated = pipeline.rate(&fixture_path("Calculator.java")).unwrap();
    let names: Vec<&str> = rated.iter().map(RatedScope::method_name).collect();
    assert_eq!(names, vec!["add", "subtract", "clampedDouble"]);
}

#[test]
fn rated_scopes_feed_the_improvement_ranking() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let rated = pipeline.rate(&fixture_path("Calculator.java")).unwrap();

    let ranked = rank_improvements(rated[0].result()).unwrap();
    assert!(!ranked.is_empty(), "a 400-char max line must be improvable");
    for pair in ranked.windows(2) {
        assert!(pair[0].improved_score >= pair[1].improved_score);
    }
    assert_eq!(ranked[0].rank, 1);
}

#[test]
fn reports_render_deterministically_from_rated_scopes() {
    let mut pipeline = RatingPipeline::new(CountingBackend::new());
    let rated = pipeline.rate(&fixture_path("Calculator.java")).unwrap();

    let reports = sort_reports(rated.iter().map(MethodRatingReport::new).collect());
    let text = render_text(&reports);
    for scope in &rated {
        assert!(text.contains(scope.method_name()));
    }

    let json = render_json(&reports);
    let parsed: Vec<MethodRatingReport> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), reports.len());
    let rendered_again = render_json(&sort_reports(parsed));
    assert_eq!(json, rendered_again);
}
