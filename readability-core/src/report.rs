//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Byte-for-byte identical output across runs

use serde::{Deserialize, Serialize};

use crate::pipeline::RatedScope;

/// Rating band used for display, mirroring the gutter-colour thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingBand {
    Poor,     // < 0.33
    Fair,     // 0.33 - 0.66
    Readable, // > 0.66
}

impl RatingBand {
    pub fn from_score(score: f64) -> Self {
        if score < 0.33 {
            RatingBand::Poor
        } else if score > 0.66 {
            RatingBand::Readable
        } else {
            RatingBand::Fair
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingBand::Poor => "poor",
            RatingBand::Fair => "fair",
            RatingBand::Readable => "readable",
        }
    }
}

/// One method's rating in report form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MethodRatingReport {
    pub file: String,
    pub method: String,
    /// 1-indexed start line
    pub line: usize,
    /// 1-indexed inclusive end line
    pub end_line: usize,
    pub score: f64,
    pub band: String,
    pub has_doc_comment: bool,
}

impl MethodRatingReport {
    pub fn new(rated: &RatedScope) -> Self {
        MethodRatingReport {
            file: rated.file().display().to_string(),
            method: rated.method_name().to_string(),
            line: rated.start_line(false),
            end_line: rated.end_line(false),
            score: rated.score(),
            band: RatingBand::from_score(rated.score()).as_str().to_string(),
            has_doc_comment: rated.has_doc_comment(),
        }
    }
}

/// Sort reports deterministically: least readable first, then by file, line,
/// and method name.
pub fn sort_reports(mut reports: Vec<MethodRatingReport>) -> Vec<MethodRatingReport> {
    reports.sort_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.method.cmp(&b.method))
    });
    reports
}

/// Render reports as a fixed-width text table
pub fn render_text(reports: &[MethodRatingReport]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<8} {:<10} {:<30} {:<6} {:<24} {}\n",
        "SCORE", "BAND", "FILE", "LINE", "METHOD", "DOC"
    ));
    for report in reports {
        output.push_str(&format!(
            "{:<8} {:<10} {:<30} {:<6} {:<24} {}\n",
            format!("{:.2}", report.score),
            report.band,
            truncate_or_pad(&report.file, 30),
            report.line,
            truncate_or_pad(&report.method, 24),
            if report.has_doc_comment { "yes" } else { "no" },
        ));
    }
    output
}

/// Render reports as pretty-printed JSON
pub fn render_json(reports: &[MethodRatingReport]) -> String {
    serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
}

/// Truncate or pad string to fixed width, counting chars so multibyte
/// names never split mid-character
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(file: &str, method: &str, line: usize, score: f64) -> MethodRatingReport {
        MethodRatingReport {
            file: file.to_string(),
            method: method.to_string(),
            line,
            end_line: line + 3,
            score,
            band: RatingBand::from_score(score).as_str().to_string(),
            has_doc_comment: false,
        }
    }

    #[test]
    fn bands_follow_the_gutter_thresholds() {
        assert_eq!(RatingBand::from_score(0.1), RatingBand::Poor);
        assert_eq!(RatingBand::from_score(0.33), RatingBand::Fair);
        assert_eq!(RatingBand::from_score(0.66), RatingBand::Fair);
        assert_eq!(RatingBand::from_score(0.9), RatingBand::Readable);
    }

    #[test]
    fn sorting_puts_least_readable_first() {
        let sorted = sort_reports(vec![
            report("B.java", "b", 1, 0.8),
            report("A.java", "a", 1, 0.2),
            report("A.java", "c", 9, 0.2),
        ]);
        assert_eq!(sorted[0].method, "a");
        assert_eq!(sorted[1].method, "c");
        assert_eq!(sorted[2].method, "b");
    }

    #[test]
    fn text_output_is_aligned_and_complete() {
        let text = render_text(&[report("Main.java", "run", 10, 0.4)]);
        assert!(text.starts_with("SCORE"));
        assert!(text.contains("0.40"));
        assert!(text.contains("fair"));
        assert!(text.contains("run"));
    }

    #[test]
    fn long_multibyte_names_truncate_on_char_boundaries() {
        let long_umlaut_path = "ä".repeat(40);
        let text = render_text(&[report(&long_umlaut_path, "größereMethode", 1, 0.5)]);
        assert!(text.contains("ä"));
        assert!(text.contains("..."));

        let truncated = truncate_or_pad(&"ä".repeat(40), 30);
        assert_eq!(truncated.chars().count(), 30);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn json_output_round_trips() {
        let rendered = render_json(&[report("Main.java", "run", 10, 0.4)]);
        let parsed: Vec<MethodRatingReport> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].method, "run");
    }
}
