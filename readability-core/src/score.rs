//! Score results and parsing of the scoring engine's output
//!
//! The engine prints one `path<sep>score` line per analyzed file, and metric
//! extraction prints `Name: value` lines. Both interleave `[INFO]` logging
//! and a `file` header that must be skipped.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReadabilityError;

/// Opaque output of the scoring engine for one code unit: a readability
/// score in `[0, 1]` plus an optional metric vector. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<BTreeMap<String, f64>>,
}

impl ScoreResult {
    pub fn new(score: f64) -> Self {
        ScoreResult {
            score,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: BTreeMap<String, f64>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn has_metrics(&self) -> bool {
        self.metrics.is_some()
    }

    pub fn metrics(&self) -> Option<&BTreeMap<String, f64>> {
        self.metrics.as_ref()
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.as_ref().and_then(|m| m.get(name).copied())
    }
}

/// The column header before the score lines: its first token is the literal
/// `file`. A snippet whose name merely begins with `file` is payload.
fn is_header_line(line: &str) -> bool {
    line.split(['\t', ' ']).next() == Some("file")
}

fn payload_lines(stdout: &str) -> impl Iterator<Item = &str> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("[INFO]") && !is_header_line(line))
}

/// Parse the readability score from the engine's stdout.
///
/// The score is the last whitespace- or tab-separated token of the first
/// payload line.
pub(crate) fn parse_score_output(stdout: &str, snippet: &Path) -> Result<f64, ReadabilityError> {
    let line = payload_lines(stdout)
        .next()
        .ok_or_else(|| ReadabilityError::Scoring {
            snippet: snippet.to_path_buf(),
            reason: "engine produced no score line".to_string(),
        })?;

    let raw = line.rsplit(['\t', ' ']).next().unwrap_or(line);
    raw.parse::<f64>().map_err(|_| ReadabilityError::Scoring {
        snippet: snippet.to_path_buf(),
        reason: format!("unparsable score line: {line:?}"),
    })
}

/// Parse the metric vector from the metric extractor's stdout.
pub(crate) fn parse_metrics_output(
    stdout: &str,
    snippet: &Path,
) -> Result<BTreeMap<String, f64>, ReadabilityError> {
    let mut metrics = BTreeMap::new();
    for line in payload_lines(stdout) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ReadabilityError::Metrics {
                snippet: snippet.to_path_buf(),
                reason: format!("unparsable metric line: {line:?}"),
            })?;
        let value = value
            .trim()
            .parse::<f64>()
            .map_err(|_| ReadabilityError::Metrics {
                snippet: snippet.to_path_buf(),
                reason: format!("unparsable metric value: {line:?}"),
            })?;
        metrics.insert(name.trim().to_string(), value);
    }
    if metrics.is_empty() {
        return Err(ReadabilityError::Metrics {
            snippet: snippet.to_path_buf(),
            reason: "engine produced no metric lines".to_string(),
        });
    }
    Ok(metrics)
}
