//! Counterfactual metric ranking for readability improvement hints
//!
//! The scoring model is a logistic regression predicting *un*readability;
//! `regress` inverts it. Each metric in the reference mean table is replaced
//! in turn by its "well-readable" mean, and metrics whose replacement raises
//! the score are ranked by the score they would reach.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::ReadabilityError;
use crate::score::ScoreResult;

const INTERCEPT: f64 = -3.8428;

/// Regression coefficients of the readability model, keyed by metric name
const COEFFICIENTS: &[(&str, f64)] = &[
    ("New Commented words MAX", 0.1106),
    ("New Synonym commented words MAX", -0.0625),
    ("New Text Coherence MAX", 0.5508),
    ("BW Avg comparisons", 1.1061),
    ("BW Avg numbers", 0.7925),
    ("BW Avg parenthesis", 0.129),
    ("BW Max line length", 0.0106),
    ("BW Max number of identifiers", 0.054),
    ("BW Max numbers", -0.0941),
    ("Posnett volume", 0.0023),
    ("Dorn DFT Commas", -0.0316),
    ("Dorn DFT Comparisons", -0.0014),
    ("Dorn DFT Keywords", 0.0291),
    ("Dorn DFT LineLengths", -0.032),
    ("Dorn DFT Periods", -0.0332),
    ("Dorn DFT Spaces", -0.0344),
    ("Dorn Visual Y Comments", -0.0475),
    ("Dorn Visual Y Identifiers", 0.1542),
    ("Dorn Visual Y Keywords", -0.065),
    ("Dorn Visual Y Numbers", 0.0092),
    ("Dorn Areas Comments", -0.1018),
    ("Dorn Areas Identifiers", 3.151),
    ("Dorn Areas Keywords/Identifiers", -1.4795),
    ("Dorn align blocks", -0.0092),
];

/// Metric means measured over a corpus of well-readable code
const WELL_READABLE_MEANS: &[(&str, f64)] = &[
    ("New Commented words MAX", 1.8666666666666667),
    ("New Synonym commented words MAX", 12.08),
    ("New Text Coherence MAX", 0.3471257128631813),
    ("BW Avg comparisons", 0.0486999320282494),
    ("BW Avg numbers", 0.16816856124271212),
    ("BW Avg parenthesis", 0.8511882778236841),
    ("BW Max line length", 69.48),
    ("BW Max number of identifiers", 5.906666666666666),
    ("BW Max numbers", 1.5066666666666666),
    ("Posnett volume", 476.6499244890177),
    ("Dorn DFT Commas", 10.973333333333333),
    ("Dorn DFT Comparisons", 9.306666666666667),
    ("Dorn DFT Keywords", 16.36),
    ("Dorn DFT LineLengths", 18.933333333333334),
    ("Dorn DFT Periods", 16.613333333333333),
    ("Dorn DFT Spaces", 14.213333333333333),
    ("Dorn Areas Comments", 0.21825237213856463),
    ("Dorn Areas Identifiers", 0.37966093761625824),
    ("Dorn Areas Keywords/Identifiers", 0.23394542257613102),
    ("Dorn align blocks", 32.44),
];

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn coefficient(name: &str) -> Option<f64> {
    COEFFICIENTS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, value)| *value)
}

/// Readability score for a metric vector under the fixed model.
///
/// Only keys present in both the vector and the coefficient table
/// contribute to the linear combination.
pub fn regress(metrics: &BTreeMap<String, f64>) -> f64 {
    let mut dot_product = 0.0;
    for (name, value) in metrics {
        if let Some(coeff) = coefficient(name) {
            dot_product += value * coeff;
        }
    }
    1.0 - sigmoid(dot_product + INTERCEPT)
}

/// One metric whose replacement by its well-readable mean raises the score
#[derive(Debug, Clone, PartialEq)]
pub struct Improvement {
    pub metric: String,
    /// 1-based position in the ranking
    pub rank: usize,
    /// Measured value, absent when the engine did not emit this metric
    pub actual_value: Option<f64>,
    pub improved_value: f64,
    pub actual_score: f64,
    pub improved_score: f64,
}

impl Improvement {
    /// Score delta this single replacement would yield
    pub fn gain(&self) -> f64 {
        self.improved_score - self.actual_score
    }
}

/// Rank metrics by the counterfactual score gained when each is individually
/// replaced by its well-readable mean. Descending by improved score, stable
/// on ties, 1-based rank; eagerly computed.
///
/// A score result without metrics is a contract violation, not an empty
/// ranking.
pub fn rank_improvements(result: &ScoreResult) -> Result<Vec<Improvement>, ReadabilityError> {
    let metrics = result.metrics().ok_or(ReadabilityError::MissingMetrics)?;
    let baseline = regress(metrics);

    let mut improvements = Vec::new();
    for (name, mean) in WELL_READABLE_MEANS {
        let mut candidate = metrics.clone();
        candidate.insert((*name).to_string(), *mean);
        let improved_score = regress(&candidate);
        if improved_score > baseline {
            improvements.push(Improvement {
                metric: (*name).to_string(),
                rank: 0,
                actual_value: metrics.get(*name).copied(),
                improved_value: *mean,
                actual_score: baseline,
                improved_score,
            });
        }
    }

    improvements.sort_by(|a, b| {
        b.improved_score
            .partial_cmp(&a.improved_score)
            .unwrap_or(Ordering::Equal)
    });
    for (i, improvement) in improvements.iter_mut().enumerate() {
        improvement.rank = i + 1;
    }
    Ok(improvements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics_from(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect()
    }

    #[test]
    fn regress_ignores_unknown_metrics() {
        let with_noise = metrics_from(&[("BW Max line length", 80.0), ("No Such Metric", 1e9)]);
        let without = metrics_from(&[("BW Max line length", 80.0)]);
        assert_eq!(regress(&with_noise), regress(&without));
    }

    #[test]
    fn empty_vector_scores_the_intercept() {
        let expected = 1.0 - sigmoid(INTERCEPT);
        assert!((regress(&BTreeMap::new()) - expected).abs() < 1e-12);
    }

    #[test]
    fn missing_metrics_is_a_contract_error() {
        let result = ScoreResult::new(0.5);
        assert!(matches!(
            rank_improvements(&result),
            Err(ReadabilityError::MissingMetrics)
        ));
    }

    #[test]
    fn only_score_raising_replacements_are_kept() {
        // A very long max line drags the score down (positive coefficient on
        // an unreadability predictor); replacing it with the mean must rank.
        let result = ScoreResult::new(0.2)
            .with_metrics(metrics_from(&[("BW Max line length", 400.0)]));
        let ranked = rank_improvements(&result).unwrap();
        assert!(ranked
            .iter()
            .any(|imp| imp.metric == "BW Max line length"));
        for improvement in &ranked {
            assert!(improvement.improved_score > improvement.actual_score);
            assert!(improvement.gain() > 0.0);
        }
    }

    #[test]
    fn ranking_is_non_increasing_with_one_based_ranks() {
        let result = ScoreResult::new(0.3).with_metrics(metrics_from(&[
            ("BW Max line length", 400.0),
            ("BW Avg comparisons", 3.0),
            ("Dorn Areas Identifiers", 2.0),
            ("Posnett volume", 9000.0),
        ]));
        let ranked = rank_improvements(&result).unwrap();
        assert!(!ranked.is_empty());
        for pair in ranked.windows(2) {
            assert!(pair[0].improved_score >= pair[1].improved_score);
        }
        for (i, improvement) in ranked.iter().enumerate() {
            assert_eq!(improvement.rank, i + 1);
        }
    }

    #[test]
    fn already_ideal_metrics_rank_nothing() {
        let result =
            ScoreResult::new(0.9).with_metrics(metrics_from(WELL_READABLE_MEANS));
        let ranked = rank_improvements(&result).unwrap();
        assert!(ranked.is_empty(), "replacing a mean by itself gains nothing");
    }
}
