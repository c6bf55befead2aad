//! Count-based precision, recall and F1.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::elements::{extract_elements, AccuracyElement, ElementKind};
use crate::error::Result;

/// Scores for one element kind, or overall.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl TypeScore {
    /// Build scores from raw counts.
    ///
    /// With nothing expected and nothing detected the result is perfect.
    pub fn from_counts(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        if true_positives + false_positives + false_negatives == 0 {
            return Self {
                precision: 1.0,
                recall: 1.0,
                f1: 1.0,
                ..Default::default()
            };
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(true_positives, true_positives + false_positives);
        let recall = ratio(true_positives, true_positives + false_negatives);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1,
            true_positives,
            false_positives,
            false_negatives,
        }
    }
}

/// Per-kind and overall scores.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyReport {
    pub per_type: BTreeMap<ElementKind, TypeScore>,
    pub overall: TypeScore,
}

impl AccuracyReport {
    /// Overall F1 as a percentage.
    pub fn accuracy(&self) -> f64 {
        self.overall.f1 * 100.0
    }

    pub fn get(&self, kind: ElementKind) -> Option<&TypeScore> {
        self.per_type.get(&kind)
    }
}

/// Score detected elements against expected ones.
///
/// Matching is by count per kind: true positives are `min(detected,
/// expected)`, the excess on either side is a false positive or negative.
pub fn score_elements(expected: &[AccuracyElement], actual: &[AccuracyElement]) -> AccuracyReport {
    let expected_counts = count_by_kind(expected);
    let actual_counts = count_by_kind(actual);

    let mut kinds: Vec<ElementKind> = expected_counts.keys().chain(actual_counts.keys()).copied().collect();
    kinds.sort();
    kinds.dedup();

    let (mut tp_sum, mut fp_sum, mut fn_sum) = (0, 0, 0);
    let mut per_type = BTreeMap::new();

    for kind in kinds {
        let expected = expected_counts.get(&kind).copied().unwrap_or(0);
        let detected = actual_counts.get(&kind).copied().unwrap_or(0);
        let tp = expected.min(detected);
        let fp = detected - tp;
        let fn_ = expected - tp;

        tp_sum += tp;
        fp_sum += fp;
        fn_sum += fn_;
        per_type.insert(kind, TypeScore::from_counts(tp, fp, fn_));
    }

    AccuracyReport {
        per_type,
        overall: TypeScore::from_counts(tp_sum, fp_sum, fn_sum),
    }
}

/// Extract elements from both documents and score them.
pub fn score_markdown(expected: &str, actual: &str) -> Result<AccuracyReport> {
    Ok(score_elements(&extract_elements(expected)?, &extract_elements(actual)?))
}

fn count_by_kind(elements: &[AccuracyElement]) -> BTreeMap<ElementKind, usize> {
    let mut counts = BTreeMap::new();
    for elem in elements {
        *counts.entry(elem.kind).or_insert(0) += 1;
    }
    counts
}
