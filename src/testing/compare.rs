//! Structural comparison of time series
//!
//! Values are compared exactly; no floating point tolerance is applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::datapoint::Sample;

/// One series as returned by a render endpoint, e.g.
/// `{"target": "a.b", "datapoints": [[1, 60], [2, 120]], "tags": {}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Series identity
    pub target: String,
    #[serde(rename = "datapoints", default)]
    pub points: Vec<Sample>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl MetricSeries {
    pub fn new(target: impl Into<String>, points: Vec<Sample>) -> Self {
        Self {
            target: target.into(),
            points,
            tags: BTreeMap::new(),
        }
    }

    /// Distance between the first two timestamps, if there are two points
    ///
    /// Widened to `i128` so any pair of `i64` timestamps has a distance.
    pub fn step(&self) -> Option<i128> {
        match self.points.as_slice() {
            [first, second, ..] => Some(i128::from(second.timestamp) - i128::from(first.timestamp)),
            _ => None,
        }
    }
}

/// A difference between an observed and an expected series
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Mismatch {
    #[error("target mismatch, got '{got}', expected '{expected}'")]
    Target { got: String, expected: String },

    #[error("series '{target}' has unexpected length, got {got}, expected {expected}")]
    Length {
        target: String,
        got: String,
        expected: String,
    },

    #[error("series '{target}' has unexpected step, got {got}, expected {expected}")]
    Step {
        target: String,
        got: i128,
        expected: i128,
    },

    #[error("data in series '{target}' is different, got {got}, expected {expected}")]
    Datapoints {
        target: String,
        got: String,
        expected: String,
    },
}

/// Compare an observed series against the expected one
///
/// Returns an empty list when both are equal. Checks run in order (target,
/// length, step, datapoints) and stop at the first one that differs.
pub fn compare(observed: &MetricSeries, expected: &MetricSeries) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    if observed.target != expected.target {
        mismatches.push(Mismatch::Target {
            got: observed.target.clone(),
            expected: expected.target.clone(),
        });
        return mismatches;
    }

    if observed.points.len() != expected.points.len() {
        mismatches.push(Mismatch::Length {
            target: expected.target.clone(),
            got: render_points(&observed.points),
            expected: render_points(&expected.points),
        });
        return mismatches;
    }

    if let (Some(got), Some(want)) = (observed.step(), expected.step()) {
        if got != want {
            mismatches.push(Mismatch::Step {
                target: expected.target.clone(),
                got,
                expected: want,
            });
            return mismatches;
        }
    }

    let diverges = observed
        .points
        .iter()
        .zip(&expected.points)
        .any(|(o, e)| !same_value(o.value, e.value) || o.timestamp != e.timestamp);
    if diverges {
        mismatches.push(Mismatch::Datapoints {
            target: expected.target.clone(),
            got: render_points(&observed.points),
            expected: render_points(&expected.points),
        });
    }

    mismatches
}

// NaN only ever equals NaN so that a series always equals itself
fn same_value(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn render_points(points: &[Sample]) -> String {
    let rendered: Vec<String> = points.iter().map(Sample::encode).collect();
    format!("[{}]", rendered.join(","))
}
