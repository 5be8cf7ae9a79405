//! Progress statistics over evaluation history
//!
//! Records without a score are skipped entirely: they neither pull the average
//! down nor anchor the first/last delta.

use crate::types::EvaluationRecord;
use serde::Serialize;

/// Aggregate view of scored history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    /// Scores in chronological order (oldest first)
    pub scores: Vec<u16>,
    /// Mean of `scores`; `None` when nothing has been scored
    pub average: Option<f64>,
    /// Latest score minus the first score; `None` when nothing has been scored
    pub delta: Option<i64>,
    /// Total records considered, scored or not
    pub count: usize,
}

impl TrendSummary {
    /// Build from records in `list_all` order (newest first)
    pub fn from_records(records: &[EvaluationRecord]) -> Self {
        let scores: Vec<u16> = records.iter().rev().filter_map(|r| r.score).collect();
        Self::from_chronological_scores(scores, records.len())
    }

    fn from_chronological_scores(scores: Vec<u16>, count: usize) -> Self {
        let average = if scores.is_empty() {
            None
        } else {
            let sum: u64 = scores.iter().map(|&s| u64::from(s)).sum();
            Some(sum as f64 / scores.len() as f64)
        };

        let delta = match (scores.first(), scores.last()) {
            (Some(&first), Some(&last)) => Some(i64::from(last) - i64::from(first)),
            _ => None,
        };

        Self {
            scores,
            average,
            delta,
            count,
        }
    }

    /// Average with one decimal place, e.g. `81.7`
    pub fn display_average(&self) -> Option<String> {
        self.average.map(|avg| format!("{:.1}", avg))
    }

    /// Delta with sign, e.g. `+20`
    pub fn display_delta(&self) -> Option<String> {
        self.delta.map(|d| format!("{:+}", d))
    }
}
