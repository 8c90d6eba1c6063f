//! Data types produced by the aggregators.

use chrono::NaiveDate;
use serde::Serialize;

/// Count, mean, median and sample standard deviation of a set of scores.
///
/// `std` is `None` when fewer than two scores are present.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: Option<f64>,
}

/// Score counts over equal-width bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

/// Statistics for one evaluation group, with its raw scores kept for the boxplot.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryStats {
    pub group: String,
    pub summary: ScoreSummary,
    pub scores: Vec<f64>,
}

/// Box-and-whisker geometry for one group.
///
/// Whiskers end at the most extreme scores within 1.5 IQR of the box;
/// anything beyond is an outlier.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_lo: f64,
    pub whisker_hi: f64,
    pub outliers: Vec<f64>,
}

/// Mean score for one raw evaluation-type label.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMean {
    pub eval_type: String,
    pub mean: f64,
}

/// Mean score for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMean {
    pub month: String,
    pub month_start: NaiveDate,
    pub mean: f64,
    pub count: usize,
}

/// Per-observer score statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverStats {
    pub observer: String,
    pub mean: f64,
    pub count: usize,
    pub std: Option<f64>,
}

/// Observers meeting the minimum count, ascending by mean, plus the overall reference mean.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverSummary {
    pub observers: Vec<ObserverStats>,
    pub overall_mean: f64,
    pub min_n: usize,
}
