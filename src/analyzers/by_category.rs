//! Scores grouped by evaluation type.

use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::types::{BoxSummary, CategoryStats, TypeMean};
use crate::analyzers::utility::{mean, quantile_sorted, summarize};

const WHISKER_IQR: f64 = 1.5;
use crate::category::CategoryNormalizer;
use crate::loader::CleanedTable;

/// Per-group statistics for groups with at least `min_n` observations,
/// sorted ascending by median.
///
/// Rows without an evaluation type are skipped. Groups below the threshold
/// are dropped silently, even if that leaves nothing.
pub fn grouped_stats(
    table: &CleanedTable,
    normalizer: &CategoryNormalizer,
    min_n: usize,
) -> Vec<CategoryStats> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for obs in &table.observations {
        if let Some(raw) = obs.eval_type.as_deref() {
            groups.entry(normalizer.group(raw)).or_default().push(obs.score);
        }
    }

    let total_groups = groups.len();
    let mut stats: Vec<CategoryStats> = groups
        .into_iter()
        .filter(|(_, scores)| scores.len() >= min_n)
        .map(|(group, scores)| CategoryStats {
            group: group.to_string(),
            summary: summarize(&scores),
            scores,
        })
        .collect();

    // Stable sort keeps ties in alphabetical order.
    stats.sort_by(|a, b| a.summary.median.total_cmp(&b.summary.median));

    debug!(total_groups, retained = stats.len(), min_n, "Grouped evaluation types");
    stats
}

impl CategoryStats {
    /// Quartiles, data-bounded whiskers and outliers of the group's scores.
    pub fn box_summary(&self) -> BoxSummary {
        let mut sorted = self.scores.clone();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - WHISKER_IQR * iqr, q3 + WHISKER_IQR * iqr);

        let fenced = |v: &f64| (lo_fence..=hi_fence).contains(v);
        let (inside, outliers): (Vec<f64>, Vec<f64>) = sorted.iter().copied().partition(fenced);

        BoxSummary {
            q1,
            median: quantile_sorted(&sorted, 0.5),
            q3,
            whisker_lo: inside.first().copied().unwrap_or(q1),
            whisker_hi: inside.last().copied().unwrap_or(q3),
            outliers,
        }
    }
}

/// Mean score per raw evaluation-type label, ordered by label.
pub fn type_means(table: &CleanedTable) -> Vec<TypeMean> {
    let mut types: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for obs in &table.observations {
        if let Some(raw) = obs.eval_type.as_deref() {
            types.entry(raw).or_default().push(obs.score);
        }
    }

    types
        .into_iter()
        .map(|(eval_type, scores)| TypeMean {
            eval_type: eval_type.to_string(),
            mean: mean(&scores),
        })
        .collect()
}
