//! Overall score distribution.

use crate::analyzers::types::{Histogram, ScoreSummary};
use crate::analyzers::utility::summarize;
use crate::loader::CleanedTable;

/// Number of histogram bins.
pub const HIST_BINS: usize = 20;

/// Summarizes every valid score in the table.
pub fn score_summary(table: &CleanedTable) -> ScoreSummary {
    summarize(&table.scores())
}

impl Histogram {
    /// Bins `values` into `bins` equal-width buckets spanning min..max.
    ///
    /// The last bin is closed on the right. A single-valued sample is
    /// widened to `v - 0.5..v + 0.5`; an empty sample spans `0..1` with zero counts.
    pub fn from_scores(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (mut lo, mut hi) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if values.is_empty() {
            lo = 0.0;
            hi = 1.0;
        } else if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Iterates `(left_edge, right_edge, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| (w[0], w[1], c))
    }
}
