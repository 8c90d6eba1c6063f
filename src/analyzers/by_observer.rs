//! Scores grouped by observer.

use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzers::types::{ObserverStats, ObserverSummary};
use crate::analyzers::utility::{mean, sample_stddev};
use crate::loader::CleanedTable;

/// Lower bound the observer axis never rises above.
const AXIS_FLOOR: f64 = 3.0;
/// Upper bound the observer axis never drops below.
const AXIS_CEILING: f64 = 4.0;
const AXIS_MARGIN: f64 = 0.1;

/// Per-observer statistics for observers with at least `min_n` observations,
/// ascending by mean. The overall mean covers every valid observation,
/// including those without an observer.
pub fn observer_stats(table: &CleanedTable, min_n: usize) -> ObserverSummary {
    let mut by_observer: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for obs in &table.observations {
        if let Some(observer) = obs.observer.as_deref() {
            by_observer.entry(observer).or_default().push(obs.score);
        }
    }

    let total_observers = by_observer.len();
    let mut observers: Vec<ObserverStats> = by_observer
        .into_iter()
        .filter(|(_, scores)| scores.len() >= min_n)
        .map(|(observer, scores)| {
            let avg = mean(&scores);
            ObserverStats {
                observer: observer.to_string(),
                mean: avg,
                count: scores.len(),
                std: sample_stddev(&scores, avg),
            }
        })
        .collect();
    observers.sort_by(|a, b| a.mean.total_cmp(&b.mean));

    debug!(total_observers, retained = observers.len(), min_n, "Grouped observers");

    ObserverSummary {
        observers,
        overall_mean: mean(&table.scores()),
        min_n,
    }
}

impl ObserverSummary {
    /// Vertical axis range: small differences between observers stay legible
    /// while the 3.0..4.0 band is always visible.
    pub fn axis_range(&self) -> (f64, f64) {
        let (lo, hi) = self
            .observers
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), o| {
                (lo.min(o.mean), hi.max(o.mean))
            });

        if self.observers.is_empty() {
            return (AXIS_FLOOR, AXIS_CEILING);
        }
        (
            AXIS_FLOOR.min(lo - AXIS_MARGIN),
            AXIS_CEILING.max(hi + AXIS_MARGIN),
        )
    }

    pub fn is_below_overall(&self, stats: &ObserverStats) -> bool {
        stats.mean < self.overall_mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Observation;
    use chrono::NaiveDate;

    fn table(rows: &[(&str, f64)]) -> CleanedTable {
        let at = NaiveDate::from_ymd_opt(2023, 10, 5)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut table = CleanedTable::default();
        for (observer, score) in rows {
            let mut obs = Observation::new(at, *score);
            obs.observer = Some(observer.to_string());
            table.observations.push(obs);
        }
        table
    }

    #[test]
    fn test_threshold_and_mean_order() {
        let mut rows = vec![("Zed", 3.9); 6];
        rows.extend(vec![("Amy", 3.1); 6]);
        rows.extend(vec![("Bob", 1.0); 2]);
        let summary = observer_stats(&table(&rows), 5);

        let names: Vec<_> = summary.observers.iter().map(|o| o.observer.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Zed"]);
        assert_eq!(summary.observers[0].count, 6);
        assert_eq!(summary.observers[0].std, Some(0.0));

        let expected_overall = (3.9 * 6.0 + 3.1 * 6.0 + 2.0) / 14.0;
        assert!((summary.overall_mean - expected_overall).abs() < 1e-12);
        assert!(summary.is_below_overall(&summary.observers[0]));
        assert!(!summary.is_below_overall(&summary.observers[1]));
    }

    #[test]
    fn test_threshold_above_group_size_excludes_all() {
        let mut rows = vec![("A", 3.0); 6];
        rows.extend(vec![("B", 4.0); 6]);
        assert_eq!(observer_stats(&table(&rows), 6).observers.len(), 2);
        assert!(observer_stats(&table(&rows), 7).observers.is_empty());
    }

    #[test]
    fn test_axis_range_clamps() {
        let rows = vec![("A", 3.5); 5];
        assert_eq!(observer_stats(&table(&rows), 5).axis_range(), (3.0, 4.0));

        let mut rows = vec![("A", 2.5); 5];
        rows.extend(vec![("B", 4.5); 5]);
        let (lo, hi) = observer_stats(&table(&rows), 5).axis_range();
        assert!((lo - 2.4).abs() < 1e-12);
        assert!((hi - 4.6).abs() < 1e-12);
    }

    #[test]
    fn test_axis_range_without_observers() {
        let summary = observer_stats(&CleanedTable::default(), 5);
        assert_eq!(summary.axis_range(), (3.0, 4.0));
        assert_eq!(summary.overall_mean, 0.0);
    }
}
