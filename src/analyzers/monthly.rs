//! Mean score per calendar month.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::analyzers::types::MonthlyMean;
use crate::analyzers::utility::mean;
use crate::loader::CleanedTable;

/// Mean score per month, ordered by month-start date.
pub fn monthly_means(table: &CleanedTable) -> Vec<MonthlyMean> {
    let mut months: BTreeMap<(NaiveDate, &str), Vec<f64>> = BTreeMap::new();
    for obs in &table.observations {
        months
            .entry((obs.month_start, obs.month.as_str()))
            .or_default()
            .push(obs.score);
    }

    months
        .into_iter()
        .map(|((month_start, month), scores)| MonthlyMean {
            month: month.to_string(),
            month_start,
            mean: mean(&scores),
            count: scores.len(),
        })
        .collect()
}
