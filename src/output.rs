//! Summary-table persistence and run-report logging.
//!
//! Tables are written as CSV with a header row; column names follow the
//! input aliases where the table is keyed by an input column.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{CategoryStats, MonthlyMean, ObserverSummary, TypeMean};
use crate::pipeline::RunReport;

/// Logs the run report using Rust's debug pretty-print format.
pub fn print_pretty(report: &RunReport) {
    debug!("{:#?}", report);
}

/// Logs the run report as pretty-printed JSON.
pub fn print_json(report: &RunReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Writes `header` followed by one serialized record per row, replacing any existing file.
pub fn write_table<S, I>(path: &Path, header: &[&str], rows: I) -> Result<usize>
where
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

    writer.write_record(header)?;
    let mut written = 0;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = written, "Summary table written");
    Ok(written)
}

/// `EvalGroup,count,mean,median,std` for the retained groups, in chart order.
pub fn write_grouped_stats(path: &Path, groups: &[CategoryStats]) -> Result<usize> {
    write_table(
        path,
        &["EvalGroup", "count", "mean", "median", "std"],
        groups.iter().map(|g| {
            (
                &g.group,
                g.summary.count,
                g.summary.mean,
                g.summary.median,
                g.summary.std,
            )
        }),
    )
}

/// Mean score per raw evaluation type, headed by the input column names.
pub fn write_type_means(
    path: &Path,
    eval_type_col: &str,
    score_col: &str,
    means: &[TypeMean],
) -> Result<usize> {
    write_table(
        path,
        &[eval_type_col, score_col],
        means.iter().map(|m| (&m.eval_type, m.mean)),
    )
}

/// `Month,<score column>` in chronological order.
pub fn write_monthly_means(path: &Path, score_col: &str, months: &[MonthlyMean]) -> Result<usize> {
    write_table(
        path,
        &["Month", score_col],
        months.iter().map(|m| (&m.month, m.mean)),
    )
}

/// `<observer column>,Mean,Count,Std` for the retained observers.
pub fn write_observer_stats(
    path: &Path,
    observer_col: &str,
    summary: &ObserverSummary,
) -> Result<usize> {
    write_table(
        path,
        &[observer_col, "Mean", "Count", "Std"],
        summary
            .observers
            .iter()
            .map(|o| (&o.observer, o.mean, o.count, o.std)),
    )
}
