//! Orchestrates a single run: load, aggregate, write summaries, render charts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::analyzers::by_category::{grouped_stats, type_means};
use crate::analyzers::by_observer::observer_stats;
use crate::analyzers::distribution::{HIST_BINS, score_summary};
use crate::analyzers::monthly::monthly_means;
use crate::analyzers::types::{
    CategoryStats, Histogram, MonthlyMean, ObserverSummary, ScoreSummary, TypeMean,
};
use crate::category::CategoryNormalizer;
use crate::config::{ColumnAliases, OutputLayout, Thresholds};
use crate::loader::{CleanedTable, LoadStats, load_clean};
use crate::output::{
    write_grouped_stats, write_monthly_means, write_observer_stats, write_type_means,
};
use crate::render;

/// Everything a run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub csv_path: PathBuf,
    pub school_year: Option<String>,
    pub aliases: ColumnAliases,
    pub thresholds: Thresholds,
    pub layout: OutputLayout,
}

/// The four aggregations computed from one cleaned table.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub summary: ScoreSummary,
    pub histogram: Histogram,
    pub groups: Vec<CategoryStats>,
    pub type_means: Vec<TypeMean>,
    pub monthly: Vec<MonthlyMean>,
    pub observers: ObserverSummary,
}

/// What a run did, for logging.
#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub load: LoadStats,
    pub overall: ScoreSummary,
    pub groups_retained: usize,
    pub months: usize,
    pub observers_retained: usize,
    pub figures: Vec<PathBuf>,
    pub summaries: Vec<PathBuf>,
}

/// Computes every aggregation over `table`.
#[tracing::instrument(skip_all, fields(rows = table.len()))]
pub fn aggregate(table: &CleanedTable, thresholds: &Thresholds) -> Aggregates {
    let normalizer = CategoryNormalizer::new();
    let scores = table.scores();

    Aggregates {
        summary: score_summary(table),
        histogram: Histogram::from_scores(&scores, HIST_BINS),
        groups: grouped_stats(table, &normalizer, thresholds.min_group_n),
        type_means: type_means(table),
        monthly: monthly_means(table),
        observers: observer_stats(table, thresholds.min_observer_n),
    }
}

/// Writes the four summary tables and returns their paths.
#[tracing::instrument(skip_all, fields(outputs_dir = %layout.outputs_dir.display()))]
pub fn write_summaries(
    aggs: &Aggregates,
    aliases: &ColumnAliases,
    layout: &OutputLayout,
) -> Result<Vec<PathBuf>> {
    let grouped = layout.grouped_csv();
    write_grouped_stats(&grouped, &aggs.groups)?;

    let types = layout.type_means_csv();
    write_type_means(&types, &aliases.eval_type, &aliases.score, &aggs.type_means)?;

    let monthly = layout.monthly_csv();
    write_monthly_means(&monthly, &aliases.score, &aggs.monthly)?;

    let observers = layout.observer_csv();
    write_observer_stats(&observers, &aliases.observer, &aggs.observers)?;

    Ok(vec![grouped, types, monthly, observers])
}

/// Renders the four charts and returns their paths.
#[tracing::instrument(skip_all, fields(figures_dir = %layout.figures_dir.display()))]
pub fn render_charts(aggs: &Aggregates, layout: &OutputLayout) -> Result<Vec<PathBuf>> {
    let suffix = layout.title_suffix();

    let hist = layout.histogram_png();
    render::render_histogram(&hist, &aggs.histogram, &aggs.summary, &suffix)
        .context("rendering score histogram")?;

    let boxplot = layout.boxplot_png();
    render::render_boxplot(&boxplot, &aggs.groups, &suffix)
        .context("rendering evaluation-type boxplot")?;

    let trend = layout.trend_png();
    render::render_trend(&trend, &aggs.monthly, &suffix).context("rendering monthly trend")?;

    let observers = layout.observer_png();
    render::render_observer_bar(&observers, &aggs.observers, &suffix)
        .context("rendering observer bar chart")?;

    Ok(vec![hist, boxplot, trend, observers])
}

/// Runs the full pipeline.
///
/// A missing date or score column fails before any directory or file is created.
#[tracing::instrument(skip_all, fields(csv = %config.csv_path.display(), school_year = ?config.school_year))]
pub fn run(config: &RunConfig) -> Result<RunReport> {
    let table = load_clean(
        &config.csv_path,
        &config.aliases,
        config.school_year.as_deref(),
    )
    .with_context(|| format!("loading {}", config.csv_path.display()))?;

    config
        .layout
        .ensure_dirs()
        .context("creating output directories")?;

    let aggs = aggregate(&table, &config.thresholds);
    let summaries = write_summaries(&aggs, &config.aliases, &config.layout)?;
    let figures = render_charts(&aggs, &config.layout)?;

    info!(
        observations = table.len(),
        groups = aggs.groups.len(),
        months = aggs.monthly.len(),
        observers = aggs.observers.observers.len(),
        "Pipeline complete"
    );

    Ok(RunReport {
        load: table.stats,
        overall: aggs.summary,
        groups_retained: aggs.groups.len(),
        months: aggs.monthly.len(),
        observers_retained: aggs.observers.observers.len(),
        figures,
        summaries,
    })
}
