use std::path::Path;

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use plotters::prelude::*;
use tracing::debug;

use super::{FONT, draw_placeholder, figure_size};
use crate::analyzers::types::MonthlyMean;

const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Months since year 0, so consecutive months are consecutive integers.
pub fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

/// `YYYY-MM` label for a month index.
pub fn month_label(index: i32) -> String {
    format!("{}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}

/// Month-index axis with one empty month on each side.
pub fn month_range(months: &[MonthlyMean]) -> Option<(i32, i32)> {
    let first = months.iter().map(|m| month_index(m.month_start)).min()?;
    let last = months.iter().map(|m| month_index(m.month_start)).max()?;
    Some((first - 1, last + 1))
}

/// Score axis around the monthly means.
pub fn score_range(months: &[MonthlyMean]) -> (f64, f64) {
    let (lo, hi) = months
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
            (lo.min(m.mean), hi.max(m.mean))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.1).max(0.1);
    (lo - pad, hi + pad)
}

/// Renders mean score per month as a line with markers.
#[tracing::instrument(skip_all, fields(path = %path.display(), months = months.len()))]
pub fn render_trend(path: &Path, months: &[MonthlyMean], title_suffix: &str) -> Result<()> {
    let root = BitMapBackend::new(path, figure_size(11.0, 5.0)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!("Average Score by Month{title_suffix}");
    let Some((x_lo, x_hi)) = month_range(months) else {
        draw_placeholder(&root, &caption, "No observations")?;
        root.present()?;
        return Ok(());
    };
    let (y_lo, y_hi) = score_range(months);

    let mut chart = ChartBuilder::on(&root)
        .caption(&caption, (FONT, 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Average Score")
        .x_labels((x_hi - x_lo + 1) as usize)
        .x_label_formatter(&|i: &i32| month_label(*i))
        .light_line_style(&BLACK.mix(0.05))
        .bold_line_style(&BLACK.mix(0.15))
        .draw()?;

    let points: Vec<(i32, f64)> = months
        .iter()
        .map(|m| (month_index(m.month_start), m.mean))
        .collect();
    chart.draw_series(LineSeries::new(points.clone(), LINE_COLOR.stroke_width(3)))?;
    chart.draw_series(
        points
            .into_iter()
            .map(|p| Circle::new(p, 6, LINE_COLOR.filled())),
    )?;

    root.present()?;
    debug!("Monthly trend rendered");
    Ok(())
}
