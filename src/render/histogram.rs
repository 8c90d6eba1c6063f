use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use super::{FONT, figure_size};
use crate::analyzers::types::{Histogram, ScoreSummary};

const MEAN_COLOR: RGBColor = RGBColor(214, 39, 40);
const MEDIAN_COLOR: RGBColor = RGBColor(255, 165, 0);

/// Bar colour on the viridis scale, proportional to the bin count.
pub fn bin_color(count: usize, max_count: usize) -> RGBColor {
    let fraction = if max_count == 0 {
        0.0
    } else {
        count as f64 / max_count as f64
    };
    ViridisRGB::get_color(fraction)
}

/// Lines of the statistics box drawn in the upper-right corner.
pub fn summary_lines(summary: &ScoreSummary) -> Vec<String> {
    let sd = summary
        .std
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    vec![
        format!("n = {}", summary.count),
        format!("Mean = {:.2}", summary.mean),
        format!("Median = {:.2}", summary.median),
        format!("SD = {sd}"),
    ]
}

/// Renders the score histogram with mean and median markers.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn render_histogram(
    path: &Path,
    hist: &Histogram,
    summary: &ScoreSummary,
    title_suffix: &str,
) -> Result<()> {
    let (width, height) = figure_size(10.0, 5.0);
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_lo = hist.edges.first().copied().unwrap_or(0.0);
    let x_hi = hist.edges.last().copied().unwrap_or(1.0);
    let max_count = hist.max_count();
    let y_hi = (max_count.max(1) as f64 * 1.1).ceil();

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Distribution of Evaluation Scores{title_suffix}"),
            (FONT, 32).into_font().style(FontStyle::Bold),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(80)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Score")
        .y_desc("Count of Observations")
        .light_line_style(&BLACK.mix(0.05))
        .bold_line_style(&BLACK.mix(0.15))
        .draw()?;

    chart.draw_series(hist.bins().map(|(left, right, count)| {
        Rectangle::new(
            [(left, 0.0), (right, count as f64)],
            bin_color(count, max_count).filled(),
        )
    }))?;
    chart.draw_series(hist.bins().filter(|(_, _, c)| *c > 0).map(|(left, right, count)| {
        Rectangle::new([(left, 0.0), (right, count as f64)], WHITE.stroke_width(1))
    }))?;

    if summary.count > 0 {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(summary.mean, 0.0), (summary.mean, y_hi)],
                12,
                6,
                MEAN_COLOR.stroke_width(3),
            ))?
            .label(format!("Mean = {:.2}", summary.mean))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], MEAN_COLOR.stroke_width(3)));

        chart
            .draw_series(DashedLineSeries::new(
                vec![(summary.median, 0.0), (summary.median, y_hi)],
                3,
                4,
                MEDIAN_COLOR.stroke_width(3),
            ))?
            .label(format!("Median = {:.2}", summary.median))
            .legend(|(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], MEDIAN_COLOR.stroke_width(3))
            });

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    // Statistics box, anchored to the top-right of the figure.
    let lines = summary_lines(summary);
    let line_height = 24;
    let box_right = width as i32 - 40;
    let box_left = box_right - 200;
    let box_top = 80;
    let box_bottom = box_top + line_height * lines.len() as i32 + 16;
    root.draw(&Rectangle::new(
        [(box_left, box_top), (box_right, box_bottom)],
        WHITE.mix(0.8).filled(),
    ))?;
    root.draw(&Rectangle::new(
        [(box_left, box_top), (box_right, box_bottom)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;
    let text_style = (FONT, 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Top));
    for (i, line) in lines.iter().enumerate() {
        root.draw_text(
            line,
            &text_style,
            (box_right - 10, box_top + 8 + line_height * i as i32),
        )?;
    }

    root.present()?;
    debug!(bins = hist.counts.len(), max_count, "Histogram rendered");
    Ok(())
}
