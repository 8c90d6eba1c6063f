use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use super::{FONT, draw_placeholder, figure_size, label_extent};
use crate::analyzers::types::{BoxSummary, CategoryStats};

const BOX_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEAN_MARKER: RGBColor = RGBColor(44, 160, 44);

const BOX_HALF_HEIGHT: f64 = 0.3;
const CAP_HALF_HEIGHT: f64 = 0.15;
const GROUP_LABEL_PX: u32 = 18;

/// Horizontal value range covering every score, with headroom on the right
/// for the per-group count labels.
pub fn value_range(groups: &[CategoryStats]) -> (f64, f64) {
    let (lo, hi) = groups
        .iter()
        .flat_map(|g| g.scores.iter())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }

    let span = (hi - lo).max(1.0);
    (lo - span * 0.05, hi + span * 0.2)
}

/// Whisker lines and their end caps for the box at row `y`.
fn whisker_paths(b: &BoxSummary, y: f64) -> [Vec<(f64, f64)>; 4] {
    [
        vec![(b.whisker_lo, y), (b.q1, y)],
        vec![(b.q3, y), (b.whisker_hi, y)],
        vec![(b.whisker_lo, y - CAP_HALF_HEIGHT), (b.whisker_lo, y + CAP_HALF_HEIGHT)],
        vec![(b.whisker_hi, y - CAP_HALF_HEIGHT), (b.whisker_hi, y + CAP_HALF_HEIGHT)],
    ]
}

/// Renders one horizontal box per group, bottom to top in the given order.
///
/// Group `i` sits on row `y = i`. Outliers are drawn as hollow circles and the
/// group mean as a filled marker.
#[tracing::instrument(skip_all, fields(path = %path.display(), groups = groups.len()))]
pub fn render_boxplot(path: &Path, groups: &[CategoryStats], title_suffix: &str) -> Result<()> {
    let height = (groups.len() as f64 * 0.45).max(6.0);
    let root = BitMapBackend::new(path, figure_size(12.0, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!("Scores by Evaluation Type (Grouped){title_suffix}");
    if groups.is_empty() {
        draw_placeholder(&root, &caption, "No evaluation group meets the minimum count")?;
        root.present()?;
        return Ok(());
    }

    let boxes: Vec<BoxSummary> = groups.iter().map(CategoryStats::box_summary).collect();
    let (x_lo, x_hi) = value_range(groups);
    let y_hi = groups.len() as f64 - 0.5;
    let name_width = label_extent(groups.iter().map(|g| g.group.as_str()), GROUP_LABEL_PX);

    let mut chart = ChartBuilder::on(&root)
        .caption(&caption, (FONT, 30))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(name_width + 60)
        .build_cartesian_2d(x_lo..x_hi, -0.5..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Score")
        .y_desc("Evaluation Type (Grouped)")
        .y_label_formatter(&|_: &f64| String::new())
        .disable_y_mesh()
        .light_line_style(&BLACK.mix(0.05))
        .bold_line_style(&BLACK.mix(0.15))
        .draw()?;

    chart.draw_series(boxes.iter().enumerate().map(|(i, b)| {
        let y = i as f64;
        Rectangle::new(
            [(b.q1, y - BOX_HALF_HEIGHT), (b.q3, y + BOX_HALF_HEIGHT)],
            BOX_COLOR.mix(0.25).filled(),
        )
    }))?;
    chart.draw_series(boxes.iter().enumerate().map(|(i, b)| {
        let y = i as f64;
        Rectangle::new(
            [(b.q1, y - BOX_HALF_HEIGHT), (b.q3, y + BOX_HALF_HEIGHT)],
            BOX_COLOR.stroke_width(2),
        )
    }))?;
    chart.draw_series(boxes.iter().enumerate().flat_map(|(i, b)| {
        let y = i as f64;
        let median = vec![(b.median, y - BOX_HALF_HEIGHT), (b.median, y + BOX_HALF_HEIGHT)];
        std::iter::once(median)
            .chain(whisker_paths(b, y))
            .map(|points| PathElement::new(points, BOX_COLOR.stroke_width(2)))
    }))?;
    chart.draw_series(boxes.iter().enumerate().flat_map(|(i, b)| {
        let y = i as f64;
        b.outliers
            .iter()
            .map(move |&v| Circle::new((v, y), 5, BOX_COLOR.stroke_width(2)))
    }))?;

    chart.draw_series(groups.iter().enumerate().map(|(i, g)| {
        Circle::new((g.summary.mean, i as f64), 6, MEAN_MARKER.filled())
    }))?;

    let count_style = (FONT, 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    chart.draw_series(groups.iter().enumerate().map(|(i, g)| {
        Text::new(
            format!("n={}", g.summary.count),
            (x_hi, i as f64),
            count_style.clone(),
        )
    }))?;

    // Group names go just left of the plot area, one per row.
    let name_style = (FONT, GROUP_LABEL_PX)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (i, g) in groups.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(x_lo, i as f64));
        root.draw_text(&g.group, &name_style, (px - 10, py))?;
    }

    root.present()?;
    debug!("Boxplot rendered");
    Ok(())
}
