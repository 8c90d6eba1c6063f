use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use super::{FONT, draw_placeholder, figure_size, label_extent};
use crate::analyzers::types::{ObserverStats, ObserverSummary};

const BELOW_COLOR: RGBColor = RGBColor(31, 119, 180);
const ABOVE_COLOR: RGBColor = RGBColor(255, 127, 14);
const REFERENCE_COLOR: RGBColor = RGBColor(128, 128, 128);

const NAME_PX: u32 = 16;
const BAR_HALF_WIDTH: f64 = 0.4;

/// Bar colour: one hue below the overall mean, another at or above it.
pub fn bar_color(summary: &ObserverSummary, stats: &ObserverStats) -> RGBColor {
    if summary.is_below_overall(stats) {
        BELOW_COLOR
    } else {
        ABOVE_COLOR
    }
}

/// Height of the area under the plot: rotated names plus the axis title.
pub fn label_area_height(summary: &ObserverSummary) -> u32 {
    label_extent(summary.observers.iter().map(|o| o.observer.as_str()), NAME_PX) + 60
}

/// Category axis: observer `i` is centred on `x = i`.
pub fn x_range(count: usize) -> (f64, f64) {
    (-0.5, count.max(1) as f64 - 0.5)
}

/// Renders one bar per observer with the overall mean as a reference line.
#[tracing::instrument(skip_all, fields(path = %path.display(), observers = summary.observers.len()))]
pub fn render_observer_bar(path: &Path, summary: &ObserverSummary, title_suffix: &str) -> Result<()> {
    let observers = &summary.observers;
    let label_area = label_area_height(summary);
    let width = (observers.len() as f64 * 0.35).max(12.0);
    let (width_px, plot_px) = figure_size(width, 5.0);
    let root = BitMapBackend::new(path, (width_px, plot_px + label_area)).into_drawing_area();
    root.fill(&WHITE)?;

    let caption = format!(
        "Average Score by Observer (n \u{2265} {}){title_suffix}",
        summary.min_n
    );
    if observers.is_empty() {
        draw_placeholder(&root, &caption, "No observer meets the minimum count")?;
        root.present()?;
        return Ok(());
    }

    let (x_lo, x_hi) = x_range(observers.len());
    let (y_lo, y_hi) = summary.axis_range();

    let mut chart = ChartBuilder::on(&root)
        .caption(&caption, (FONT, 30))
        .margin(20)
        .x_label_area_size(label_area)
        .y_label_area_size(80)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .y_desc("Average Score")
        .x_label_formatter(&|_: &f64| String::new())
        .disable_x_mesh()
        .light_line_style(&BLACK.mix(0.05))
        .bold_line_style(&BLACK.mix(0.15))
        .draw()?;

    chart.draw_series(observers.iter().enumerate().map(|(i, o)| {
        let x = i as f64;
        Rectangle::new(
            [(x - BAR_HALF_WIDTH, y_lo), (x + BAR_HALF_WIDTH, o.mean)],
            bar_color(summary, o).filled(),
        )
    }))?;

    let overall = summary.overall_mean;
    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_lo, overall), (x_hi, overall)],
            10,
            6,
            REFERENCE_COLOR.stroke_width(2),
        ))?
        .label(format!("District Mean = {overall:.2}"))
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], REFERENCE_COLOR.stroke_width(2))
        });

    let label_style = (FONT, 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart.draw_series(observers.iter().enumerate().map(|(i, o)| {
        Text::new(
            format!("{:.2} (n={})", o.mean, o.count),
            (i as f64, o.mean),
            label_style.clone(),
        )
    }))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    // Names run downward from just under each bar.
    let name_style = (FONT, NAME_PX)
        .into_font()
        .transform(FontTransform::Rotate90)
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for (i, o) in observers.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, y_lo));
        root.draw_text(&o.observer, &name_style, (px, py + 8))?;
    }

    let (left, _) = chart.backend_coord(&(x_lo, y_lo));
    let (right, _) = chart.backend_coord(&(x_hi, y_lo));
    let (_, root_height) = root.dim_in_pixel();
    let title_style = (FONT, 20)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    root.draw_text("Observer", &title_style, ((left + right) / 2, root_height as i32 - 10))?;

    root.present()?;
    debug!(overall_mean = overall, "Observer bar chart rendered");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(observer: &str, mean: f64) -> ObserverStats {
        ObserverStats {
            observer: observer.to_string(),
            mean,
            count: 6,
            std: None,
        }
    }

    #[test]
    fn test_bar_color_split_at_overall_mean() {
        let summary = ObserverSummary {
            observers: vec![stats("A", 3.2), stats("B", 3.5), stats("C", 3.8)],
            overall_mean: 3.5,
            min_n: 5,
        };
        assert_eq!(bar_color(&summary, &summary.observers[0]), BELOW_COLOR);
        assert_eq!(bar_color(&summary, &summary.observers[1]), ABOVE_COLOR);
        assert_eq!(bar_color(&summary, &summary.observers[2]), ABOVE_COLOR);
    }

    #[test]
    fn test_one_slot_per_observer() {
        assert_eq!(x_range(3), (-0.5, 2.5));
        assert_eq!(x_range(0), (-0.5, 0.5));
    }

    #[test]
    fn test_label_area_fits_longest_name() {
        let short = ObserverSummary {
            observers: vec![stats("Lee, Sam", 3.0)],
            overall_mean: 3.0,
            min_n: 5,
        };
        let long = ObserverSummary {
            observers: vec![stats("Lee, Sam", 3.0), stats("Montgomery-Whitfield, Alexandra", 3.0)],
            overall_mean: 3.0,
            min_n: 5,
        };
        assert!(label_area_height(&long) > label_area_height(&short));
        assert!(label_area_height(&long) >= 31 * NAME_PX / 2 + 60);
    }

    #[test]
    fn test_render_observer_bar_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observers.png");
        let summary = ObserverSummary {
            observers: vec![stats("Lee, Sam", 3.17), stats("Smith, Ann", 3.58)],
            overall_mean: 3.375,
            min_n: 5,
        };
        render_observer_bar(&path, &summary, " (2023/2024)").unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
