//! PNG chart rendering.
//!
//! One renderer per aggregation. Figure sizes are given in inches and
//! rasterized at 150 dots per inch.

pub mod boxplot;
pub mod histogram;
pub mod observer_bar;
pub mod trend;

use anyhow::Result;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub use boxplot::render_boxplot;
pub use histogram::render_histogram;
pub use observer_bar::render_observer_bar;
pub use trend::render_trend;

pub const DPI: f64 = 150.0;

const FONT: &str = "sans-serif";

/// Pixel dimensions for a figure of `width` x `height` inches.
pub fn figure_size(width: f64, height: f64) -> (u32, u32) {
    ((width * DPI).round() as u32, (height * DPI).round() as u32)
}

/// Rough pixel width of the widest label at `font_px`, for sizing label areas
/// that hold free-text names.
pub fn label_extent<'a>(labels: impl IntoIterator<Item = &'a str>, font_px: u32) -> u32 {
    let widest = labels.into_iter().map(|l| l.chars().count()).max().unwrap_or(0);
    (widest as f64 * font_px as f64 * 0.6).ceil() as u32
}

/// Fills a chart that has nothing to plot with its title and a short note.
pub(crate) fn draw_placeholder<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    caption: &str,
    message: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let area = root.titled(caption, (FONT, 32))?;
    let (w, h) = area.dim_in_pixel();
    let style = (FONT, 22)
        .into_font()
        .color(&BLACK.mix(0.6))
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw_text(message, &style, (w as i32 / 2, h as i32 / 2))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_size() {
        assert_eq!(figure_size(10.0, 5.0), (1500, 750));
        assert_eq!(figure_size(12.0, 0.45 * 20.0), (1800, 1350));
    }

    #[test]
    fn test_label_extent_tracks_longest_label() {
        assert_eq!(label_extent(["ab", "abcdefghij"], 20), 120);
        assert_eq!(label_extent(Vec::<&str>::new(), 20), 0);
    }
}
