//! Observer agreement: a pie of the overall mean and stacked bars per length.

use crate::canvas::{render_svg, KeyTicks};
use crate::error::{PlotError, Result};
use crate::style::{font, grid_style, inches, OBSERVER_COLORS};
use fuzzlens_analysis::observer::{ObserverAgreement, StackedBar, OBSERVER_LABELS};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_backend::DrawingBackend;
use std::f64::consts::TAU;
use std::path::Path;

pub const PIE_SIZE: (u32, u32) = inches(10, 8);
pub const STACKED_SIZE: (u32, u32) = inches(15, 8);

/// Percentage printed inside a slice.
pub fn slice_label(ratio: f64) -> String {
    format!("{:.5}%", ratio * 100.0)
}

/// Slices start at three o'clock and run counter-clockwise.
pub fn draw_pie<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, ratios: [f64; 4]) -> Result<()> {
    let total: f64 = ratios.iter().sum();
    if total <= 0.0 {
        return Err(PlotError::Empty("observer ratios sum to zero"));
    }
    let area = area.titled("Observer Consistency Analysis", font(22.0))?;
    let (width, height) = area.dim_in_pixel();
    let center = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    let radius = f64::from(width.min(height)) * 0.35;
    let at = |angle: f64, r: f64| -> (i32, i32) {
        (
            (center.0 + r * angle.cos()).round() as i32,
            (center.1 - r * angle.sin()).round() as i32,
        )
    };
    let centered = |size: f64| {
        TextStyle::from(font(size)).pos(Pos::new(HPos::Center, VPos::Center))
    };

    let mut start = 0.0;
    for ((ratio, label), color) in ratios.iter().zip(OBSERVER_LABELS).zip(OBSERVER_COLORS) {
        let sweep = ratio / total * TAU;
        if sweep <= 0.0 {
            continue;
        }
        let steps = ((sweep / TAU) * 180.0).ceil().max(2.0) as usize;
        let mut outline = vec![at(0.0, 0.0)];
        outline.extend((0..=steps).map(|i| at(start + sweep * i as f64 / steps as f64, radius)));
        area.draw(&Polygon::new(outline, color.filled()))?;

        let middle = start + sweep / 2.0;
        area.draw(&Text::new(label.to_string(), at(middle, radius * 1.15), centered(14.0)))?;
        area.draw(&Text::new(
            slice_label(ratio / total),
            at(middle, radius * 0.6),
            centered(12.0),
        ))?;
        start += sweep;
    }
    Ok(())
}

/// The "Avg" bar followed by one bar per input length, widths by sample count.
pub fn draw_stacked_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    bars: &[StackedBar],
) -> Result<()> {
    let lo = bars
        .iter()
        .map(|b| b.position - b.width / 2.0)
        .reduce(f64::min)
        .ok_or(PlotError::Empty("observer bars"))?;
    let hi = bars
        .iter()
        .map(|b| b.position + b.width / 2.0)
        .fold(lo, f64::max);
    let positions: Vec<f64> = bars.iter().map(|b| b.position).collect();
    let label_at = |x: f64| -> String {
        bars.iter()
            .find(|b| (b.position - x).abs() < 1e-6)
            .map(|b| b.label.clone())
            .unwrap_or_default()
    };

    let mut chart = ChartBuilder::on(area)
        .caption("Observer Consistency Analysis by Input Length", font(22.0))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(KeyTicks::new((lo - 0.5)..(hi + 0.5), positions), 0.0..1.05)?;
    chart
        .configure_mesh()
        .x_labels(bars.len())
        .light_line_style(grid_style())
        .x_desc("Input Length (Bar width indicates relative number of samples)")
        .y_desc("Ratio")
        .x_label_formatter(&|x| label_at(*x))
        .draw()?;

    for (category, (label, color)) in OBSERVER_LABELS.iter().zip(OBSERVER_COLORS).enumerate() {
        let style = color.filled();
        chart
            .draw_series(bars.iter().map(|bar| {
                let bottom: f64 = bar.ratios[..category].iter().sum();
                let half = bar.width / 2.0;
                Rectangle::new(
                    [
                        (bar.position - half, bottom),
                        (bar.position + half, bottom + bar.ratios[category]),
                    ],
                    style,
                )
            }))?
            .label(*label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], style));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;
    Ok(())
}

pub fn save_pie(path: &Path, agreement: &ObserverAgreement) -> Result<()> {
    let ratios = agreement
        .overall_mean()
        .ok_or(PlotError::Empty("observer stats"))?;
    render_svg(path, PIE_SIZE, |root| draw_pie(root, ratios))
}

pub fn save_stacked_bars(path: &Path, agreement: &ObserverAgreement) -> Result<()> {
    let bars = agreement.stacked_bars();
    render_svg(path, STACKED_SIZE, |root| draw_stacked_bars(root, &bars))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_label() {
        assert_eq!(slice_label(0.25), "25.00000%");
        assert_eq!(slice_label(1.0 / 3.0), "33.33333%");
    }
}
