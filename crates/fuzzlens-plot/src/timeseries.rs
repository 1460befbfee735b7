//! Line charts over time: panel grids and the cross-run comparison.

use crate::canvas::{extent, padded, render_svg, KeyTicks};
use crate::error::{PlotError, Result};
use crate::style::{font, grid_style, line_color};
use fuzzlens_analysis::compare::CompareChart;
use fuzzlens_analysis::series::{grid_dims, Panel, TickFormat, TimeAxis};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use std::path::Path;

pub const COMPARE_SIZE: (u32, u32) = (1200, 800);

/// How the shared time axis is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    /// Half-hour ticks labelled in hours.
    Hours,
    Seconds,
}

impl TimeUnit {
    fn desc(self) -> &'static str {
        match self {
            TimeUnit::Hours => "Time [h]",
            TimeUnit::Seconds => "Time [s]",
        }
    }
}

/// 700 px per cell plus room for the figure title.
pub fn grid_figure_size(panels: usize) -> (u32, u32) {
    let (rows, cols) = grid_dims(panels);
    (700 * cols as u32, 700 * rows as u32 + 100)
}

/// A near-square grid with one chart per panel, titled `title`.
pub fn draw_panel_grid<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    panels: &[Panel],
    unit: TimeUnit,
) -> Result<()> {
    if panels.is_empty() {
        return Err(PlotError::Empty("no series"));
    }
    let area = area.titled(title, font(28.0))?;
    let cells = area.split_evenly(grid_dims(panels.len()));
    for (cell, panel) in cells.iter().zip(panels) {
        draw_panel(cell, panel, unit)?;
    }
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    unit: TimeUnit,
) -> Result<()> {
    let Some(((_, x_hi), (y_lo, y_hi))) = panel.bounds() else {
        log::debug!("Skipping empty panel '{}'", panel.ylabel);
        return Ok(());
    };
    let times: Vec<f64> = panel
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .collect();
    let axis = TimeAxis::for_times(&times);
    let x_top = x_hi.max(1.0);
    let ticks = match unit {
        TimeUnit::Hours => axis.ticks(),
        TimeUnit::Seconds => {
            let step = x_top / 5.0;
            (0..=5).map(|i| i as f64 * step).collect()
        }
    };
    let format = panel.tick_format;
    let x_axis = KeyTicks::new(0.0..x_top, ticks);
    let x_labels = x_axis.len();

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(x_axis, padded(y_lo, y_hi))?;
    chart
        .configure_mesh()
        .x_labels(x_labels)
        .light_line_style(grid_style())
        .x_desc(unit.desc())
        .y_desc(panel.ylabel.as_str())
        .x_label_formatter(&|x| match unit {
            TimeUnit::Hours => axis.label(*x),
            TimeUnit::Seconds => TickFormat::Plain.format(x.round()),
        })
        .y_label_formatter(&|y| format.format(*y))
        .draw()?;

    for (i, series) in panel.series.iter().enumerate() {
        let style = line_color(i).stroke_width(2);
        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), style))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    if panel.series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .draw()?;
    }
    Ok(())
}

/// One translucent line per run on a log value axis.
///
/// Values at or below zero cannot be placed on the axis and are left out.
pub fn draw_compare_chart<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chart_data: &CompareChart,
) -> Result<()> {
    let visible = |&(x, y): &(f64, f64)| y > 0.0 && chart_data.x_limit.map_or(true, |l| x <= l);
    let (y_lo, y_hi) = extent(
        chart_data
            .series
            .iter()
            .flat_map(|s| s.points.iter().filter(|p| visible(p)).map(|p| p.1)),
    )
    .ok_or(PlotError::Empty("no positive values"))?;
    let x_hi = match chart_data.x_limit {
        Some(limit) => limit,
        None => extent(chart_data.series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
            .map_or(1.0, |(_, hi)| hi),
    }
    .max(1.0);
    let (y_lo, y_hi) = if y_hi > y_lo {
        (y_lo / 1.2, y_hi * 1.2)
    } else {
        (y_lo / 2.0, y_hi * 2.0)
    };

    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_hi, (y_lo..y_hi).log_scale())?;
    chart
        .configure_mesh()
        .light_line_style(grid_style())
        .bold_line_style(BLACK.mix(0.2).stroke_width(1))
        .y_labels(if chart_data.minor_ticks { 20 } else { 10 })
        .x_desc(chart_data.xlabel.as_str())
        .y_desc(chart_data.ylabel.as_str())
        .x_label_formatter(&|x| TickFormat::Plain.format(x.round()))
        .y_label_formatter(&|y| TickFormat::LogDecimals.format(*y))
        .draw()?;

    for (i, series) in chart_data.series.iter().enumerate() {
        let style = line_color(i).mix(0.7).stroke_width(2);
        let points: Vec<(f64, f64)> = series.points.iter().copied().filter(|p| visible(p)).collect();
        chart
            .draw_series(LineSeries::new(points, style))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }
    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;
    Ok(())
}

pub fn save_panel_grid(path: &Path, title: &str, panels: &[Panel], unit: TimeUnit) -> Result<()> {
    render_svg(path, grid_figure_size(panels.len()), |root| {
        draw_panel_grid(root, title, panels, unit)
    })
}

pub fn save_compare_chart(path: &Path, chart: &CompareChart) -> Result<()> {
    render_svg(path, COMPARE_SIZE, |root| draw_compare_chart(root, chart))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_figure_size() {
        assert_eq!(grid_figure_size(7), (2100, 2200));
        assert_eq!(grid_figure_size(1), (700, 800));
    }
}
