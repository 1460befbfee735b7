//! Frequency histograms and per-length sample counts.

use crate::canvas::extent;
use crate::error::{PlotError, Result};
use crate::style::{font, grid_style, BAR, GRAY};
use fuzzlens_analysis::series::TickFormat;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;

const BAR_HALF_WIDTH: f64 = 0.4;
/// Baseline of bars on a logarithmic count axis.
const LOG_FLOOR: f64 = 0.5;

/// Labels of one histogram panel.
#[derive(Debug, Clone, Copy)]
pub struct HistogramLabels<'a> {
    pub title: &'a str,
    pub xlabel: &'a str,
    pub ylabel: &'a str,
}

/// Bars of `(value, count)` pairs on a log count axis, over a fixed x range.
pub fn draw_log_histogram<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    labels: HistogramLabels<'_>,
    frequencies: &[(f64, usize)],
    x_range: (f64, f64),
) -> Result<()> {
    let max_count = frequencies.iter().map(|&(_, c)| c).max().unwrap_or(1).max(1);
    let y_top = (max_count as f64 * 2.0).max(2.0);
    let x_axis = (x_range.0 - 1.0)..(x_range.1 + 1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(labels.title, font(16.0))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_axis, (LOG_FLOOR..y_top).log_scale())?;

    chart
        .configure_mesh()
        .light_line_style(grid_style())
        .x_desc(labels.xlabel)
        .y_desc(labels.ylabel)
        .x_label_formatter(&|x| TickFormat::Plain.format(*x))
        .y_label_formatter(&|y| TickFormat::LogDecimals.format(*y))
        .draw()?;

    chart.draw_series(
        frequencies
            .iter()
            .filter(|&&(_, count)| count > 0)
            .map(|&(value, count)| {
                Rectangle::new(
                    [
                        (value - BAR_HALF_WIDTH, LOG_FLOOR),
                        (value + BAR_HALF_WIDTH, count as f64),
                    ],
                    BAR.filled(),
                )
            }),
    )?;
    Ok(())
}

/// Number of samples per input length, on a linear or log axis.
pub fn draw_sample_counts<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    lengths: &[u32],
    counts: &[usize],
    log_scale: bool,
) -> Result<()> {
    let (lo, hi) = extent(lengths.iter().map(|&l| f64::from(l)))
        .ok_or(PlotError::Empty("sample counts"))?;
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let x_axis = (lo - 1.0)..(hi + 1.0);
    let bars = lengths.iter().zip(counts).map(|(&len, &count)| {
        (f64::from(len), count as f64)
    });
    let style = GRAY.mix(0.7).filled();

    if log_scale {
        let mut chart = ChartBuilder::on(area)
            .caption("Number of Samples per Input Length (Log Scale)", font(18.0))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_axis, (LOG_FLOOR..max_count * 2.0).log_scale())?;
        chart
            .configure_mesh()
            .light_line_style(grid_style())
            .x_desc("Input Length")
            .y_desc("Number of Samples")
            .y_label_formatter(&|y| TickFormat::LogDecimals.format(*y))
            .draw()?;
        chart.draw_series(bars.filter(|&(_, c)| c > 0.0).map(|(x, c)| {
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, LOG_FLOOR), (x + BAR_HALF_WIDTH, c)],
                style,
            )
        }))?;
    } else {
        let mut chart = ChartBuilder::on(area)
            .caption("Number of Samples per Input Length", font(18.0))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_axis, 0.0..max_count * 1.05)?;
        chart
            .configure_mesh()
            .light_line_style(grid_style())
            .x_desc("Input Length")
            .y_desc("Number of Samples")
            .y_label_formatter(&|y| TickFormat::Plain.format(*y))
            .draw()?;
        chart.draw_series(bars.map(|(x, c)| {
            Rectangle::new([(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, c)], style)
        }))?;
    }
    Ok(())
}
