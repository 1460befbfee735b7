//! Calibration consistency figures.

use crate::bars::{draw_log_histogram, draw_sample_counts, HistogramLabels};
use crate::canvas::render_svg;
use crate::error::{PlotError, Result};
use crate::ratio::{draw_box_plot, draw_ratio_statistics, draw_violin_plot, RatioBoxes};
use crate::style::{inches, ratio_colors};
use fuzzlens_analysis::consistency::{
    distribution, ConsistencyLog, Distribution, GlobalRanges, RatioKind,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;
use std::path::Path;

pub const RATIO_FIGURE_SIZE: (u32, u32) = inches(20, 40);
pub const SINGLE_RATIO_SIZE: (u32, u32) = inches(10, 10);

/// Pixel size of the distribution figure for `rows` rows.
pub fn distribution_figure_size(rows: usize) -> (u32, u32) {
    (1500, 500 * rows.max(1) as u32)
}

fn histogram_row<DB: DrawingBackend>(
    cells: &[DrawingArea<DB, Shift>],
    prefix: &str,
    dist: &Distribution,
    ranges: &GlobalRanges,
) -> Result<()> {
    let [relative, lengths, filtered] = cells else {
        return Err(PlotError::Draw("distribution row needs three cells".into()));
    };
    let points = |map: &std::collections::BTreeMap<i64, usize>| -> Vec<(f64, usize)> {
        map.iter().map(|(&v, &c)| (v as f64, c)).collect()
    };
    let length_points: Vec<(f64, usize)> =
        dist.lengths.iter().map(|(&v, &c)| (v as f64, c)).collect();

    draw_log_histogram(
        relative,
        HistogramLabels {
            title: &format!("{prefix}Distribution of Relative Consistency Ratios"),
            xlabel: "Difference from First Value",
            ylabel: "Frequency (log scale)",
        },
        &points(&dist.relative),
        (ranges.ratio.0 as f64, ranges.ratio.1 as f64),
    )?;
    draw_log_histogram(
        lengths,
        HistogramLabels {
            title: &format!("{prefix}Distribution of Number of Values per Entry"),
            xlabel: "Number of Values",
            ylabel: "Frequency (log scale)",
        },
        &length_points,
        (ranges.length.0 as f64, ranges.length.1 as f64),
    )?;
    draw_log_histogram(
        filtered,
        HistogramLabels {
            title: &format!("{prefix}Relative Ratios (Lists with ≥2 Entries)"),
            xlabel: "Difference from First Value",
            ylabel: "Frequency (log scale)",
        },
        &points(&dist.filtered),
        (ranges.filtered.0 as f64, ranges.filtered.1 as f64),
    )?;
    Ok(())
}

/// A combined row followed by one row per input length.
pub fn draw_distributions<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    log: &ConsistencyLog,
) -> Result<()> {
    let ranges = log.global_ranges()?;
    let rows = log.by_len.len() + 1;
    let cells = area.split_evenly((rows, 3));

    histogram_row(&cells[0..3], "Combined: ", &log.distribution(), &ranges)?;
    for (row, (len, entries)) in log.by_len.iter().enumerate() {
        let dist = distribution(entries.iter().map(Vec::as_slice));
        let start = (row + 1) * 3;
        histogram_row(
            &cells[start..start + 3],
            &format!("Length {len}: "),
            &dist,
            &ranges,
        )?;
    }
    Ok(())
}

/// Sample counts, violins, boxes and statistics of both ratio kinds, 4×2.
pub fn draw_ratio_grid<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    log: &ConsistencyLog,
) -> Result<()> {
    let ratios = log.error_ratios();
    let lengths = ratios.contiguous_lengths();
    if lengths.is_empty() {
        return Err(PlotError::Empty("no ratio lists with two or more values"));
    }
    let counts = log.sample_counts(&lengths);
    let cells = area.split_evenly((4, 2));

    draw_sample_counts(&cells[0], &lengths, &counts, false)?;
    draw_sample_counts(&cells[1], &lengths, &counts, true)?;

    for (column, kind) in RatioKind::ALL.into_iter().enumerate() {
        let samples = ratios.boxes(&lengths, kind);
        let boxes = RatioBoxes {
            lengths: &lengths,
            samples: &samples,
        };
        let colors = ratio_colors(kind);
        let prefix = kind.title_prefix();
        draw_violin_plot(
            &cells[2 + column],
            Some(&format!("{prefix} Ratio Distribution")),
            boxes,
            colors,
        )?;
        draw_box_plot(
            &cells[4 + column],
            Some(&format!("{prefix} Ratio Box Plot")),
            boxes,
            colors,
        )?;
        draw_ratio_statistics(
            &cells[6 + column],
            &format!("{prefix} Ratio Statistics"),
            boxes,
            colors.edge,
        )?;
    }
    Ok(())
}

/// Which standalone sum-ratio chart to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleRatioChart {
    Box,
    Violin,
}

/// The sum ratio alone, untitled.
pub fn draw_sum_ratio<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    log: &ConsistencyLog,
    chart: SingleRatioChart,
) -> Result<()> {
    let ratios = log.error_ratios();
    let lengths = ratios.contiguous_lengths();
    if lengths.is_empty() {
        return Err(PlotError::Empty("no ratio lists with two or more values"));
    }
    let samples = ratios.boxes(&lengths, RatioKind::Sum);
    let boxes = RatioBoxes {
        lengths: &lengths,
        samples: &samples,
    };
    let colors = ratio_colors(RatioKind::Sum);
    match chart {
        SingleRatioChart::Box => draw_box_plot(area, None, boxes, colors),
        SingleRatioChart::Violin => draw_violin_plot(area, None, boxes, colors),
    }
}

pub fn save_distributions(path: &Path, log: &ConsistencyLog) -> Result<()> {
    let size = distribution_figure_size(log.by_len.len() + 1);
    render_svg(path, size, |root| draw_distributions(root, log))
}

pub fn save_ratio_grid(path: &Path, log: &ConsistencyLog) -> Result<()> {
    render_svg(path, RATIO_FIGURE_SIZE, |root| draw_ratio_grid(root, log))
}

pub fn save_sum_ratio(path: &Path, log: &ConsistencyLog, chart: SingleRatioChart) -> Result<()> {
    render_svg(path, SINGLE_RATIO_SIZE, |root| draw_sum_ratio(root, log, chart))
}
