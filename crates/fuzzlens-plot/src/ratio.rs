//! Error-ratio views per input length: violins, boxes, median/mean lines and scatter.
//!
//! Samples are placed at index positions `1..=n`, labelled with their input
//! length, so gaps in the length range keep their slot.

use crate::canvas::{dashes, extent, padded, runs, KeyTicks};
use crate::error::{PlotError, Result};
use crate::style::{font, grid_style, RatioColors};
use fuzzlens_analysis::stats::{mean, median, BoxStats, ViolinStats, VIOLIN_POINTS};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::DrawingBackend;

const BOX_WIDTH: f64 = 0.6;
const VIOLIN_HALF_WIDTH: f64 = 0.35;

/// Samples grouped by input length, one slot per length.
#[derive(Debug, Clone, Copy)]
pub struct RatioBoxes<'a> {
    pub lengths: &'a [u32],
    pub samples: &'a [Vec<f64>],
}

impl RatioBoxes<'_> {
    fn positions(&self) -> Vec<f64> {
        (1..=self.lengths.len()).map(|i| i as f64).collect()
    }

    fn label(&self, position: f64) -> String {
        let index = position.round();
        if (position - index).abs() > 1e-6 || index < 1.0 {
            return String::new();
        }
        self.lengths
            .get(index as usize - 1)
            .map(u32::to_string)
            .unwrap_or_default()
    }

    fn value_range(&self) -> Result<std::ops::Range<f64>> {
        let (lo, hi) = extent(self.samples.iter().flatten().copied())
            .ok_or(PlotError::Empty("ratio samples"))?;
        Ok(padded(lo, hi))
    }

    fn x_axis(&self) -> KeyTicks {
        KeyTicks::new(0.5..(self.lengths.len() as f64 + 0.5), self.positions())
    }
}

/// `None` leaves the caption off.
pub fn draw_box_plot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: Option<&str>,
    boxes: RatioBoxes<'_>,
    colors: RatioColors,
) -> Result<()> {
    let mut builder = ChartBuilder::on(area);
    if let Some(title) = title {
        builder.caption(title, font(18.0));
    }
    let mut chart = builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(boxes.x_axis(), boxes.value_range()?)?;
    configure_ratio_mesh(&mut chart, &boxes)?;

    let half = BOX_WIDTH / 2.0;
    let edge = colors.edge.stroke_width(1);
    for (x, sample) in boxes.positions().into_iter().zip(boxes.samples) {
        let Some(stats) = BoxStats::from_values(sample) else {
            continue;
        };
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - half, stats.q1), (x + half, stats.q3)],
            colors.fill.filled(),
        )))?;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - half, stats.q1), (x + half, stats.q3)],
            edge,
        )))?;
        let quarter = half / 2.0;
        chart.draw_series(
            [
                vec![(x - half, stats.median), (x + half, stats.median)],
                vec![(x, stats.q1), (x, stats.whisker_low)],
                vec![(x, stats.q3), (x, stats.whisker_high)],
                vec![(x - quarter, stats.whisker_low), (x + quarter, stats.whisker_low)],
                vec![(x - quarter, stats.whisker_high), (x + quarter, stats.whisker_high)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, edge)),
        )?;
        chart.draw_series(
            stats
                .outliers
                .iter()
                .map(|&y| Circle::new((x, y), 3, BLACK.stroke_width(1))),
        )?;
    }
    Ok(())
}

/// Kernel density outlines with mean and median markers.
pub fn draw_violin_plot<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: Option<&str>,
    boxes: RatioBoxes<'_>,
    colors: RatioColors,
) -> Result<()> {
    let mut builder = ChartBuilder::on(area);
    if let Some(title) = title {
        builder.caption(title, font(18.0));
    }
    let mut chart = builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(boxes.x_axis(), boxes.value_range()?)?;
    configure_ratio_mesh(&mut chart, &boxes)?;

    let edge = colors.edge.stroke_width(1);
    let accent = colors.accent.stroke_width(2);
    let cap = VIOLIN_HALF_WIDTH / 2.0;
    for (x, sample) in boxes.positions().into_iter().zip(boxes.samples) {
        let Some(violin) = ViolinStats::from_values(sample, VIOLIN_POINTS) else {
            continue;
        };
        let max_density = violin.max_density();
        if violin.coords.len() > 1 && max_density > 0.0 {
            let right = violin
                .coords
                .iter()
                .zip(&violin.density)
                .map(|(&y, &d)| (x + d / max_density * VIOLIN_HALF_WIDTH, y));
            let left = violin
                .coords
                .iter()
                .zip(&violin.density)
                .rev()
                .map(|(&y, &d)| (x - d / max_density * VIOLIN_HALF_WIDTH, y));
            let outline: Vec<(f64, f64)> = right.chain(left).collect();
            chart.draw_series(std::iter::once(Polygon::new(
                outline.clone(),
                colors.fill.mix(0.7).filled(),
            )))?;
            let mut closed = outline;
            if let Some(&first) = closed.first() {
                closed.push(first);
            }
            chart.draw_series(std::iter::once(PathElement::new(closed, edge)))?;
        }
        chart.draw_series(
            [
                vec![(x, violin.min), (x, violin.max)],
                vec![(x - cap, violin.min), (x + cap, violin.min)],
                vec![(x - cap, violin.max), (x + cap, violin.max)],
                vec![(x - cap, violin.mean), (x + cap, violin.mean)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, edge)),
        )?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - cap, violin.median), (x + cap, violin.median)],
            accent,
        )))?;
    }
    Ok(())
}

/// Median (solid) and mean (dashed) per length; empty lengths leave gaps.
pub fn draw_ratio_statistics<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    boxes: RatioBoxes<'_>,
    color: RGBColor,
) -> Result<()> {
    let positions = boxes.positions();
    let medians: Vec<Option<f64>> = boxes.samples.iter().map(|s| median(s)).collect();
    let means: Vec<Option<f64>> = boxes.samples.iter().map(|s| mean(s)).collect();
    let (lo, hi) = extent(medians.iter().chain(&means).flatten().copied())
        .ok_or(PlotError::Empty("ratio statistics"))?;

    let mut chart = ChartBuilder::on(area)
        .caption(title, font(18.0))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(boxes.x_axis(), padded(lo, hi))?;
    configure_ratio_mesh(&mut chart, &boxes)?;

    let solid = color.stroke_width(2);
    for (i, run) in runs(&medians, &positions).into_iter().enumerate() {
        let series = chart.draw_series(LineSeries::new(run, solid))?;
        if i == 0 {
            series
                .label("Median")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], solid));
        }
    }
    for (i, run) in runs(&means, &positions).into_iter().enumerate() {
        let series = chart.draw_series(
            dashes(&run, 3)
                .into_iter()
                .map(|segment| PathElement::new(segment.to_vec(), solid)),
        )?;
        if i == 0 {
            series.label("Mean").legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 8, y)], solid)
            });
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;
    Ok(())
}

/// Every ratio against its input length.
pub fn draw_ratio_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    title: &str,
    lens: &[u32],
    ratios: &[f64],
    color: RGBColor,
) -> Result<()> {
    let (x_lo, x_hi) = extent(lens.iter().map(|&l| f64::from(l)))
        .ok_or(PlotError::Empty("ratio scatter"))?;
    let (y_lo, y_hi) = extent(ratios.iter().copied()).ok_or(PlotError::Empty("ratio scatter"))?;

    let mut chart = ChartBuilder::on(area)
        .caption(title, font(18.0))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(padded(x_lo, x_hi), padded(y_lo, y_hi))?;
    chart
        .configure_mesh()
        .light_line_style(grid_style())
        .x_desc("Input Length")
        .y_desc("Ratio Value")
        .draw()?;
    chart.draw_series(
        lens.iter()
            .zip(ratios)
            .map(|(&len, &ratio)| Circle::new((f64::from(len), ratio), 3, color.mix(0.5).filled())),
    )?;
    Ok(())
}

fn configure_ratio_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<KeyTicks, RangedCoordf64>>,
    boxes: &RatioBoxes<'_>,
) -> Result<()> {
    chart
        .configure_mesh()
        .x_labels(boxes.lengths.len())
        .light_line_style(grid_style())
        .x_desc("Input Length")
        .y_desc("Ratio Value")
        .x_label_formatter(&|x| boxes.label(*x))
        .draw()?;
    Ok(())
}
