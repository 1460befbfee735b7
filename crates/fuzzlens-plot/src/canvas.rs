//! SVG targets and small layout helpers.

use crate::error::Result;
use plotters::coord::ranged1d::{KeyPointHint, NoDefaultFormatting, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// Renders a figure into an SVG file.
pub fn render_svg<F>(path: &Path, size: (u32, u32), draw: F) -> Result<()>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
{
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    draw(&root)?;
    root.present()?;
    log::debug!("Wrote {}x{} figure to {}", size.0, size.1, path.display());
    Ok(())
}

/// Renders a figure into an in-memory SVG document.
pub fn render_svg_string<F>(size: (u32, u32), draw: F) -> Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}

/// A linear `f64` axis whose ticks sit at fixed positions.
///
/// Unformatted labels print like a plain `f64` axis. When the mesh asks for
/// fewer points than there are ticks, every n-th tick is kept.
#[derive(Clone)]
pub(crate) struct KeyTicks {
    coord: RangedCoordf64,
    ticks: Vec<f64>,
}

impl KeyTicks {
    pub(crate) fn new(range: Range<f64>, ticks: Vec<f64>) -> Self {
        Self {
            coord: range.into(),
            ticks,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.ticks.len()
    }
}

impl Ranged for KeyTicks {
    type FormatOption = NoDefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.coord.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, hint: Hint) -> Vec<f64> {
        let max = hint.max_num_points();
        if max == 0 {
            return Vec::new();
        }
        let step = self.ticks.len().div_ceil(max).max(1);
        self.ticks.iter().step_by(step).copied().collect()
    }

    fn range(&self) -> Range<f64> {
        self.coord.range()
    }
}

impl ValueFormatter<f64> for KeyTicks {
    fn format(value: &f64) -> String {
        <RangedCoordf64 as ValueFormatter<f64>>::format(value)
    }
}

/// `lo..hi` widened by 5% on each side, or by one unit when empty.
pub(crate) fn padded(lo: f64, hi: f64) -> Range<f64> {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return (lo - 1.0)..(hi + 1.0);
    }
    (lo - span * 0.05)..(hi + span * 0.05)
}

/// Smallest and largest of `values`.
pub(crate) fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Splits a polyline into dashes, every other piece of each segment.
pub(crate) fn dashes(points: &[(f64, f64)], pieces: usize) -> Vec<[(f64, f64); 2]> {
    let pieces = pieces.max(1) * 2;
    let mut out = Vec::new();
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        for i in (0..pieces).step_by(2) {
            let t0 = i as f64 / pieces as f64;
            let t1 = (i + 1) as f64 / pieces as f64;
            out.push([
                (x0 + (x1 - x0) * t0, y0 + (y1 - y0) * t0),
                (x0 + (x1 - x0) * t1, y0 + (y1 - y0) * t1),
            ]);
        }
    }
    out
}

/// Runs of consecutive present values, with their positions.
pub(crate) fn runs(values: &[Option<f64>], positions: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for (value, &x) in values.iter().zip(positions) {
        match value {
            Some(y) => current.push((x, *y)),
            None if !current.is_empty() => out.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ticks_thin_out() {
        let axis = KeyTicks::new(0.0..10.0, (0..10).map(f64::from).collect());
        assert_eq!(axis.key_points(20usize).len(), 10);
        assert_eq!(axis.key_points(5usize), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(axis.key_points(3usize), vec![0.0, 4.0, 8.0]);
        assert!(axis.key_points(0usize).is_empty());
        assert_eq!(axis.range(), 0.0..10.0);
        assert_eq!(axis.map(&5.0, (0, 100)), 50);
    }

    #[test]
    fn test_padded() {
        assert_eq!(padded(0.0, 10.0), -0.5..10.5);
        assert_eq!(padded(3.0, 3.0), 2.0..4.0);
    }

    #[test]
    fn test_dashes() {
        let d = dashes(&[(0.0, 0.0), (4.0, 0.0)], 2);
        assert_eq!(d, vec![[(0.0, 0.0), (1.0, 0.0)], [(2.0, 0.0), (3.0, 0.0)]]);
    }

    #[test]
    fn test_runs_split_on_gaps() {
        let values = [Some(1.0), None, Some(2.0), Some(3.0), None];
        let positions = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            runs(&values, &positions),
            vec![vec![(1.0, 1.0)], vec![(3.0, 2.0), (4.0, 3.0)]]
        );
    }
}
