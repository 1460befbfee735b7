//! Descriptive statistics used by the box, violin and summary plots.

use std::collections::BTreeMap;

/// Whisker reach in multiples of the inter-quartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Points at which a violin's density is evaluated.
pub const VIOLIN_POINTS: usize = 100;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    Some(quantile_sorted(&sorted, q))
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Sample standard deviation (n - 1 in the denominator).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Sorted distinct values with their frequencies.
pub fn unique_counts<T: Ord>(values: impl IntoIterator<Item = T>) -> BTreeMap<T, usize> {
    let mut counts = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_limit = q1 - WHISKER_IQR * iqr;
        let high_limit = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_limit)
            .map_or(q1, |v| v.min(q1));
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_limit)
            .map_or(q3, |v| v.max(q3));
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < whisker_low || *v > whisker_high)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            outliers,
        })
    }
}

/// Kernel density profile of one sample, as drawn by a violin plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ViolinStats {
    /// Evaluation points, ascending from `min` to `max`.
    pub coords: Vec<f64>,
    /// Density at each of `coords`.
    pub density: Vec<f64>,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl ViolinStats {
    /// Gaussian KDE with Scott's bandwidth.
    ///
    /// A sample without spread produces a single point of unit density.
    pub fn from_values(values: &[f64], points: usize) -> Option<Self> {
        let sorted = sorted(values);
        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let mean = mean(values)?;
        let median = quantile_sorted(&sorted, 0.5);

        let std = sample_std(values).unwrap_or(0.0);
        if std == 0.0 || points < 2 {
            return Some(Self {
                coords: vec![min],
                density: vec![1.0],
                mean,
                median,
                min,
                max,
            });
        }

        let n = values.len() as f64;
        let bandwidth = n.powf(-0.2) * std;
        let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        let step = (max - min) / (points - 1) as f64;
        let coords: Vec<f64> = (0..points).map(|i| min + step * i as f64).collect();
        let density = coords
            .iter()
            .map(|y| {
                norm * values
                    .iter()
                    .map(|x| (-0.5 * ((y - x) / bandwidth).powi(2)).exp())
                    .sum::<f64>()
            })
            .collect();

        Some(Self {
            coords,
            density,
            mean,
            median,
            min,
            max,
        })
    }

    pub fn max_density(&self) -> f64 {
        self.density.iter().copied().fold(0.0, f64::max)
    }
}
