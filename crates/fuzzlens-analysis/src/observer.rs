//! Agreement between the coverage observer and the state observer.

use fuzzlens_log::ir::{EventPayload, LogEvent};
use std::collections::BTreeMap;

pub const OBSERVER_LABELS: [&str; 4] = [
    "Both Unstable",
    "Coverage Unstable/States Stable",
    "Coverage Stable/States Unstable",
    "Both Stable",
];

/// Width of the overall "Avg" bar.
pub const AVG_BAR_WIDTH: f64 = 1.0;
/// Narrowest per-length bar.
pub const MIN_BAR_WIDTH: f64 = 0.1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverAgreement {
    /// Per-sample ratios grouped by input length. Samples with no counts are dropped.
    pub by_len: BTreeMap<u32, Vec<[f64; 4]>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackedBar {
    pub label: String,
    pub position: f64,
    pub width: f64,
    pub ratios: [f64; 4],
    pub samples: usize,
}

impl ObserverAgreement {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a LogEvent>) -> Self {
        let mut agreement = Self::default();
        for event in events {
            if let EventPayload::ObserverStats(counts) = &event.payload {
                match counts.ratios() {
                    Some(ratios) => agreement
                        .by_len
                        .entry(counts.input_len)
                        .or_default()
                        .push(ratios),
                    None => log::debug!("Skipping empty observer stats for len {}", counts.input_len),
                }
            }
        }
        agreement
    }

    pub fn is_empty(&self) -> bool {
        self.by_len.is_empty()
    }

    pub fn total_samples(&self) -> usize {
        self.by_len.values().map(Vec::len).sum()
    }

    /// Mean ratios over every sample.
    pub fn overall_mean(&self) -> Option<[f64; 4]> {
        mean_ratios(self.by_len.values().flatten())
    }

    pub fn mean_by_len(&self) -> BTreeMap<u32, [f64; 4]> {
        self.by_len
            .iter()
            .filter_map(|(&len, samples)| Some((len, mean_ratios(samples.iter())?)))
            .collect()
    }

    /// The overall bar followed by one bar per input length.
    ///
    /// Per-length bars are `0.1 + samples / max_samples / 1.3` wide.
    pub fn stacked_bars(&self) -> Vec<StackedBar> {
        let Some(overall) = self.overall_mean() else {
            return Vec::new();
        };
        let max_samples = self.by_len.values().map(Vec::len).max().unwrap_or(1).max(1);

        let mut bars = vec![StackedBar {
            label: "Avg".to_string(),
            position: -1.0,
            width: AVG_BAR_WIDTH,
            ratios: overall,
            samples: self.total_samples(),
        }];
        for (len, ratios) in self.mean_by_len() {
            let samples = self.by_len[&len].len();
            bars.push(StackedBar {
                label: len.to_string(),
                position: f64::from(len),
                width: MIN_BAR_WIDTH + samples as f64 / max_samples as f64 / 1.3,
                ratios,
                samples,
            });
        }
        bars
    }
}

fn mean_ratios<'a>(samples: impl Iterator<Item = &'a [f64; 4]>) -> Option<[f64; 4]> {
    let mut sum = [0.0; 4];
    let mut n = 0usize;
    for sample in samples {
        for (acc, v) in sum.iter_mut().zip(sample) {
            *acc += v;
        }
        n += 1;
    }
    if n == 0 {
        return None;
    }
    Some(sum.map(|s| s / n as f64))
}
