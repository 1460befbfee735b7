//! Calibration consistency ratios.
//!
//! During calibration the fuzzer replays an input several times and logs, per
//! input length, how many replays agreed with each observed behaviour. The
//! first value is the dominant behaviour; the rest are deviations from it.

use crate::error::{AnalysisError, Result};
use crate::stats::unique_counts;
use fuzzlens_log::ir::{EventPayload, LogEvent};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsistencyLog {
    /// Ratio lists grouped by input length.
    pub by_len: BTreeMap<u32, Vec<Vec<u64>>>,
    /// Inputs that never became consistent.
    pub unfixed: usize,
    /// Verbatim "still unstable" lines, in log order.
    pub unstable_notes: Vec<String>,
}

/// Axis ranges shared by every distribution panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GlobalRanges {
    pub ratio: (i64, i64),
    pub length: (usize, usize),
    pub filtered: (i64, i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub unfixed: usize,
    /// Largest single value in any ratio list.
    pub max_replay: u64,
}

/// Frequencies behind one row of distribution panels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    /// `v0 - vi` over every entry.
    pub relative: BTreeMap<i64, usize>,
    /// Entry lengths.
    pub lengths: BTreeMap<usize, usize>,
    /// `v0 - vi` over entries with at least two values.
    pub filtered: BTreeMap<i64, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatioKind {
    /// `v1 / v0`
    Second,
    /// `(v1 + .. + vn) / v0`
    Sum,
}

impl RatioKind {
    pub const ALL: [RatioKind; 2] = [RatioKind::Second, RatioKind::Sum];

    pub fn title_prefix(self) -> &'static str {
        match self {
            RatioKind::Second => "Second/First",
            RatioKind::Sum => "Sum(Rest)/First",
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            RatioKind::Second => "Second",
            RatioKind::Sum => "Sum",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatioSeries {
    pub second: Vec<f64>,
    pub sum: Vec<f64>,
}

impl RatioSeries {
    pub fn get(&self, kind: RatioKind) -> &[f64] {
        match kind {
            RatioKind::Second => &self.second,
            RatioKind::Sum => &self.sum,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorRatios {
    /// Input length of each flat sample below.
    pub lens: Vec<u32>,
    pub second: Vec<f64>,
    pub sum: Vec<f64>,
    /// Only lengths with at least one ratio appear here.
    pub by_len: BTreeMap<u32, RatioSeries>,
}

impl ErrorRatios {
    /// Every length from the smallest to the largest with ratios, gaps included.
    pub fn contiguous_lengths(&self) -> Vec<u32> {
        match (self.by_len.keys().next(), self.by_len.keys().next_back()) {
            (Some(&min), Some(&max)) => (min..=max).collect(),
            _ => Vec::new(),
        }
    }

    /// One sample per length in `lengths`; empty where a length has no ratios.
    pub fn boxes(&self, lengths: &[u32], kind: RatioKind) -> Vec<Vec<f64>> {
        lengths
            .iter()
            .map(|len| {
                self.by_len
                    .get(len)
                    .map(|series| series.get(kind).to_vec())
                    .unwrap_or_default()
            })
            .collect()
    }

    pub fn flat(&self, kind: RatioKind) -> &[f64] {
        match kind {
            RatioKind::Second => &self.second,
            RatioKind::Sum => &self.sum,
        }
    }
}

/// Differences of every value from the first one, saturated to `i64`.
pub fn relative_values(entry: &[u64]) -> Vec<i64> {
    match entry.first() {
        Some(&first) => entry
            .iter()
            .map(|&v| {
                let diff = i128::from(first) - i128::from(v);
                diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
            })
            .collect(),
        None => Vec::new(),
    }
}

pub fn distribution<'a>(entries: impl IntoIterator<Item = &'a [u64]>) -> Distribution {
    let entries: Vec<&[u64]> = entries.into_iter().collect();
    Distribution {
        relative: unique_counts(entries.iter().flat_map(|e| relative_values(e))),
        lengths: unique_counts(entries.iter().map(|e| e.len())),
        filtered: unique_counts(
            entries
                .iter()
                .filter(|e| e.len() >= 2)
                .flat_map(|e| relative_values(e)),
        ),
    }
}

impl ConsistencyLog {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a LogEvent>) -> Self {
        let mut log = Self::default();
        for event in events {
            match &event.payload {
                EventPayload::ConsistencyRatios { input_len, values } => {
                    log.by_len.entry(*input_len).or_default().push(values.clone());
                }
                EventPayload::InputInconsistent => log.unfixed += 1,
                EventPayload::StillUnstable { message } => {
                    log.unstable_notes.push(message.clone());
                }
                _ => {}
            }
        }
        log
    }

    pub fn is_empty(&self) -> bool {
        self.by_len.is_empty()
    }

    /// All ratio lists, ordered by input length.
    pub fn entries(&self) -> impl Iterator<Item = &[u64]> + '_ {
        self.by_len
            .values()
            .flat_map(|entries| entries.iter().map(Vec::as_slice))
    }

    pub fn distribution(&self) -> Distribution {
        distribution(self.entries())
    }

    pub fn global_ranges(&self) -> Result<GlobalRanges> {
        let ratio = min_max(self.entries().flat_map(relative_values)).ok_or(AnalysisError::NoData)?;
        let length = min_max(self.entries().map(<[u64]>::len)).ok_or(AnalysisError::NoData)?;
        let filtered = min_max(
            self.entries()
                .filter(|e| e.len() >= 2)
                .flat_map(relative_values),
        )
        .unwrap_or(ratio);
        Ok(GlobalRanges {
            ratio,
            length,
            filtered,
        })
    }

    pub fn error_ratios(&self) -> ErrorRatios {
        let mut ratios = ErrorRatios::default();
        for (&input_len, entries) in &self.by_len {
            let mut series = RatioSeries::default();
            for entry in entries.iter().filter(|e| e.len() >= 2) {
                let first = entry[0];
                if first == 0 {
                    log::debug!("Skipping ratio list with zero first value at len {}", input_len);
                    continue;
                }
                let second = entry[1] as f64 / first as f64;
                let sum = entry[1..].iter().map(|&v| v as f64).sum::<f64>() / first as f64;

                ratios.lens.push(input_len);
                ratios.second.push(second);
                ratios.sum.push(sum);
                series.second.push(second);
                series.sum.push(sum);
            }
            if !series.second.is_empty() {
                ratios.by_len.insert(input_len, series);
            }
        }
        ratios
    }

    /// Raw entry count for each of `lengths`.
    pub fn sample_counts(&self, lengths: &[u32]) -> Vec<usize> {
        lengths
            .iter()
            .map(|len| self.by_len.get(len).map_or(0, Vec::len))
            .collect()
    }

    pub fn summary(&self) -> Result<Summary> {
        let max_replay = self
            .entries()
            .flat_map(|e| e.iter().copied())
            .max()
            .ok_or(AnalysisError::NoData)?;
        Ok(Summary {
            unfixed: self.unfixed,
            max_replay,
        })
    }
}

fn min_max<T: Ord + Copy>(values: impl IntoIterator<Item = T>) -> Option<(T, T)> {
    values.into_iter().fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
