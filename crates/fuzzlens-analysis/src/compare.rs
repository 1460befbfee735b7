//! One metric across several runs, on a logarithmic value axis.

use crate::error::{AnalysisError, Result};
use crate::metrics::run_label;
use crate::profile::MetricProfile;
use crate::series::Series;
use fuzzlens_log::metrics::{read_simple_records, SimpleRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    #[default]
    RunTime,
    Executions,
}

impl XAxis {
    pub fn field(self) -> &'static str {
        match self {
            XAxis::RunTime => "run_time",
            XAxis::Executions => "executions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            XAxis::RunTime => "Run Time (seconds)",
            XAxis::Executions => "Executions",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareRun {
    pub label: String,
    pub records: Vec<SimpleRecord>,
}

impl CompareRun {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            label: run_label(path),
            records: read_simple_records(path)?,
        })
    }

    fn has(&self, key: &str) -> bool {
        self.records.iter().any(|r| r.contains_key(key))
    }

    fn max_x(&self, x_axis: XAxis) -> f64 {
        self.records
            .iter()
            .map(|r| value(r, x_axis.field()))
            .fold(0.0, f64::max)
    }
}

fn value(record: &SimpleRecord, field: &str) -> f64 {
    record.get(field).copied().unwrap_or(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompareChart {
    pub xlabel: String,
    pub ylabel: String,
    pub series: Vec<Series>,
    /// Upper x bound when the range is limited to the shortest run.
    pub x_limit: Option<f64>,
    pub minor_ticks: bool,
}

pub fn compare_chart(
    runs: &[CompareRun],
    x_axis: XAxis,
    key: &str,
    profile: &MetricProfile,
    limit_range: bool,
) -> Result<CompareChart> {
    let valid: Vec<&CompareRun> = runs.iter().filter(|r| r.has(key)).collect();
    if valid.is_empty() {
        return Err(AnalysisError::MissingMetric(key.to_string()));
    }
    for run in runs.iter().filter(|r| !r.has(key)) {
        log::info!("{} has no '{}' values, leaving it out", run.label, key);
    }

    let series = valid
        .iter()
        .map(|run| {
            let points = run
                .records
                .iter()
                .map(|r| (value(r, x_axis.field()), profile.scale(value(r, key))))
                .collect();
            Series::new(run.label.clone(), points)
        })
        .collect();

    let x_limit = if limit_range {
        valid.iter().map(|r| r.max_x(x_axis)).reduce(f64::min)
    } else {
        None
    };

    Ok(CompareChart {
        xlabel: x_axis.label().to_string(),
        ylabel: profile.ylabel.clone(),
        series,
        x_limit,
        minor_ticks: profile.minor_ticks,
    })
}

/// `coverage_observer` becomes `coverage-observer-plot.svg`.
pub fn output_name(key: &str) -> String {
    format!("{}-plot.svg", key.replace('_', "-"))
}
