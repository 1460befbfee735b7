//! JSON monitor records from one or more runs, as a grid of panels.

use crate::error::{AnalysisError, Result};
use crate::series::{Panel, Series, TickFormat};
use fuzzlens_log::metrics::{read_flat_records, FlatRecord};
use std::collections::BTreeSet;
use std::path::Path;

pub const TIME_FIELD: &str = "run_time";

/// Runs shorter than this keep their last three quarters as "recent".
const RECENT_WINDOW: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricRun {
    pub label: String,
    pub records: Vec<FlatRecord>,
}

impl MetricRun {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            label: run_label(path),
            records: read_flat_records(path)?,
        })
    }
}

/// File name without its last extension.
pub fn run_label(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// Points of the last hour, or of the last three quarters of a short run.
pub fn recent_window(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let Some(max) = points.iter().map(|p| p.0).reduce(f64::max) else {
        return Vec::new();
    };
    let min = points.iter().map(|p| p.0).fold(max, f64::min);
    if max - min < RECENT_WINDOW {
        points.iter().copied().filter(|p| p.0 > max / 4.0).collect()
    } else {
        points
            .iter()
            .copied()
            .filter(|p| max - p.0 < RECENT_WINDOW)
            .collect()
    }
}

/// One panel per field (sorted), each with a line per run.
///
/// With `include_recent`, every panel is followed by a zoom on its recent window.
pub fn metric_panels(runs: &[MetricRun], include_recent: bool) -> Result<Vec<Panel>> {
    let mut fields = BTreeSet::new();
    let mut percent = BTreeSet::new();
    let mut float_format = BTreeSet::new();
    for record in runs.iter().flat_map(|r| &r.records) {
        fields.extend(record.values.keys().cloned());
        percent.extend(record.percent.iter().cloned());
        float_format.extend(record.float_format.iter().cloned());
    }
    if !fields.contains(TIME_FIELD) {
        return Err(AnalysisError::MissingRunTime);
    }

    let mut panels = Vec::new();
    for field in fields.iter().filter(|f| f.as_str() != TIME_FIELD) {
        let unit = if percent.contains(field) { "%" } else { "count" };
        let tick_format = if float_format.contains(field) {
            TickFormat::Fixed3
        } else {
            TickFormat::Integer
        };
        let series: Vec<Series> = runs
            .iter()
            .map(|run| Series::new(run.label.clone(), field_points(run, field)))
            .collect();

        let recent = if include_recent {
            let recent: Vec<Series> = series
                .iter()
                .map(|s| Series::new(s.label.clone(), recent_window(&s.points)))
                .filter(|s| !s.points.is_empty())
                .collect();
            (!recent.is_empty()).then(|| Panel {
                ylabel: format!("Recent {field} [{unit}]"),
                series: recent,
                tick_format,
            })
        } else {
            None
        };

        panels.push(Panel {
            ylabel: format!("{field} [{unit}]"),
            series,
            tick_format,
        });
        panels.extend(recent);
    }
    Ok(panels)
}

fn field_points(run: &MetricRun, field: &str) -> Vec<(f64, f64)> {
    let mut skipped = 0usize;
    let points = run
        .records
        .iter()
        .filter_map(|record| {
            let Some(t) = record.get(TIME_FIELD) else {
                skipped += 1;
                return None;
            };
            Some((t, record.get(field).unwrap_or(0.0)))
        })
        .collect();
    if skipped > 0 {
        log::debug!("{}: {} records without {} skipped", run.label, skipped, TIME_FIELD);
    }
    points
}
