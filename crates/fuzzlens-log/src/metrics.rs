//! JSON-lines monitor records.
//!
//! Fuzzer monitors can emit one JSON object per line. Values are either
//! plain numbers or wrapped in a single-key object naming their unit:
//!
//! ```json
//! {"run_time": 12, "corpus": {"Number": 40}, "coverage-observer": {"Percent": 0.125}}
//! ```

use crate::error::{Result, ScanError};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// How [`read_json_lines`] treats malformed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// The first malformed line is an error.
    Strict,
    /// Malformed lines are logged and skipped.
    Lenient,
}

/// All numeric leaves of one record, keyed by dotted path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    pub values: BTreeMap<String, f64>,
    /// Fields that were wrapped in `{"Percent": ..}`.
    pub percent: BTreeSet<String>,
    /// Fields that should be printed with three decimals.
    pub float_format: BTreeSet<String>,
}

impl FlatRecord {
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }
}

/// Top-level fields of a record with single-key wrappers removed.
pub type SimpleRecord = BTreeMap<String, f64>;

/// Recursively collects the numeric fields of `object`.
///
/// `{"Percent": p}` is scaled to `p * 100`.
pub fn flatten_numeric(object: &Map<String, Value>) -> FlatRecord {
    let mut record = FlatRecord::default();
    flatten_into(object, "", &mut record);
    record
}

fn flatten_into(object: &Map<String, Value>, prefix: &str, record: &mut FlatRecord) {
    for (key, value) in object {
        let field = format!("{prefix}{key}");
        match value {
            Value::Number(n) => {
                if let Some(v) = n.as_f64() {
                    record.values.insert(field, v);
                }
            }
            Value::Bool(b) => {
                record.values.insert(field, if *b { 1.0 } else { 0.0 });
            }
            Value::Object(inner) => {
                if let Some(v) = inner.get("Number").and_then(Value::as_f64) {
                    record.values.insert(field, v);
                } else if let Some(v) = inner.get("Float").and_then(Value::as_f64) {
                    record.float_format.insert(field.clone());
                    record.values.insert(field, v);
                } else if let Some(v) = inner.get("Percent").and_then(Value::as_f64) {
                    record.percent.insert(field.clone());
                    record.float_format.insert(field.clone());
                    record.values.insert(field, v * 100.0);
                } else {
                    flatten_into(inner, &format!("{field}."), record);
                }
            }
            Value::Null | Value::String(_) | Value::Array(_) => {}
        }
    }
}

/// Replaces single-key objects by their inner value and keeps numbers.
pub fn unwrap_single(object: &Map<String, Value>) -> SimpleRecord {
    let mut record = SimpleRecord::new();
    for (key, value) in object {
        let value = match value {
            Value::Object(inner) if inner.len() == 1 => inner.values().next().unwrap_or(value),
            other => other,
        };
        if let Some(v) = value.as_f64() {
            record.insert(key.clone(), v);
        }
    }
    record
}

/// Reads a JSON-lines file into its objects, skipping blank lines.
pub fn read_json_lines(path: &Path, mode: ReadMode) -> Result<Vec<Map<String, Value>>> {
    let content = std::fs::read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json_lines(&content, path, mode)
}

pub(crate) fn parse_json_lines(
    content: &str,
    path: &Path,
    mode: ReadMode,
) -> Result<Vec<Map<String, Value>>> {
    let mut objects = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let error = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(object)) => {
                objects.push(object);
                continue;
            }
            Ok(_) => ScanError::NotAnObject {
                path: path.to_path_buf(),
                line: idx + 1,
            },
            Err(source) => ScanError::Json {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            },
        };
        match mode {
            ReadMode::Strict => return Err(error),
            ReadMode::Lenient => log::warn!("{}", error),
        }
    }
    Ok(objects)
}

pub fn read_flat_records(path: &Path) -> Result<Vec<FlatRecord>> {
    Ok(read_json_lines(path, ReadMode::Strict)?
        .iter()
        .map(flatten_numeric)
        .collect())
}

pub fn read_simple_records(path: &Path) -> Result<Vec<SimpleRecord>> {
    Ok(read_json_lines(path, ReadMode::Lenient)?
        .iter()
        .map(unwrap_single)
        .collect())
}
