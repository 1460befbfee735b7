//! # fuzzlens log scanner
//!
//! Streaming scanner for fuzzing-campaign logs with structured event output.
//!
//! ## Overview
//!
//! Fuzzer harnesses print their telemetry as free-form log lines. This crate
//! turns those lines into a stream of typed [`LogEvent`](ir::LogEvent)s:
//!
//! - **Calibration**: `consistency_ratios for input of len N: a, b, ...`,
//!   `Input inconsistent` and `... tries, still unstable` lines
//! - **Observer agreement**: `Observer correctness stats for input of len N: ...`
//! - **Monitor status**: multi-monitor `GLOBAL` lines (run time, corpus,
//!   executions, coverage and state percentages)
//! - **System load**: `top` batch output (load average, tasks, CPU, memory, swap)
//!
//! JSON-lines monitor output is handled separately by the [`metrics`] module,
//! which flattens each record into numeric fields.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     update()      ┌────────────┐
//! │  fuzzer log  │ ────────────────► │ LogScanner │
//! │  (streaming) │ ◄──────────────── │            │
//! └──────────────┘   Vec<LogEvent>   └────────────┘
//!                                          │
//!                                          │ finish()
//!                                          ▼
//!                                   Final events
//! ```
//!
//! [`LogScanner`](scanner::LogScanner) buffers partial lines and tracks the
//! global byte offset, so spans stay exact whatever the chunking.
//!
//! ## Examples
//!
//! ### One-shot scanning
//!
//! ```
//! use fuzzlens_log::LogScanner;
//! use fuzzlens_log::ir::EventPayload;
//!
//! let log = "[INFO] consistency_ratios for input of len 4: 10, 8, 2\n";
//! let events = LogScanner::new().parse(log);
//!
//! assert!(matches!(
//!     events[0].payload,
//!     EventPayload::ConsistencyRatios { input_len: 4, .. }
//! ));
//! ```
//!
//! ### Streaming
//!
//! ```
//! use fuzzlens_log::LogScanner;
//!
//! let mut scanner = LogScanner::new();
//! let first = scanner.update("Input incon");
//! assert!(first.is_empty());
//! let second = scanner.update("sistent\n");
//! assert_eq!(second.len(), 1);
//! let rest = scanner.finish();
//! assert!(rest.is_empty());
//! ```
//!
//! ### Exporting to JSON
//!
//! ```no_run
//! use fuzzlens_log::LogScanner;
//! use std::fs;
//!
//! let log = fs::read_to_string("fuzzer.log")?;
//! let events = LogScanner::new().parse(&log);
//! let json = serde_json::to_string_pretty(&events)?;
//! fs::write("events.json", json)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
/// Typed event Intermediate Representation (IR).
pub mod ir;
pub mod metrics;
pub mod patterns;
/// Streaming scanner implementation.
pub mod scanner;

#[cfg(test)]
mod tests;

pub use error::{Result, ScanError};
pub use scanner::LogScanner;

/// Reads and scans a whole log file.
pub fn scan_file(path: &std::path::Path) -> Result<Vec<ir::LogEvent>> {
    let content = std::fs::read(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LogScanner::new().parse(&String::from_utf8_lossy(&content)))
}

/// Schema version for the log event IR.
///
/// - MAJOR: Breaking changes to event structure
/// - MINOR: New optional fields or event types
/// - PATCH: Bug fixes to scanning behavior
pub const SCHEMA_VERSION: &str = "1.0.0";
