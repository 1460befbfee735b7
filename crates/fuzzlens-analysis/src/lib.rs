//! Aggregations over scanned fuzzing telemetry.
//!
//! Each module turns [`fuzzlens_log`] events or JSON records into the data a
//! chart needs: ranges, ratios, box and density statistics, stacked bars and
//! time series. Rendering lives in `fuzzlens-plot`.

pub mod compare;
pub mod consistency;
pub mod error;
pub mod metrics;
pub mod monitor;
pub mod observer;
pub mod profile;
pub mod series;
pub mod stats;
pub mod system_load;

pub use error::{AnalysisError, Result};
