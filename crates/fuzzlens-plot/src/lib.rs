//! SVG rendering of fuzzing telemetry.
//!
//! Every chart has a `draw_*` function generic over the plotters
//! [`DrawingBackend`](plotters_backend::DrawingBackend), so it can be drawn
//! into a file or an in-memory string, and a `save_*` wrapper that writes
//! the figure to disk:
//!
//! ```no_run
//! use fuzzlens_analysis::consistency::ConsistencyLog;
//! use fuzzlens_plot::consistency::save_distributions;
//! use std::path::Path;
//!
//! let events = fuzzlens_log::scan_file(Path::new("calibration.log"))?;
//! let log = ConsistencyLog::from_events(&events);
//! save_distributions(Path::new("calibration-distributions.svg"), &log)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bars;
pub mod canvas;
pub mod consistency;
pub mod error;
pub mod observer;
pub mod ratio;
pub mod style;
pub mod timeseries;

pub use canvas::{render_svg, render_svg_string};
pub use error::{PlotError, Result};
