//! Metric profiles: how a compared metric is scaled and labelled.
//!
//! Profiles are read from JSON:
//!
//! ```json
//! {
//!   "coverage-observer": { "factor": 100, "ylabel": "Block Coverage [%]", "minor_ticks": true }
//! }
//! ```
//!
//! User profiles are merged over the built-in ones.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricProfile {
    /// Multiplier applied to every value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    pub ylabel: String,
    /// Label minor ticks of the log axis too.
    #[serde(default)]
    pub minor_ticks: bool,
}

impl MetricProfile {
    pub fn scale(&self, value: f64) -> f64 {
        match self.factor {
            Some(factor) => value * factor,
            None => value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet {
    pub profiles: BTreeMap<String, MetricProfile>,
}

impl ProfileSet {
    pub fn builtin() -> Self {
        let entries = [
            ("coverage-observer", Some(100.0), "Block Coverage [%]", true),
            ("state-map-observer", Some(100.0), "State Coverage [%]", false),
            ("state-diff-map-observer", Some(100.0), "State-Diff Coverage [%]", false),
            ("all_other_to_most_rolling_avg", None, "Consistency Ratio", false),
        ];
        let profiles = entries
            .into_iter()
            .map(|(key, factor, ylabel, minor_ticks)| {
                (
                    key.to_string(),
                    MetricProfile {
                        factor,
                        ylabel: ylabel.to_string(),
                        minor_ticks,
                    },
                )
            })
            .collect();
        Self { profiles }
    }

    /// Returns the default config file path: ~/.config/fuzzlens/metrics.json
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fuzzlens").join("metrics.json"))
    }

    /// Built-ins, overlaid with `explicit` or else the default config file.
    pub fn load(explicit: Option<&Path>) -> Self {
        let mut set = Self::builtin();
        let path = explicit.map(Path::to_path_buf).or_else(Self::config_path);
        if let Some(user) = path.as_deref().and_then(Self::load_from_path) {
            set.profiles.extend(user.profiles);
        }
        set
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<ProfileSet>(&content) {
                    Ok(set) => {
                        log::info!("Loaded {} metric profiles from {:?}", set.profiles.len(), path);
                        return Some(set);
                    }
                    Err(e) => log::warn!("Failed to parse metric profiles: {}", e),
                },
                Err(e) => log::warn!("Failed to read metric profiles: {}", e),
            }
        }
        None
    }

    pub fn get(&self, key: &str) -> Result<&MetricProfile> {
        self.profiles
            .get(key)
            .ok_or_else(|| AnalysisError::UnknownProfile {
                key: key.to_string(),
                known: self.keys().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }
}
