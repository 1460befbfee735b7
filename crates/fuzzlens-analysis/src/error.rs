use fuzzlens_log::ScanError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No matching log entries found!")]
    NoData,
    #[error("No run_time field found in data")]
    MissingRunTime,
    #[error("No files contain the metric '{0}'")]
    MissingMetric(String),
    #[error("Unknown metric '{key}' (known: {known})")]
    UnknownProfile { key: String, known: String },
    #[error(transparent)]
    Scan(#[from] ScanError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
