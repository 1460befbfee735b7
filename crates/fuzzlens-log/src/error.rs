use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path:?} line {line}: invalid JSON record: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path:?} line {line}: expected a JSON object")]
    NotAnObject { path: PathBuf, line: usize },
}

pub type Result<T> = std::result::Result<T, ScanError>;
