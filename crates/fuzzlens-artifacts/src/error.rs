use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{path} has no {field}")]
    MissingField { path: PathBuf, field: &'static str },
    #[error("Invalid base64 pcap in {path}: {source}")]
    Base64 {
        path: PathBuf,
        #[source]
        source: base64::DecodeError,
    },
    #[error("Input directory '{0}' does not exist")]
    InputMissing(PathBuf),
    #[error("Output directory '{0}' already exists")]
    OutputExists(PathBuf),
    #[error("{0} not found")]
    ExecutableMissing(PathBuf),
    #[error("addr2line failed: {0}")]
    Symbolizer(String),
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| ArtifactError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, ArtifactError>;
