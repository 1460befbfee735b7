use fuzzlens_analysis::AnalysisError;
use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Nothing to plot: {0}")]
    Empty(&'static str),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Draw(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
