use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Fund not found: {0}")]
    FundNotFound(String),

    #[error("No historical data for fund {code} between {start} and {end}")]
    NoHistoricalData {
        code: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error(transparent)]
    Source(#[from] anyhow::Error),
}

impl AnalysisError {
    /// HTTP status the error surfaces as.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::FundNotFound(_) | AnalysisError::NoHistoricalData { .. } => 404,
            AnalysisError::InvalidParameters(_) => 400,
            AnalysisError::Source(_) => 500,
        }
    }
}
