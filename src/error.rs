//! Error types shared by the store, the aggregation engine and the report assembler.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias using `ReportError`.
pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Store unreachable, query malformed or a column could not be read.
    /// Fatal for the current report; never retried.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// The calendar month containing this date runs past the last date
    /// chrono can represent.
    #[error("no calendar month window for {0}")]
    DateOutOfRange(NaiveDate),

    #[error("unknown report `{0}`")]
    UnknownReport(String),

    #[error("unknown entity `{0}`")]
    UnknownEntity(String),
}

impl ReportError {
    /// HTTP status code used by the API server.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::DateOutOfRange(_) => 400,
            Self::UnknownReport(_) | Self::UnknownEntity(_) => 404,
            Self::StorageUnavailable(_) => 503,
        }
    }
}
