//! Report error types

use thiserror::Error;

use super::fetch::FetchError;

/// Message shown while the report is in the failed state
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load data. Please try again.";

#[derive(Debug, Error)]
pub enum ReportError {
    /// Either record query failed; the whole load cycle is abandoned
    #[error("Failed to load data. Please try again.")]
    Fetch(#[from] FetchError),

    #[error("Error loading logo: {0}")]
    ImageLoad(String),

    #[error("Invalid report period: month index {month}, year {year}")]
    InvalidPeriod { month: u32, year: i32 },

    #[error("No report is loaded")]
    NotReady,

    #[error("Nothing to retry: the last report load did not fail")]
    NothingToRetry,

    /// A newer selection started while this load was in flight
    #[error("Report load superseded by a newer selection")]
    Superseded,

    #[error("PDF rendering failed: {0}")]
    Render(String),

    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
