//! Error types for the dashboard core.

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset file not found: {0}")]
    DatasetNotFound(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("No data available for dataset '{0}'")]
    NoData(String),

    #[error("Session is not authenticated")]
    NotAuthenticated,

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("No password configured")]
    PasswordNotConfigured,

    #[error("Boundary data unavailable: {0}")]
    Boundary(String),

    #[error("Invalid time point: {year}-Q{quarter}")]
    InvalidTimePoint { year: i32, quarter: i64 },
}
