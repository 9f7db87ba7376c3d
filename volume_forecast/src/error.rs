//! Error types for the volume_forecast crate

use thiserror::Error;
use volume_math::MathError;

/// Custom error types for the volume_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Scaler transform requested before any fit
    #[error("Unfitted state: scaler used before fit")]
    UnfittedState,

    /// A substring of an encoded sequence is not a number
    #[error("Malformed number: {0:?}")]
    MalformedNumber(String),

    /// The completion or embedding service failed or answered unusably
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error while loading or validating configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::UnfittedState => ForecastError::UnfittedState,
            MathError::MalformedNumber { substring } => ForecastError::MalformedNumber(substring),
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
        }
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::ExternalService(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}
