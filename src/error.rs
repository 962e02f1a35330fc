//! Error types for the climate overlay pipeline.

use thiserror::Error;

/// Result type alias using ClimateError.
pub type Result<T> = std::result::Result<T, ClimateError>;

#[derive(Debug, Error)]
pub enum ClimateError {
    // === Fetch Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GET {url} returned status {status}")]
    FetchStatus { url: String, status: u16 },

    // === Decode Errors ===
    #[error("Expected JSON but received markup (starts with {0:?})")]
    NotJson(String),

    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    // === Selection Errors ===
    #[error("Invalid date (expected dd/mm/yyyy): {0}")]
    InvalidDate(String),

    #[error("Unknown time period: {0}")]
    UnknownPeriod(String),

    #[error("Unknown percentile: {0} (expected 5, 50 or 95)")]
    UnknownPercentile(String),

    // === State Errors ===
    #[error("Readiness signal already resolved")]
    AlreadyResolved,

    #[error("Not loaded: {0}")]
    NotLoaded(&'static str),
}
