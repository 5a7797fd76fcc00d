//! Trip data loading for the dashboard

pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use sources::{GeoJsonSource, TripSource};

/// Errors that can occur while loading trip data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON parsing error: {0}")]
    GeoJson(String),

    #[error("the source contains no usable trip records")]
    Empty,

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<geojson::Error> for DataError {
    fn from(error: geojson::Error) -> Self {
        DataError::GeoJson(error.to_string())
    }
}
