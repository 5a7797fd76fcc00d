pub mod geojson_source;

pub use geojson_source::GeoJsonSource;

use async_trait::async_trait;
use trips_core::TripStore;

use crate::DataError;

/// Trait for trip data sources
#[async_trait]
pub trait TripSource: Send + Sync {
    /// Load every usable trip record. Called once at startup; there is no
    /// retry, a failure leaves the dashboard in its error state.
    async fn load(&self) -> Result<TripStore, DataError>;

    /// Get the source name/path
    fn source_name(&self) -> &str;
}
