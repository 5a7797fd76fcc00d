//! GeoJSON trip source
//!
//! Trips arrive as a FeatureCollection: one LineString feature per trip,
//! with identity, timestamps, and precomputed metrics in the properties.
//! Records that cannot be addressed at all (missing identity or
//! timestamps) are skipped with a warning; records with unusable geometry
//! or non-positive metrics are kept and degrade only the views that need
//! those fields.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use geo_types::Coord;
use geojson::{Feature, GeoJson, Value};
use serde::Deserialize;
use tracing::{info, warn};

use trips_core::{Trip, TripStore};

use crate::{DataError, sources::TripSource};

/// GeoJSON file source for loading trip records
pub struct GeoJsonSource {
    path: PathBuf,
    name: String,
}

/// Properties carried by each trip feature. Metrics are opaque facts from
/// the upstream pipeline; `duration` is derived from the timestamps
/// instead of being read back.
#[derive(Debug, Deserialize)]
struct RawTripProperties {
    tripid: serde_json::Value,
    taxiid: serde_json::Value,
    starttime: String,
    endtime: String,
    distance: f64,
    avspeed: f64,
    maxspeed: f64,
}

impl GeoJsonSource {
    pub fn new(path: PathBuf) -> Self {
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl TripSource for GeoJsonSource {
    async fn load(&self) -> Result<TripStore, DataError> {
        let path = self.path.clone();
        let trips = tokio::task::spawn_blocking(move || read_trips(&path)).await??;
        if trips.is_empty() {
            return Err(DataError::Empty);
        }
        info!(count = trips.len(), source = %self.name, "loaded trips");
        Ok(TripStore::new(trips))
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

fn read_trips(path: &Path) -> Result<Vec<Trip>, DataError> {
    let raw = std::fs::read_to_string(path)?;
    let geojson: GeoJson = raw.parse()?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        other => {
            return Err(DataError::GeoJson(format!(
                "expected a FeatureCollection, got {}",
                match other {
                    GeoJson::Geometry(_) => "a bare geometry",
                    GeoJson::Feature(_) => "a single feature",
                    GeoJson::FeatureCollection(_) => unreachable!(),
                }
            )))
        }
    };

    let total = collection.features.len();
    let trips: Vec<Trip> = collection
        .features
        .into_iter()
        .enumerate()
        .filter_map(|(index, feature)| match parse_feature(feature) {
            Ok(trip) => Some(trip),
            Err(reason) => {
                warn!(index, reason, "skipping malformed trip record");
                None
            }
        })
        .collect();

    if trips.len() < total {
        warn!(
            skipped = total - trips.len(),
            total, "some trip records were unusable"
        );
    }
    Ok(trips)
}

fn parse_feature(feature: Feature) -> Result<Trip, &'static str> {
    let properties = feature.properties.ok_or("feature has no properties")?;
    let raw: RawTripProperties =
        serde_json::from_value(serde_json::Value::Object(properties))
            .map_err(|_| "properties are missing required fields")?;

    let start = parse_timestamp(&raw.starttime).ok_or("unparseable start timestamp")?;
    let end = parse_timestamp(&raw.endtime).ok_or("unparseable end timestamp")?;

    // A missing or non-line geometry only disqualifies the trip from map
    // rendering; the record itself stays addressable.
    let path = match feature.geometry.map(|g| g.value) {
        Some(Value::LineString(points)) => points
            .iter()
            .filter(|p| p.len() >= 2)
            .map(|p| Coord { x: p[0], y: p[1] })
            .collect(),
        _ => Vec::new(),
    };

    Ok(Trip {
        trip_id: id_string(&raw.tripid).ok_or("tripid is not a string or number")?,
        taxi_id: id_string(&raw.taxiid).ok_or("taxiid is not a string or number")?,
        start,
        end,
        path,
        distance_m: raw.distance,
        avg_speed_kmh: raw.avspeed,
        max_speed_kmh: raw.maxspeed,
    })
}

/// Trip and taxi ids appear both as JSON strings and as bare numbers.
fn id_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    // Fall back to naive timestamps, read as UTC.
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive).fixed_offset());
        }
    }
    None
}
