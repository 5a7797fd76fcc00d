//! The trip record and the immutable store of all loaded trips

use chrono::{DateTime, FixedOffset, Timelike};
use geo_types::Coord;

/// One taxi journey: timestamps, GPS path, and precomputed metrics.
///
/// The metrics come from the data source as-is; the dashboard never
/// recomputes them.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub trip_id: String,
    pub taxi_id: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Ordered (lon, lat) path, stored as x = lon, y = lat.
    pub path: Vec<Coord<f64>>,
    pub distance_m: f64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
}

impl Trip {
    /// Trip duration in seconds, always `end - start`.
    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    /// Hour of day (0-23) the trip started, in the timestamp's own offset.
    pub fn start_hour(&self) -> u32 {
        self.start.hour()
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    /// Whether distance/speed charts may include this trip.
    ///
    /// Trips with non-positive metrics stay addressable for map display
    /// and selection, they are only dropped from the scatter data.
    pub fn chart_eligible(&self) -> bool {
        self.distance_m > 0.0 && self.avg_speed_kmh > 0.0
    }

    /// A path needs at least two points to be drawn as a line.
    pub fn has_renderable_path(&self) -> bool {
        self.path.len() >= 2
    }
}

/// All trips, loaded once at startup and never mutated.
///
/// Trips are addressed by their index in load order; the filter and the
/// selection both refer to trips through these indices.
#[derive(Debug, Default)]
pub struct TripStore {
    trips: Vec<Trip>,
}

impl TripStore {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Trip> {
        self.trips.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trip> {
        self.trips.iter()
    }

    /// Every index, in load order.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.trips.len()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn trip_at(hour: u32) -> Trip {
        let offset = FixedOffset::east_opt(0).unwrap();
        Trip {
            trip_id: format!("t{hour}"),
            taxi_id: "taxi-1".to_string(),
            start: offset.with_ymd_and_hms(2013, 9, 1, hour, 15, 0).unwrap(),
            end: offset.with_ymd_and_hms(2013, 9, 1, hour, 35, 0).unwrap(),
            path: vec![
                Coord { x: -8.61, y: 41.14 },
                Coord { x: -8.60, y: 41.15 },
            ],
            distance_m: 3200.0,
            avg_speed_kmh: 24.0,
            max_speed_kmh: 51.0,
        }
    }

    #[test]
    fn duration_is_end_minus_start() {
        let trip = trip_at(7);
        assert_eq!(trip.duration_secs(), 20 * 60);
    }

    #[test]
    fn start_hour_comes_from_timestamp() {
        assert_eq!(trip_at(7).start_hour(), 7);
        assert_eq!(trip_at(23).start_hour(), 23);
    }

    #[test]
    fn zero_distance_is_not_chart_eligible() {
        let mut trip = trip_at(7);
        trip.distance_m = 0.0;
        assert!(!trip.chart_eligible());
        // Still addressable through the store.
        let store = TripStore::new(vec![trip]);
        assert!(store.get(0).is_some());
    }

    #[test]
    fn single_point_path_is_not_renderable() {
        let mut trip = trip_at(7);
        trip.path.truncate(1);
        assert!(!trip.has_renderable_path());
    }
}
