//! Hour-of-day filtering
//!
//! Filtering is a pure function over the store: it never mutates its
//! input and re-filtering by the same hour is a fixpoint.

use crate::trip::{Trip, TripStore};

/// Hour of day (0-23) a trip started.
pub fn hour_of(trip: &Trip) -> u8 {
    trip.start_hour() as u8
}

/// Indices of all trips starting in the given hour, in load order.
pub fn filter_by_hour(store: &TripStore, hour: u8) -> Vec<usize> {
    store
        .iter()
        .enumerate()
        .filter(|(_, trip)| hour_of(trip) == hour)
        .map(|(index, _)| index)
        .collect()
}
