//! Shared selection/filter state and the dashboard context
//!
//! There is exactly one writer path into [`FilterState`]: the reducer the
//! context registers on its own dispatcher. Views read the state and the
//! store, and interact through two capability handles — [`CommitHandle`]
//! publishes events, [`PreviewHandle`] touches only the transient hover
//! preview. Hover can therefore never persist a filter.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::events::{subscriber_from_fn, DashboardEvent, EventDispatcher};
use crate::filter::filter_by_hour;
use crate::trip::TripStore;

/// The committed cross-view state. Lifetime = dashboard session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// At most one selected trip, by store index.
    pub selected: Option<usize>,
    /// Hour-of-day filter, or `None` for "no filter".
    pub current_filter: Option<u8>,
    /// Store indices matching `current_filter`, in load order.
    /// Set exactly when `current_filter` is set.
    pub filtered: Option<Vec<usize>>,
}

impl FilterState {
    /// The set of trips the map currently shows.
    pub fn displayed(&self, store: &TripStore) -> Vec<usize> {
        match &self.filtered {
            Some(indices) => indices.clone(),
            None => store.all_indices(),
        }
    }

    fn is_displayed(&self, store: &TripStore, index: usize) -> bool {
        match &self.filtered {
            Some(indices) => indices.contains(&index),
            None => index < store.len(),
        }
    }
}

/// Transient hover state. Never part of [`FilterState`], never committed;
/// mouse-out restores it to default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Preview {
    /// Trip highlighted by hovering a map path or scatter point.
    pub highlighted_trip: Option<usize>,
    /// Bar currently under the cursor.
    pub hovered_hour: Option<u8>,
}

/// Everything a view needs: the store, the committed state, the hover
/// preview, and the dispatcher. Passed explicitly into view constructors
/// and render calls instead of living in ambient globals.
#[derive(Clone)]
pub struct DashboardContext {
    pub store: Arc<TripStore>,
    pub state: Arc<RwLock<FilterState>>,
    pub preview: Arc<RwLock<Preview>>,
    pub dispatcher: Arc<EventDispatcher>,
    revision: Arc<AtomicU64>,
}

impl DashboardContext {
    /// Build the context and register the state reducer as the first
    /// dispatcher subscriber, so state is up to date before any other
    /// subscriber (e.g. a repaint hook) runs.
    pub fn new(store: TripStore) -> Self {
        let store = Arc::new(store);
        let state = Arc::new(RwLock::new(FilterState::default()));
        let preview = Arc::new(RwLock::new(Preview::default()));
        let dispatcher = Arc::new(EventDispatcher::new());
        let revision = Arc::new(AtomicU64::new(0));

        {
            let store = store.clone();
            let state = state.clone();
            let preview = preview.clone();
            let revision = revision.clone();
            dispatcher.subscribe(subscriber_from_fn(move |event| {
                let mut state = state.write();
                reduce(&mut state, &store, event);
                match event {
                    DashboardEvent::Reset => *preview.write() = Preview::default(),
                    // The displayed set just changed; a trip preview taken
                    // against the old set must not outlive it.
                    DashboardEvent::HourFiltered { .. } => {
                        preview.write().highlighted_trip = None;
                    }
                    DashboardEvent::TripSelected { .. } => {}
                }
                revision.fetch_add(1, Ordering::Relaxed);
            }));
        }

        Self {
            store,
            state,
            preview,
            dispatcher,
            revision,
        }
    }

    /// Monotonic counter bumped on every committed state change. Views use
    /// it to cache derived chart data across hover-only frames.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    /// Capability to commit state changes through the dispatcher.
    pub fn commit_handle(&self) -> CommitHandle {
        CommitHandle {
            dispatcher: self.dispatcher.clone(),
        }
    }

    /// Capability to update the hover preview, and nothing else.
    pub fn preview_handle(&self) -> PreviewHandle {
        PreviewHandle {
            preview: self.preview.clone(),
        }
    }
}

/// The single reducer for committed state.
fn reduce(state: &mut FilterState, store: &TripStore, event: &DashboardEvent) {
    match event {
        DashboardEvent::TripSelected { index } => {
            if !state.is_displayed(store, *index) {
                warn!(index, "selected trip is not in the displayed set; ignoring");
                return;
            }
            debug!(index, "trip selected");
            state.selected = Some(*index);
            // Selection never touches the filter.
        }
        DashboardEvent::HourFiltered { hour: Some(hour) } => {
            if *hour > 23 {
                warn!(hour, "hour filter out of range; ignoring");
                return;
            }
            debug!(hour, "hour filter applied");
            state.current_filter = Some(*hour);
            state.filtered = Some(filter_by_hour(store, *hour));
        }
        DashboardEvent::HourFiltered { hour: None } => {
            debug!("hour filter cleared");
            state.current_filter = None;
            state.filtered = None;
        }
        DashboardEvent::Reset => {
            debug!("state reset");
            *state = FilterState::default();
        }
    }
}

/// Publishes state-changing events. Produced from a [`DashboardContext`];
/// holding one does not grant preview access.
#[derive(Clone)]
pub struct CommitHandle {
    dispatcher: Arc<EventDispatcher>,
}

impl CommitHandle {
    pub fn select_trip(&self, index: usize) {
        self.dispatcher.publish(DashboardEvent::TripSelected { index });
    }

    pub fn filter_hour(&self, hour: Option<u8>) {
        self.dispatcher.publish(DashboardEvent::HourFiltered { hour });
    }

    pub fn reset(&self) {
        self.dispatcher.publish(DashboardEvent::Reset);
    }
}

/// Writes the hover preview. Cannot publish events or reach the committed
/// state, so a hover path cannot accidentally become a filter.
#[derive(Clone)]
pub struct PreviewHandle {
    preview: Arc<RwLock<Preview>>,
}

impl PreviewHandle {
    pub fn preview_trip(&self, index: usize) {
        self.preview.write().highlighted_trip = Some(index);
    }

    pub fn clear_trip_preview(&self) {
        self.preview.write().highlighted_trip = None;
    }

    pub fn preview_hour(&self, hour: u8) {
        self.preview.write().hovered_hour = Some(hour);
    }

    pub fn clear_hour_preview(&self) {
        self.preview.write().hovered_hour = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::Trip;
    use chrono::{FixedOffset, TimeZone};
    use geo_types::Coord;

    fn trip_at(hour: u32, id: &str) -> Trip {
        let offset = FixedOffset::east_opt(0).unwrap();
        Trip {
            trip_id: id.to_string(),
            taxi_id: "taxi-9".to_string(),
            start: offset.with_ymd_and_hms(2013, 9, 1, hour, 10, 0).unwrap(),
            end: offset.with_ymd_and_hms(2013, 9, 1, hour, 30, 0).unwrap(),
            path: vec![
                Coord { x: -8.61, y: 41.14 },
                Coord { x: -8.60, y: 41.15 },
            ],
            distance_m: 2500.0,
            avg_speed_kmh: 21.0,
            max_speed_kmh: 44.0,
        }
    }

    fn context_with_hours(hours: &[u32]) -> DashboardContext {
        let trips = hours
            .iter()
            .enumerate()
            .map(|(i, &h)| trip_at(h, &format!("t{i}")))
            .collect();
        DashboardContext::new(TripStore::new(trips))
    }

    #[test]
    fn hour_filter_recomputes_filtered_set() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();

        commit.filter_hour(Some(7));
        let state = ctx.state.read().clone();
        assert_eq!(state.current_filter, Some(7));
        assert_eq!(state.filtered, Some(vec![0, 1]));

        commit.filter_hour(Some(14));
        assert_eq!(ctx.state.read().filtered, Some(vec![2]));
    }

    #[test]
    fn clearing_filter_restores_full_display() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();

        commit.filter_hour(Some(7));
        commit.filter_hour(None);

        let state = ctx.state.read();
        assert_eq!(state.current_filter, None);
        assert_eq!(state.filtered, None);
        assert_eq!(state.displayed(&ctx.store), vec![0, 1, 2]);
    }

    #[test]
    fn selection_does_not_touch_filter() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();

        commit.filter_hour(Some(7));
        commit.select_trip(1);

        let state = ctx.state.read();
        assert_eq!(state.selected, Some(1));
        assert_eq!(state.current_filter, Some(7));
        assert_eq!(state.filtered, Some(vec![0, 1]));
    }

    #[test]
    fn selecting_outside_displayed_set_is_a_no_op() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();

        // Not displayed while hour 7 is active.
        commit.filter_hour(Some(7));
        commit.select_trip(2);
        assert_eq!(ctx.state.read().selected, None);

        // Out of bounds entirely.
        commit.filter_hour(None);
        commit.select_trip(99);
        assert_eq!(ctx.state.read().selected, None);
    }

    #[test]
    fn hour_filter_commit_clears_stale_trip_preview() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let preview = ctx.preview_handle();

        // Hovering trip 2, then filtering it out of the displayed set.
        preview.preview_trip(2);
        preview.preview_hour(7);
        ctx.commit_handle().filter_hour(Some(7));

        assert_eq!(ctx.preview.read().highlighted_trip, None);
        // The hour hover is still valid; the bar set never changes.
        assert_eq!(ctx.preview.read().hovered_hour, Some(7));
    }

    #[test]
    fn out_of_range_hour_filter_is_ignored() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();

        commit.filter_hour(Some(30));
        assert_eq!(*ctx.state.read(), FilterState::default());

        // A valid filter must not be clobbered by a later bad one.
        commit.filter_hour(Some(7));
        commit.filter_hour(Some(200));
        let state = ctx.state.read();
        assert_eq!(state.current_filter, Some(7));
        assert_eq!(state.filtered, Some(vec![0, 1]));
    }

    #[test]
    fn reset_restores_initial_state_exactly() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();

        commit.filter_hour(Some(7));
        commit.select_trip(0);
        ctx.preview_handle().preview_trip(1);
        commit.reset();

        assert_eq!(*ctx.state.read(), FilterState::default());
        assert_eq!(*ctx.preview.read(), Preview::default());
    }

    #[test]
    fn hover_preview_leaves_committed_state_untouched() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();
        let preview = ctx.preview_handle();

        commit.filter_hour(Some(7));
        let before = ctx.state.read().clone();
        let revision_before = ctx.revision();

        preview.preview_trip(0);
        preview.preview_hour(3);
        preview.clear_trip_preview();
        preview.clear_hour_preview();

        assert_eq!(*ctx.state.read(), before);
        assert_eq!(ctx.revision(), revision_before);
        assert_eq!(*ctx.preview.read(), Preview::default());
    }

    #[test]
    fn interleaved_hover_click_hover_keeps_state_consistent() {
        let ctx = context_with_hours(&[7, 7, 14]);
        let commit = ctx.commit_handle();
        let preview = ctx.preview_handle();

        // hover a bar, click it, hover another while the filter holds
        preview.preview_hour(7);
        commit.filter_hour(Some(7));
        preview.clear_hour_preview();
        preview.preview_hour(14);

        let state = ctx.state.read().clone();
        assert_eq!(state.current_filter, Some(7));
        assert_eq!(state.filtered, Some(vec![0, 1]));
        assert_eq!(ctx.preview.read().hovered_hour, Some(14));

        // un-hover: the committed filter must survive untouched
        preview.clear_hour_preview();
        assert_eq!(*ctx.state.read(), state);
    }

    #[test]
    fn revision_bumps_only_on_committed_changes() {
        let ctx = context_with_hours(&[7]);
        let start = ctx.revision();
        ctx.commit_handle().filter_hour(Some(7));
        assert_eq!(ctx.revision(), start + 1);
        ctx.commit_handle().reset();
        assert_eq!(ctx.revision(), start + 2);
    }
}
