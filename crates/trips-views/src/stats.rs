//! Status strip: trip totals, filter/selection summary, selected trip details

use egui::{Color32, RichText, Ui};

use trips_core::{DashboardContext, FilterState, Trip, TripStore};

/// Renders the status line and, when a trip is selected, its details.
#[derive(Debug, Default)]
pub struct StatsPanel;

/// "Total Trips: N"
pub fn total_line(store: &TripStore) -> String {
    format!("Total Trips: {}", store.len())
}

/// Second status line. The active filter takes priority over the
/// selection summary.
pub fn status_line(store: &TripStore, state: &FilterState) -> String {
    if let Some(hour) = state.current_filter {
        let count = state.displayed(store).len();
        format!("Filtered: {count} (Hour {hour}:00)")
    } else if state.selected.is_some() {
        "Selected: 1".to_string()
    } else {
        "Selected: 0".to_string()
    }
}

impl StatsPanel {
    pub fn ui(&self, ctx: &DashboardContext, ui: &mut Ui) {
        let state = ctx.state.read().clone();

        ui.horizontal(|ui| {
            ui.label(RichText::new(total_line(&ctx.store)).strong());
            ui.separator();
            ui.label(status_line(&ctx.store, &state));

            if let Some(hour) = ctx.preview.read().hovered_hour {
                ui.separator();
                ui.label(
                    RichText::new(format!("Hour {hour}:00")).color(Color32::from_gray(140)),
                );
            }
        });

        if let Some(trip) = state.selected.and_then(|i| ctx.store.get(i)) {
            ui.separator();
            self.trip_details(trip, ui);
        }
    }

    fn trip_details(&self, trip: &Trip, ui: &mut Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new(format!("Trip {}", trip.trip_id)).strong());
            ui.label(format!("Taxi {}", trip.taxi_id));
            ui.separator();
            ui.label(format!(
                "{} to {}",
                trip.start.format("%H:%M:%S"),
                trip.end.format("%H:%M:%S"),
            ));
            ui.separator();
            ui.label(format!("{:.2} km", trip.distance_km()));
            ui.label(format!("{:.1} min", trip.duration_secs() as f64 / 60.0));
            ui.separator();
            ui.label(format!("avg {:.1} km/h", trip.avg_speed_kmh));
            ui.label(format!("max {:.1} km/h", trip.max_speed_kmh));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn trip_at_hour(hour: u32) -> Trip {
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = tz.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap();
        Trip {
            trip_id: format!("t-{hour}"),
            taxi_id: "taxi".to_string(),
            start,
            end: start + chrono::Duration::minutes(12),
            path: vec![],
            distance_m: 2500.0,
            avg_speed_kmh: 18.0,
            max_speed_kmh: 35.0,
        }
    }

    fn store() -> TripStore {
        TripStore::new(vec![trip_at_hour(7), trip_at_hour(7), trip_at_hour(14)])
    }

    #[test]
    fn total_line_counts_the_whole_store() {
        assert_eq!(total_line(&store()), "Total Trips: 3");
    }

    #[test]
    fn status_line_defaults_to_zero_selection() {
        assert_eq!(status_line(&store(), &FilterState::default()), "Selected: 0");
    }

    #[test]
    fn status_line_reports_selection() {
        let store = store();
        let ctx = DashboardContext::new(store);
        ctx.commit_handle().select_trip(1);
        assert_eq!(status_line(&ctx.store, &ctx.state.read()), "Selected: 1");
    }

    #[test]
    fn filter_summary_takes_priority_over_selection() {
        let ctx = DashboardContext::new(store());
        ctx.commit_handle().filter_hour(Some(7));
        ctx.commit_handle().select_trip(0);
        assert_eq!(
            status_line(&ctx.store, &ctx.state.read()),
            "Filtered: 2 (Hour 7:00)"
        );
    }
}
