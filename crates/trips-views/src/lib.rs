//! View system for the trip dashboard
//!
//! Each view renders itself from the shared [`DashboardContext`] every
//! frame; none of them holds authoritative state. Clicks go through the
//! context's commit handle, hovers through the preview handle.

mod hour_bar;
mod map_view;
mod scatter;
mod stats;
mod viewport;

pub use hour_bar::{HourBarConfig, HourBarView};
pub use map_view::{MapView, MapViewConfig};
pub use scatter::{ScatterConfig, ScatterView};
pub use stats::StatsPanel;
pub use viewport::Viewport;

use egui::Ui;
use trips_core::DashboardContext;

/// Unique identifier for a trip view
pub type TripViewId = uuid::Uuid;

/// Base trait for all dockable trip views
pub trait TripView: Send {
    /// Get the unique ID of this view
    fn id(&self) -> TripViewId;

    /// Get the display name
    fn title(&self) -> &str;

    /// Draw the UI from the current context
    fn ui(&mut self, ctx: &DashboardContext, ui: &mut Ui);
}
