//! Core functionality for the trip dashboard
//!
//! This crate provides the trip data model, the shared selection/filter
//! state, and the event dispatch that keeps the views consistent.

pub mod events;
pub mod filter;
pub mod palette;
pub mod state;
pub mod trip;

// Re-export commonly used types
pub use events::{subscriber_from_fn, DashboardEvent, EventDispatcher, EventKind, EventSubscriber};
pub use filter::{filter_by_hour, hour_of};
pub use state::{CommitHandle, DashboardContext, FilterState, Preview, PreviewHandle};
pub use trip::{Trip, TripStore};
