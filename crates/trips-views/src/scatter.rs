//! Distance vs. average speed scatter plot
//!
//! Plots the currently displayed set, one point per chart-eligible trip,
//! colored by start hour. Point data is cached and only rebuilt when the
//! committed state revision changes, so hover-only frames reuse it.

use ahash::AHashMap;
use egui::Ui;
use egui_plot::{MarkerShape, Plot, PlotPoints, Points};

use trips_core::palette::{hour_color, HIGHLIGHT_COLOR};
use trips_core::DashboardContext;

use crate::{TripView, TripViewId};

/// Scatter plot configuration
#[derive(Debug, Clone)]
pub struct ScatterConfig {
    pub point_radius: f32,
    /// Hover pick distance as a fraction of the visible plot extent
    pub hover_fraction: f64,
    pub show_tooltips: bool,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            point_radius: 3.0,
            hover_fraction: 0.02,
            show_tooltips: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ScatterPoint {
    index: usize,
    /// Distance in km
    x: f64,
    /// Average speed in km/h
    y: f64,
    hour: u32,
}

/// Scatter plot view
pub struct ScatterView {
    id: TripViewId,
    title: String,
    pub config: ScatterConfig,

    cached: Vec<ScatterPoint>,
    cached_revision: Option<u64>,
    hovered: Option<usize>,
}

impl ScatterView {
    pub fn new(id: TripViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: ScatterConfig::default(),
            cached: Vec::new(),
            cached_revision: None,
            hovered: None,
        }
    }

    fn rebuild_if_stale(&mut self, ctx: &DashboardContext) {
        let revision = ctx.revision();
        if self.cached_revision == Some(revision) {
            return;
        }
        let displayed = ctx.state.read().displayed(&ctx.store);
        self.cached = displayed
            .iter()
            .filter_map(|&index| {
                let trip = ctx.store.get(index)?;
                // Trips with a missing metric would collapse onto the axes.
                if !trip.chart_eligible() {
                    return None;
                }
                Some(ScatterPoint {
                    index,
                    x: trip.distance_km(),
                    y: trip.avg_speed_kmh,
                    hour: trip.start_hour(),
                })
            })
            .collect();
        self.cached_revision = Some(revision);
        // The displayed set may have changed under the pointer; hover is
        // re-derived from the pointer position against the new points.
        self.hovered = None;
    }
}

impl TripView for ScatterView {
    fn id(&self) -> TripViewId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn ui(&mut self, ctx: &DashboardContext, ui: &mut Ui) {
        self.rebuild_if_stale(ctx);

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Distance (km) vs avg speed (km/h)").strong());
            ui.label(
                egui::RichText::new(format!("{} trips", self.cached.len()))
                    .color(egui::Color32::from_gray(140)),
            );
        });

        if self.cached.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label("No measurable trips in the current view");
            });
            return;
        }

        let mut by_hour: AHashMap<u32, Vec<[f64; 2]>> = AHashMap::new();
        for p in &self.cached {
            by_hour.entry(p.hour).or_default().push([p.x, p.y]);
        }

        let selected = ctx.state.read().selected;
        let highlighted = ctx.preview.read().highlighted_trip.or(selected);
        let points = self.cached.clone();
        let radius = self.config.point_radius;
        let hover_fraction = self.config.hover_fraction;

        let response = Plot::new(format!("scatter_{}", self.id))
            .show_grid(true)
            .allow_boxed_zoom(false)
            .include_x(0.0)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                for (hour, coords) in by_hour {
                    plot_ui.points(
                        Points::new(PlotPoints::from(coords))
                            .radius(radius)
                            .shape(MarkerShape::Circle)
                            .color(hour_color(hour)),
                    );
                }

                if let Some(p) = highlighted.and_then(|t| points.iter().find(|p| p.index == t)) {
                    plot_ui.points(
                        Points::new(PlotPoints::from(vec![[p.x, p.y]]))
                            .radius(radius * 2.5)
                            .shape(MarkerShape::Circle)
                            .color(HIGHLIGHT_COLOR),
                    );
                }

                let hovered = plot_ui.pointer_coordinate().and_then(|pointer| {
                    let bounds = plot_ui.plot_bounds();
                    // Normalize by the visible extent so picking feels the
                    // same at any zoom level.
                    let x_tol = bounds.width() * hover_fraction;
                    let y_tol = bounds.height() * hover_fraction;
                    if x_tol <= 0.0 || y_tol <= 0.0 {
                        return None;
                    }
                    points
                        .iter()
                        .map(|p| {
                            let dx = (p.x - pointer.x) / x_tol;
                            let dy = (p.y - pointer.y) / y_tol;
                            (p.index, dx * dx + dy * dy)
                        })
                        .filter(|&(_, d)| d <= 1.0)
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                        .map(|(index, _)| index)
                });
                let clicked = plot_ui.response().clicked();
                (hovered, clicked)
            });

        let (hovered_now, clicked) = response.inner;

        if hovered_now != self.hovered {
            let preview = ctx.preview_handle();
            match hovered_now {
                Some(index) => preview.preview_trip(index),
                None => preview.clear_trip_preview(),
            }
            self.hovered = hovered_now;
        }

        if self.config.show_tooltips {
            if let Some(trip) = hovered_now.and_then(|i| ctx.store.get(i)) {
                response.response.on_hover_text(format!(
                    "Trip {}\nDistance: {:.2} km\nAvg speed: {:.1} km/h\nStart: {}",
                    trip.trip_id,
                    trip.distance_km(),
                    trip.avg_speed_kmh,
                    trip.start.format("%H:%M:%S"),
                ));
            }
        }

        // Clicking a point selects the trip; the displayed set is unchanged.
        if clicked {
            if let Some(index) = hovered_now {
                ctx.commit_handle().select_trip(index);
            }
        }
    }
}
