//! Hourly trip-count bar chart
//!
//! Counts are always taken over the full store, not the filtered set, so
//! the chart stays a stable overview while the other views narrow down.
//! Clicking a bar toggles the hour filter; clicking the active bar again
//! clears it.

use egui::{Color32, Stroke, Ui};
use egui_plot::{Bar, BarChart, Plot};

use trips_core::palette::hour_color;
use trips_core::{hour_of, DashboardContext, TripStore};

use crate::{TripView, TripViewId};

/// Hour bar chart configuration
#[derive(Debug, Clone)]
pub struct HourBarConfig {
    pub bar_width: f64,
    pub show_tooltips: bool,
}

impl Default for HourBarConfig {
    fn default() -> Self {
        Self {
            bar_width: 0.85,
            show_tooltips: true,
        }
    }
}

/// Bar chart of trip counts per start hour
pub struct HourBarView {
    id: TripViewId,
    title: String,
    pub config: HourBarConfig,

    /// Counts over the full store. The store is immutable for the lifetime
    /// of the dashboard, so this is computed once.
    counts: Option<[usize; 24]>,
    hovered: Option<u8>,
}

/// Trip counts per start hour over the whole store. Every hour gets a
/// slot even when its count is zero.
pub fn hour_counts(store: &TripStore) -> [usize; 24] {
    let mut counts = [0usize; 24];
    for trip in store.iter() {
        counts[hour_of(trip) as usize % 24] += 1;
    }
    counts
}

impl HourBarView {
    pub fn new(id: TripViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: HourBarConfig::default(),
            counts: None,
            hovered: None,
        }
    }

    fn counts(&mut self, ctx: &DashboardContext) -> [usize; 24] {
        *self.counts.get_or_insert_with(|| hour_counts(&ctx.store))
    }
}

impl TripView for HourBarView {
    fn id(&self) -> TripViewId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn ui(&mut self, ctx: &DashboardContext, ui: &mut Ui) {
        let counts = self.counts(ctx);
        let active = ctx.state.read().current_filter;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Trips by start hour").strong());
            if let Some(hour) = active {
                ui.label(
                    egui::RichText::new(format!("filtering {hour}:00"))
                        .color(Color32::from_gray(140)),
                );
            }
        });

        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(hour, &count)| {
                let mut fill = hour_color(hour as u32);
                if self.hovered == Some(hour as u8) {
                    fill = fill.gamma_multiply(1.3);
                }
                let mut bar = Bar::new(hour as f64, count as f64)
                    .width(self.config.bar_width)
                    .fill(fill);
                if active == Some(hour as u8) {
                    bar = bar.stroke(Stroke::new(2.0, Color32::WHITE));
                }
                bar
            })
            .collect();

        let response = Plot::new(format!("hour_bars_{}", self.id))
            .show_grid(false)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .include_x(-0.5)
            .include_x(23.5)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));

                let hovered = plot_ui.pointer_coordinate().and_then(|p| {
                    let hour = p.x.round();
                    if !(0.0..24.0).contains(&hour) {
                        return None;
                    }
                    let hour = hour as usize;
                    // Only the bar body counts, not the empty space above it.
                    if (p.x - hour as f64).abs() > self.config.bar_width / 2.0 {
                        return None;
                    }
                    if p.y < 0.0 || p.y > counts[hour] as f64 {
                        return None;
                    }
                    Some(hour as u8)
                });
                let clicked = plot_ui.response().clicked();
                (hovered, clicked)
            });

        let (hovered_now, clicked) = response.inner;

        if hovered_now != self.hovered {
            let preview = ctx.preview_handle();
            match hovered_now {
                Some(hour) => preview.preview_hour(hour),
                None => preview.clear_hour_preview(),
            }
            self.hovered = hovered_now;
        }

        if self.config.show_tooltips {
            if let Some(hour) = hovered_now {
                response
                    .response
                    .on_hover_text(format!("Hour {hour}:00\n{} trips", counts[hour as usize]));
            }
        }

        if clicked {
            if let Some(hour) = hovered_now {
                let commit = ctx.commit_handle();
                if active == Some(hour) {
                    commit.filter_hour(None);
                } else {
                    commit.filter_hour(Some(hour));
                }
            }
        }
    }
}
