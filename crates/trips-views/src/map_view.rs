//! Map view: trip paths drawn with the egui painter
//!
//! Tile rendering is out of scope; paths are projected equirectangularly
//! into the widget rect and colored by start hour. The per-trip screen
//! geometry is rebuilt from scratch every frame, which also makes window
//! resizes trivially safe.

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui};
use geo_types::Coord;

use trips_core::palette::{hour_color, with_opacity, HIGHLIGHT_COLOR};
use trips_core::{DashboardContext, Trip};

use crate::{TripView, TripViewId};

const MAP_BACKGROUND: Color32 = Color32::from_rgb(230, 240, 250);
const START_MARKER: Color32 = Color32::from_rgb(0x2E, 0xCC, 0x40);
const END_MARKER: Color32 = Color32::from_rgb(0xFF, 0x41, 0x36);

/// Map view configuration
#[derive(Debug, Clone)]
pub struct MapViewConfig {
    /// Path weight when many trips are displayed
    pub multi_trip_weight: f32,
    /// Path weight in single-trip mode
    pub single_trip_weight: f32,
    pub multi_trip_opacity: f32,
    pub single_trip_opacity: f32,
    /// Opacity applied to non-highlighted paths while one is highlighted
    pub dimmed_opacity: f32,
    pub highlight_weight: f32,
    /// Pointer distance (px) within which a path counts as hovered
    pub hit_radius: f32,
    pub show_tooltips: bool,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            multi_trip_weight: 2.0,
            single_trip_weight: 5.0,
            multi_trip_opacity: 0.7,
            single_trip_opacity: 1.0,
            dimmed_opacity: 0.3,
            highlight_weight: 4.0,
            hit_radius: 8.0,
            show_tooltips: true,
        }
    }
}

/// Map view
pub struct MapView {
    id: TripViewId,
    title: String,
    pub config: MapViewConfig,

    /// Trip this view previewed last frame, so mouse-out can revert it.
    hovered: Option<usize>,
    /// Committed revision the hover state was taken against.
    seen_revision: Option<u64>,
}

/// Screen-space path for one displayed trip. Owned by the map view and
/// rebuilt on every redraw; nothing else may hold onto it.
struct TripPath {
    index: usize,
    points: Vec<Pos2>,
    hour: u32,
}

impl MapView {
    pub fn new(id: TripViewId, title: String) -> Self {
        Self {
            id,
            title,
            config: MapViewConfig::default(),
            hovered: None,
            seen_revision: None,
        }
    }

    /// A commit can remove the hovered trip from the displayed set without
    /// any pointer movement, so hover tracking restarts from scratch and is
    /// re-derived from the pointer position on the same frame.
    fn sync_with_revision(&mut self, ctx: &DashboardContext) {
        let revision = ctx.revision();
        if self.seen_revision != Some(revision) {
            self.seen_revision = Some(revision);
            self.hovered = None;
        }
    }

    fn build_paths(
        &self,
        ctx: &DashboardContext,
        displayed: &[usize],
        projector: &Projector,
    ) -> Vec<TripPath> {
        displayed
            .iter()
            .filter_map(|&index| {
                let trip = ctx.store.get(index)?;
                if !trip.has_renderable_path() {
                    // Degrades only the map; the trip stays selectable elsewhere.
                    return None;
                }
                Some(TripPath {
                    index,
                    points: trip.path.iter().map(|c| projector.project(c)).collect(),
                    hour: trip.start_hour(),
                })
            })
            .collect()
    }

    fn baseline_stroke(&self, path: &TripPath, single_trip: bool) -> Stroke {
        let (weight, opacity) = if single_trip {
            (self.config.single_trip_weight, self.config.single_trip_opacity)
        } else {
            (self.config.multi_trip_weight, self.config.multi_trip_opacity)
        };
        Stroke::new(weight, with_opacity(hour_color(path.hour), opacity))
    }

    fn dimmed_stroke(&self, path: &TripPath, single_trip: bool) -> Stroke {
        let weight = if single_trip {
            self.config.single_trip_weight
        } else {
            self.config.multi_trip_weight
        };
        Stroke::new(weight, with_opacity(hour_color(path.hour), self.config.dimmed_opacity))
    }

    fn draw_markers(&self, painter: &egui::Painter, points: &[Pos2]) {
        let (Some(start), Some(end)) = (points.first(), points.last()) else {
            return;
        };
        for (pos, color) in [(start, START_MARKER), (end, END_MARKER)] {
            painter.circle_filled(*pos, 6.0, color);
            painter.circle_stroke(*pos, 6.0, Stroke::new(1.5, Color32::WHITE));
        }
    }

    fn tooltip_text(trip: &Trip) -> String {
        format!(
            "Trip {}\nTaxi: {}\nDistance: {:.2} km\nDuration: {:.1} min\nAvg speed: {:.1} km/h\n{} - {}",
            trip.trip_id,
            trip.taxi_id,
            trip.distance_km(),
            trip.duration_secs() as f64 / 60.0,
            trip.avg_speed_kmh,
            trip.start.format("%H:%M:%S"),
            trip.end.format("%H:%M:%S"),
        )
    }
}

impl TripView for MapView {
    fn id(&self) -> TripViewId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn ui(&mut self, ctx: &DashboardContext, ui: &mut Ui) {
        self.sync_with_revision(ctx);
        let displayed = ctx.state.read().displayed(&ctx.store);

        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
        let rect = response.rect;
        painter.rect_filled(rect, Rounding::ZERO, MAP_BACKGROUND);

        let coords = displayed
            .iter()
            .filter_map(|&i| ctx.store.get(i))
            .filter(|t| t.has_renderable_path())
            .flat_map(|t| t.path.iter());
        let Some(projector) = Projector::fit(rect, coords) else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No trip paths to display",
                FontId::proportional(14.0),
                Color32::from_gray(100),
            );
            return;
        };

        let paths = self.build_paths(ctx, &displayed, &projector);
        let single_trip = displayed.len() == 1;

        // Hover detection against the rebuilt geometry.
        let hovered_now = response.hover_pos().and_then(|pointer| {
            let mut best: Option<(usize, f32)> = None;
            for path in &paths {
                for pair in path.points.windows(2) {
                    let d = point_segment_distance(pointer, pair[0], pair[1]);
                    if d <= self.config.hit_radius && best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((path.index, d));
                    }
                }
            }
            best.map(|(index, _)| index)
        });

        // Hover is a preview: it goes straight to the preview handle and is
        // reverted on mouse-out, never through the dispatcher.
        if hovered_now != self.hovered {
            let preview = ctx.preview_handle();
            match hovered_now {
                Some(index) => preview.preview_trip(index),
                None => preview.clear_trip_preview(),
            }
            self.hovered = hovered_now;
        }

        // A click is a commit.
        if response.clicked() {
            if let Some(index) = hovered_now {
                ctx.commit_handle().select_trip(index);
            }
        }

        // Preview highlight wins over the committed selection.
        let selected = ctx.state.read().selected;
        let highlighted = ctx.preview.read().highlighted_trip.or(selected);

        match highlighted {
            Some(target) => {
                for path in paths.iter().filter(|p| p.index != target) {
                    painter.add(Shape::line(
                        path.points.clone(),
                        self.dimmed_stroke(path, single_trip),
                    ));
                }
                if let Some(path) = paths.iter().find(|p| p.index == target) {
                    painter.add(Shape::line(
                        path.points.clone(),
                        Stroke::new(self.config.highlight_weight, HIGHLIGHT_COLOR),
                    ));
                }
            }
            None => {
                for path in &paths {
                    painter.add(Shape::line(
                        path.points.clone(),
                        self.baseline_stroke(path, single_trip),
                    ));
                }
            }
        }

        if single_trip {
            if let Some(path) = paths.first() {
                self.draw_markers(&painter, &path.points);
            }
        }

        if self.config.show_tooltips {
            if let Some(trip) = hovered_now.and_then(|i| ctx.store.get(i)) {
                response.on_hover_text(Self::tooltip_text(trip));
            }
        }
    }
}

/// Equirectangular fit of a lon/lat bounding box into a screen rect,
/// preserving aspect ratio.
struct Projector {
    rect: Rect,
    lon_min: f64,
    lat_min: f64,
    scale: f64,
    x_offset: f32,
    y_offset: f32,
}

impl Projector {
    fn fit<'a>(rect: Rect, coords: impl Iterator<Item = &'a Coord<f64>>) -> Option<Self> {
        let mut lon_min = f64::INFINITY;
        let mut lon_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;
        let mut any = false;
        for c in coords {
            if !c.x.is_finite() || !c.y.is_finite() {
                continue;
            }
            any = true;
            lon_min = lon_min.min(c.x);
            lon_max = lon_max.max(c.x);
            lat_min = lat_min.min(c.y);
            lat_max = lat_max.max(c.y);
        }
        if !any || rect.width() < 1.0 || rect.height() < 1.0 {
            return None;
        }

        let margin = 12.0_f32;
        let usable_w = (rect.width() - 2.0 * margin).max(1.0) as f64;
        let usable_h = (rect.height() - 2.0 * margin).max(1.0) as f64;
        let lon_span = (lon_max - lon_min).max(1e-9);
        let lat_span = (lat_max - lat_min).max(1e-9);
        let scale = (usable_w / lon_span).min(usable_h / lat_span);

        // Center the fitted box inside the rect.
        let x_offset = margin + ((usable_w - lon_span * scale) / 2.0) as f32;
        let y_offset = margin + ((usable_h - lat_span * scale) / 2.0) as f32;

        Some(Self {
            rect,
            lon_min,
            lat_min,
            scale,
            x_offset,
            y_offset,
        })
    }

    fn project(&self, c: &Coord<f64>) -> Pos2 {
        let x = self.rect.left() + self.x_offset + ((c.x - self.lon_min) * self.scale) as f32;
        // Latitude grows upward, screen y grows downward.
        let y = self.rect.bottom() - self.y_offset - ((c.y - self.lat_min) * self.scale) as f32;
        Pos2::new(x, y)
    }
}

/// Distance from a point to a line segment, in screen units.
fn point_segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return (p - a).length();
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (p - closest).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use trips_core::TripStore;

    fn trip_at_hour(hour: u32) -> Trip {
        let tz = FixedOffset::east_opt(0).unwrap();
        let start = tz.with_ymd_and_hms(2024, 3, 10, hour, 0, 0).unwrap();
        Trip {
            trip_id: format!("t-{hour}"),
            taxi_id: "taxi".to_string(),
            start,
            end: start + chrono::Duration::minutes(15),
            path: vec![
                Coord { x: -8.61, y: 41.14 },
                Coord { x: -8.60, y: 41.15 },
            ],
            distance_m: 3000.0,
            avg_speed_kmh: 22.0,
            max_speed_kmh: 45.0,
        }
    }

    #[test]
    fn commit_restarts_hover_tracking() {
        let ctx = DashboardContext::new(TripStore::new(vec![
            trip_at_hour(7),
            trip_at_hour(14),
        ]));
        let mut view = MapView::new(TripViewId::new_v4(), "Map".to_string());
        view.sync_with_revision(&ctx);

        // Hovering trip 1, then a filter commit removes it from display.
        view.hovered = Some(1);
        ctx.commit_handle().filter_hour(Some(7));
        view.sync_with_revision(&ctx);
        assert_eq!(view.hovered, None);

        // No commit in between: hover state survives the next frame.
        view.hovered = Some(0);
        view.sync_with_revision(&ctx);
        assert_eq!(view.hovered, Some(0));
    }

    #[test]
    fn segment_distance_basics() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(point_segment_distance(Pos2::new(5.0, 3.0), a, b), 3.0);
        // Beyond the endpoints the nearest point is the endpoint itself.
        assert_eq!(point_segment_distance(Pos2::new(14.0, 3.0), a, b), 5.0);
        // Degenerate segment.
        assert_eq!(point_segment_distance(Pos2::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn projector_keeps_points_inside_rect_and_inverts_latitude() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), egui::Vec2::new(400.0, 300.0));
        let coords = vec![
            Coord { x: -8.7, y: 41.1 },
            Coord { x: -8.5, y: 41.2 },
        ];
        let projector = Projector::fit(rect, coords.iter()).unwrap();

        let south = projector.project(&coords[0]);
        let north = projector.project(&coords[1]);
        assert!(rect.contains(south) && rect.contains(north));
        // Higher latitude ends up higher on screen (smaller y).
        assert!(north.y < south.y);
        // Higher longitude ends up further right.
        assert!(north.x > south.x);
    }

    #[test]
    fn projector_rejects_empty_input() {
        let rect = Rect::from_min_size(Pos2::new(0.0, 0.0), egui::Vec2::new(100.0, 100.0));
        assert!(Projector::fit(rect, std::iter::empty()).is_none());
    }
}
