//! Viewport - manages the dockable trip views

use ahash::AHashMap;
use egui::Ui;
use egui_dock::{DockArea, DockState, TabViewer};

use trips_core::DashboardContext;

use crate::{TripView, TripViewId};

/// The main viewport holding the dockable views.
pub struct Viewport {
    dock_state: DockState<TripViewId>,
    views: AHashMap<TripViewId, Box<dyn TripView>>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            dock_state: DockState::new(vec![]),
            views: AHashMap::new(),
        }
    }

    /// Add a view to the viewport
    pub fn add_view(&mut self, view: Box<dyn TripView>) {
        let id = view.id();
        tracing::debug!(title = view.title(), "adding view");
        self.views.insert(id, view);

        if self.dock_state.main_surface().is_empty() {
            self.dock_state = DockState::new(vec![id]);
        } else {
            self.dock_state.push_to_first_leaf(id);
        }
    }

    /// Draw the viewport
    pub fn ui(&mut self, ui: &mut Ui, ctx: &DashboardContext) {
        let available_rect = ui.available_rect_before_wrap();
        ui.allocate_ui(available_rect.size(), |ui| {
            DockArea::new(&mut self.dock_state)
                .show_close_buttons(false)
                .draggable_tabs(true)
                .show_inside(
                    ui,
                    &mut ViewportTabViewer {
                        views: &mut self.views,
                        ctx,
                    },
                );
        });
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Tab viewer for egui_dock
struct ViewportTabViewer<'a> {
    views: &'a mut AHashMap<TripViewId, Box<dyn TripView>>,
    ctx: &'a DashboardContext,
}

impl<'a> TabViewer for ViewportTabViewer<'a> {
    type Tab = TripViewId;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        if let Some(view) = self.views.get(tab) {
            view.title().into()
        } else {
            "Unknown".into()
        }
    }

    fn ui(&mut self, ui: &mut Ui, tab: &mut Self::Tab) {
        if let Some(view) = self.views.get_mut(tab) {
            view.ui(self.ctx, ui);
        }
    }
}
