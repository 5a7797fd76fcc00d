//! Main application entry point

use std::sync::mpsc::{Receiver, TryRecvError};

use anyhow::Result;
use eframe::egui::{self, Context, Ui};
use tracing::{error, info};

use trips_core::{subscriber_from_fn, DashboardContext, TripStore};
use trips_data::{DataError, GeoJsonSource, TripSource};
use trips_views::{HourBarView, MapView, ScatterView, StatsPanel, TripView, TripViewId, Viewport};

const DEFAULT_DATA_PATH: &str = "data/trips.json";

/// Lifecycle of the dashboard between startup and first paint of data.
enum AppPhase {
    Loading,
    Ready(DashboardContext),
    Failed(String),
}

/// Main application state
struct TripDashboardApp {
    phase: AppPhase,

    /// The viewport managing all docked views
    viewport: Viewport,

    stats: StatsPanel,

    /// Receives the one-shot load result from the background task.
    load_rx: Receiver<Result<TripStore, DataError>>,

    /// Tokio runtime, kept alive for the lifetime of the app
    _runtime: tokio::runtime::Runtime,
}

impl TripDashboardApp {
    fn new(cc: &eframe::CreationContext<'_>, data_path: String) -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()?;

        let (tx, load_rx) = std::sync::mpsc::channel();
        let egui_ctx = cc.egui_ctx.clone();
        let source = GeoJsonSource::new(std::path::PathBuf::from(data_path));
        runtime.spawn(async move {
            info!(source = source.source_name(), "loading trips");
            let result = source.load().await;
            if tx.send(result).is_ok() {
                egui_ctx.request_repaint();
            }
        });

        Ok(Self {
            phase: AppPhase::Loading,
            viewport: Viewport::new(),
            stats: StatsPanel::default(),
            load_rx,
            _runtime: runtime,
        })
    }

    /// Build the shared context and the three views once the store arrives.
    fn on_store_loaded(&mut self, store: TripStore, egui_ctx: &Context) {
        info!(trips = store.len(), "trip store ready");
        let ctx = DashboardContext::new(store);

        // Any committed change means the frame on screen is stale.
        let repaint_ctx = egui_ctx.clone();
        ctx.dispatcher
            .subscribe(subscriber_from_fn(move |_event| repaint_ctx.request_repaint()));

        let views: Vec<Box<dyn TripView>> = vec![
            Box::new(MapView::new(TripViewId::new_v4(), "Map".to_string())),
            Box::new(HourBarView::new(TripViewId::new_v4(), "Trips by Hour".to_string())),
            Box::new(ScatterView::new(
                TripViewId::new_v4(),
                "Distance vs Speed".to_string(),
            )),
        ];
        for view in views {
            self.viewport.add_view(view);
        }

        self.phase = AppPhase::Ready(ctx);
    }

    fn poll_load(&mut self, egui_ctx: &Context) {
        if !matches!(self.phase, AppPhase::Loading) {
            return;
        }
        match self.load_rx.try_recv() {
            Ok(Ok(store)) => self.on_store_loaded(store, egui_ctx),
            Ok(Err(e)) => {
                error!(error = %e, "trip data failed to load");
                self.phase = AppPhase::Failed(e.to_string());
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.phase = AppPhase::Failed("data loading task stopped unexpectedly".to_string());
            }
        }
    }

    fn handle_shortcuts(&self, egui_ctx: &Context) {
        let AppPhase::Ready(ctx) = &self.phase else {
            return;
        };
        let reset_pressed = egui_ctx.input(|i| {
            i.key_pressed(egui::Key::Escape)
                || (i.modifiers.command && i.key_pressed(egui::Key::R))
        });
        if reset_pressed {
            ctx.commit_handle().reset();
        }
    }

    fn show_loading_screen(&self, ui: &mut Ui) {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.spinner();
                ui.label("Loading trip data...");
            });
        });
    }

    fn show_error_screen(&self, ui: &mut Ui, message: &str) {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    egui::RichText::new("Failed to load trip data")
                        .heading()
                        .color(egui::Color32::from_rgb(0xE7, 0x4C, 0x3C)),
                );
                ui.add_space(8.0);
                ui.label(message);
            });
        });
    }
}

impl eframe::App for TripDashboardApp {
    fn update(&mut self, egui_ctx: &Context, _frame: &mut eframe::Frame) {
        self.poll_load(egui_ctx);
        self.handle_shortcuts(egui_ctx);

        egui::TopBottomPanel::top("status_strip").show(egui_ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Taxi Trip Dashboard").strong());
                ui.separator();
                match &self.phase {
                    AppPhase::Ready(ctx) => {
                        self.stats.ui(ctx, ui);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Reset").clicked() {
                                ctx.commit_handle().reset();
                            }
                        });
                    }
                    AppPhase::Loading => {
                        ui.label("loading...");
                    }
                    AppPhase::Failed(_) => {
                        ui.label("no data");
                    }
                }
            });
        });

        egui::CentralPanel::default().show(egui_ctx, |ui| match &self.phase {
            AppPhase::Loading => self.show_loading_screen(ui),
            AppPhase::Failed(message) => {
                let message = message.clone();
                self.show_error_screen(ui, &message);
            }
            AppPhase::Ready(ctx) => {
                let ctx = ctx.clone();
                self.viewport.ui(ui, &ctx);
            }
        });
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let data_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
    info!(data_path, "starting taxi trip dashboard");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0]),
        default_theme: eframe::Theme::Dark,
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Taxi Trip Dashboard",
        options,
        Box::new(move |cc| Box::new(TripDashboardApp::new(cc, data_path).expect("app init"))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
