//! # Application State Management
//!
//! This module implements the central `AppState` struct which owns the
//! planner session and coordinates the rendering of all UI components. It
//! implements the `eframe::App` trait to integrate with the egui application
//! framework.
//!
//! ## Responsibilities
//!
//! - Shows the map loader until a map is open, then the planner panels
//! - Owns the `PlannerSession` and the background texture of the open map
//! - Drains beacon change notifications from the store's channel observer
//! - Finishes pending exports when the viewport screenshot arrives
//! - Persists user settings (last directories, panel width) across sessions

use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::mpsc;

use super::map_loader::{LoaderAction, MapLoader};
use super::view::MapView;
use crate::config::PlannerConfig;
use crate::planner::export;
use crate::planner::store::ChannelObserver;
use crate::planner::types::Snapshot;
use crate::planner::{Beacon, EditEvent, Extent, PlannerSession};

/// Number of notifications kept for the activity list.
const MAX_NOTIFICATIONS: usize = 50;

/// A timestamped status line shown in the activity list.
#[derive(Debug, Clone)]
pub struct Notification {
    pub time: chrono::DateTime<chrono::Local>,
    pub text: String,
}

pub struct AppState {
    /// Optional alert message to display in a modal dialog.
    pub alert: Option<String>,
    pub loader: MapLoader,
    /// The open map, `None` while the loader screen is shown.
    pub session: Option<PlannerSession>,
    pub background_texture: Option<egui::TextureHandle>,
    pub view: MapView,
    /// Set while a drag on empty map space pans the view.
    pub panning: bool,
    /// Screen area of the map in the last frame, used to crop exports.
    pub export_region: Option<egui::Rect>,

    /// Latest beacon collection pushed by the store.
    pub placed_beacons: Snapshot<Beacon>,
    beacon_tx: mpsc::Sender<Snapshot<Beacon>>,
    beacon_rx: mpsc::Receiver<Snapshot<Beacon>>,

    pub notifications: VecDeque<Notification>,
    pub config: PlannerConfig,

    // Persistence
    pub last_image_dir: Option<String>,
    pub last_export_dir: Option<String>,
    /// Width of the right settings panel in pixels.
    pub right_panel_width: f32,
}

/// Settings persisted across application sessions.
#[derive(Default, Serialize, Deserialize)]
struct PersistedSettings {
    last_image_dir: Option<String>,
    last_export_dir: Option<String>,
    right_panel_width: Option<f32>,
}

impl AppState {
    /// Create a new AppState, loading persisted settings if available.
    ///
    /// If the configuration names an image the map is opened right away.
    pub fn new(cc: &eframe::CreationContext<'_>, config: PlannerConfig) -> Self {
        let persisted: PersistedSettings = cc.storage.and_then(|s| eframe::get_value(s, "app_settings")).unwrap_or_default();
        let (beacon_tx, beacon_rx) = mpsc::channel();

        let mut loader = MapLoader::new(config.map_width_meters, config.map_height_meters);
        loader.image_path = config.image.clone();

        let mut state = Self {
            alert: None,
            loader,
            session: None,
            background_texture: None,
            view: MapView::default(),
            panning: false,
            export_region: None,
            placed_beacons: Snapshot::default(),
            beacon_tx,
            beacon_rx,
            notifications: VecDeque::new(),
            config,
            last_image_dir: persisted.last_image_dir,
            last_export_dir: persisted.last_export_dir,
            right_panel_width: persisted.right_panel_width.unwrap_or(360.0),
        };

        if state.config.image.is_some() {
            state.open_map(&cc.egui_ctx);
        }
        state
    }

    /// Load a background image from a file path and create an egui texture.
    fn load_background_image(ctx: &egui::Context, path: &str) -> anyhow::Result<egui::TextureHandle> {
        use anyhow::Context;

        let bytes = std::fs::read(path).with_context(|| format!("Failed to read image file {}", path))?;
        let img = image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image {}", path))?;
        let rgba = img.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let pixels = rgba.as_flat_samples();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
        log::info!("Loaded background image {} ({}x{} px)", path, size[0], size[1]);
        Ok(ctx.load_texture("background_image", color_image, egui::TextureOptions::LINEAR))
    }

    /// Open a native file picker for the map image.
    pub fn open_image_picker(&mut self) {
        let mut dialog = rfd::FileDialog::new().add_filter("Images", &["png", "jpg", "jpeg"]);
        if let Some(dir) = &self.last_image_dir {
            dialog = dialog.set_directory(dir);
        }
        if let Some(file) = dialog.pick_file() {
            if let Some(parent) = file.parent() {
                self.last_image_dir = Some(parent.to_string_lossy().to_string());
            }
            self.loader.image_path = Some(file.to_string_lossy().to_string());
        }
    }

    /// Start a planner session from the loader's values.
    ///
    /// Failures leave the loader screen up and show an alert.
    pub fn open_map(&mut self, ctx: &egui::Context) {
        let extent = match Extent::new(self.loader.width_meters, self.loader.height_meters) {
            Ok(extent) => extent,
            Err(e) => {
                self.alert = Some(e.to_string());
                return;
            }
        };

        let texture = match &self.loader.image_path {
            Some(path) => match Self::load_background_image(ctx, path) {
                Ok(texture) => Some(texture),
                Err(e) => {
                    log::error!("{:#}", e);
                    self.alert = Some(format!("{:#}", e));
                    return;
                }
            },
            None => None,
        };

        let mut session = PlannerSession::new(extent, self.config.settings(), self.config.seed_beacons());
        session.subscribe_beacons(Box::new(ChannelObserver::new(self.beacon_tx.clone())));
        self.placed_beacons = session.store.beacons().clone();
        log::info!("Opened {} x {} m map", extent.width(), extent.height());

        self.background_texture = texture;
        self.session = Some(session);
        self.view.reset();
        self.panning = false;
        self.notify(format!("Map loaded ({} x {} m)", extent.width(), extent.height()));
    }

    /// Drop the open map and go back to the loader screen.
    pub fn close_map(&mut self) {
        self.session = None;
        self.background_texture = None;
        self.placed_beacons = Snapshot::default();
        self.export_region = None;
        while self.beacon_rx.try_recv().is_ok() {}
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("{}", text);
        self.notifications.push_front(Notification {
            time: chrono::Local::now(),
            text,
        });
        self.notifications.truncate(MAX_NOTIFICATIONS);
    }

    pub fn notify_event(&mut self, event: Option<EditEvent>) {
        if let Some(event) = event {
            self.notify(event.to_string());
        }
    }

    /// Ask where to save the map image and schedule the export for the next frame.
    pub fn request_export(&mut self, ctx: &egui::Context) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let mut dialog = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(export::default_export_file_name());
        if let Some(dir) = &self.last_export_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return;
        };
        if let Some(parent) = path.parent() {
            self.last_export_dir = Some(parent.to_string_lossy().to_string());
        }
        if session.export.request(path) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
        } else {
            self.alert = Some("An export is already in progress".to_string());
        }
    }

    /// Finish a pending export from a screenshot of the rendered frame.
    fn complete_export(&mut self, ctx: &egui::Context, screenshot: &egui::ColorImage) {
        let Some(path) = self.session.as_mut().and_then(|s| s.export.take()) else {
            return;
        };
        match self.write_export(ctx, screenshot, &path) {
            Ok(()) => self.notify(format!("Map exported to {}", path.display())),
            Err(e) => {
                log::error!("Export to {} failed: {:#}", path.display(), e);
                self.alert = Some(format!("Export failed: {:#}", e));
            }
        }
    }

    fn write_export(&self, ctx: &egui::Context, screenshot: &egui::ColorImage, path: &Path) -> anyhow::Result<()> {
        let region = self.export_region.ok_or_else(|| anyhow::anyhow!("Map area not rendered yet"))?;
        let cropped = screenshot.region(&region, Some(ctx.pixels_per_point()));
        let [width, height] = cropped.size;
        let pixels: Vec<u8> = cropped.pixels.iter().flat_map(|c| c.to_srgba_unmultiplied()).collect();
        let image = export::rgba_image(width as u32, height as u32, pixels)?;
        export::write_png(path, &image)
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let (enter, escape, backspace) = ctx.input(|i| (i.key_pressed(egui::Key::Enter), i.key_pressed(egui::Key::Escape), i.key_pressed(egui::Key::Backspace)));
        let mut event = None;
        if enter {
            event = session.controller.finish_barrier(&mut session.store);
        }
        if escape {
            event = session.controller.discard_draft();
        }
        if backspace {
            event = session.controller.undo_vertex();
        }
        self.notify_event(event);
    }
}

impl eframe::App for AppState {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedSettings {
            last_image_dir: self.last_image_dir.clone(),
            last_export_dir: self.last_export_dir.clone(),
            right_panel_width: Some(self.right_panel_width),
        };
        eframe::set_value(storage, "app_settings", &settings);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.is_none() {
            match self.loader.render(ctx) {
                Some(LoaderAction::PickImage) => self.open_image_picker(),
                Some(LoaderAction::Load) => self.open_map(ctx),
                None => {}
            }
        }

        while let Ok(beacons) = self.beacon_rx.try_recv() {
            self.placed_beacons = beacons;
        }

        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|e| match e {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });
        if let Some(screenshot) = screenshot {
            self.complete_export(ctx, &screenshot);
        }

        if let Some(alert) = self.alert.clone() {
            egui::Window::new("Alert")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.label(alert);
                        ui.add_space(20.0);

                        if ui.button("OK").clicked() {
                            self.alert = None;
                        }
                        ui.add_space(10.0);
                    });
                });
        }

        if self.session.is_none() {
            return;
        }

        self.handle_shortcuts(ctx);

        // Panels layout: top (fixed), right (resizable), map fills the remaining using CentralPanel
        super::top_panel::render(ctx, self);
        super::right_panel::render(ctx, self);
        super::map::render(ctx, self);
    }
}
