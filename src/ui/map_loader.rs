//! # Map Loader Screen
//!
//! First screen of the application. The user picks the background image of
//! the map and enters its real-world size in meters; the planner opens once
//! both are given. The image is optional: without one the planner shows a
//! blank canvas of the entered size.

use eframe::egui;
use egui::Color32;

/// Values entered on the loader screen.
pub struct MapLoader {
    pub image_path: Option<String>,
    pub width_meters: f64,
    pub height_meters: f64,
}

/// What the user asked for on the loader screen.
#[derive(Debug, Clone, PartialEq)]
pub enum LoaderAction {
    PickImage,
    Load,
}

impl MapLoader {
    pub fn new(width_meters: f64, height_meters: f64) -> Self {
        Self {
            image_path: None,
            width_meters,
            height_meters,
        }
    }

    fn dimensions_valid(&self) -> bool {
        self.width_meters > 0.0 && self.height_meters > 0.0
    }

    /// Render the loader screen.
    /// Returns the requested action if a button was clicked.
    pub fn render(&mut self, ctx: &egui::Context) -> Option<LoaderAction> {
        let mut action = None;
        let button_size = egui::vec2(160.0, 32.0);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(30.0);
                ui.heading(egui::RichText::new("Beacon Planner").size(28.0));
                ui.add_space(10.0);
                ui.label(egui::RichText::new("Load a map").size(18.0));
                ui.add_space(50.0);

                ui.group(|ui| {
                    ui.set_width(420.0);
                    ui.vertical_centered(|ui| {
                        ui.add_space(20.0);
                        ui.label(
                            egui::RichText::new("Select the floor plan or site image, then enter the size of the area it shows. All placement happens in meters.")
                                .size(16.0),
                        );
                        ui.add_space(20.0);

                        let image_label = match &self.image_path {
                            Some(path) => format!("✅ {}", file_name(path)),
                            None => "Select image".to_string(),
                        };
                        let button = egui::Button::new(egui::RichText::new(image_label).size(15.0).color(Color32::WHITE)).min_size(button_size);
                        if ui.add(button).clicked() {
                            action = Some(LoaderAction::PickImage);
                        }
                        ui.add_space(20.0);

                        egui::Grid::new("map_dimensions").num_columns(2).spacing([12.0, 8.0]).show(ui, |ui| {
                            ui.label("Width (m):");
                            ui.add(egui::DragValue::new(&mut self.width_meters).range(0.1..=100_000.0).speed(1.0));
                            ui.end_row();
                            ui.label("Height (m):");
                            ui.add(egui::DragValue::new(&mut self.height_meters).range(0.1..=100_000.0).speed(1.0));
                            ui.end_row();
                        });
                        ui.add_space(20.0);

                        let load = egui::Button::new(egui::RichText::new("Load map").size(15.0).color(Color32::WHITE)).min_size(button_size);
                        if ui.add_enabled(self.dimensions_valid(), load).clicked() {
                            action = Some(LoaderAction::Load);
                        }
                        ui.add_space(30.0);
                    });
                });
            });
        });

        action
    }
}

fn file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}
