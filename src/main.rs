//! Beacon Planner
//!
//! Desktop editor for planning beacon and antenna placement on a map image.
//! Beacons and antennas are placed by hand or on an automatic grid that
//! avoids user-drawn barrier polygons; the result can be exported as PNG.
//!
//! Usage: `beacon-planner [config.toml]`

use eframe::egui;
use env_logger::Builder;
use log::{LevelFilter, error, info};

mod config;
mod planner;
mod ui;

use config::PlannerConfig;
use ui::AppState;

fn main() {
    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("beacon_planner"), LevelFilter::Debug)
        .init();

    info!("Starting up");

    let config = match PlannerConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]).with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native("Beacon Planner", native_options, Box::new(move |cc| Ok(Box::new(AppState::new(cc, config))))) {
        error!("UI terminated with error: {}", e);
    }
}
