//! Startup configuration.
//!
//! Read from a TOML file with kebab-case keys. Every key is optional; missing
//! keys take the built-in defaults.
//!
//! ```toml
//! image = "floor.png"
//! map-width-meters = 100.0
//! map-height-meters = 60.0
//! rssi = -70.0
//! beacon-step = 5.0
//! antenna-height = 2.0
//! antenna-angle = 0.0
//!
//! [[beacons]]
//! x = 12.5
//! y = 40.0
//! rssi = -65.0
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::planner::{Beacon, Extent, PlacementSettings, Point};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "planner.toml";

#[derive(Debug)]
pub enum ConfigError {
    FileReadError(String),
    ParseError(String),
    ValidationError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::ValidationError(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// A beacon that exists before any editing starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedBeacon {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rssi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlannerConfig {
    /// Map image to open directly, skipping the loader screen.
    pub image: Option<String>,
    pub map_width_meters: f64,
    pub map_height_meters: f64,
    /// RSSI given to new beacons, in dBm.
    pub rssi: f64,
    /// Beacon auto-placement grid step in meters.
    pub beacon_step: f64,
    pub antenna_height: f64,
    /// Antenna angle in degrees, `[0, 360)`.
    pub antenna_angle: f64,
    pub beacons: Vec<SeedBeacon>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let settings = PlacementSettings::default();
        Self {
            image: None,
            map_width_meters: 100.0,
            map_height_meters: 100.0,
            rssi: settings.rssi,
            beacon_step: settings.beacon_step,
            antenna_height: settings.antenna_height,
            antenna_angle: settings.antenna_angle,
            beacons: Vec::new(),
        }
    }
}

impl PlannerConfig {
    /// Load and validate a configuration file.
    ///
    /// A relative `image` path is resolved against the directory of the
    /// configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(format!("{}: {}", path.display(), e)))?;
        let mut config = Self::from_toml_str(&content)?;

        if let Some(image) = config.image.as_ref() {
            let image_path = Path::new(image);
            if image_path.is_relative() {
                if let Some(parent) = path.parent() {
                    config.image = Some(parent.join(image_path).to_string_lossy().to_string());
                }
            }
        }
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration for this run: the file named by the first argument, else
    /// [`DEFAULT_CONFIG_FILE`] if it exists, else the defaults.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        match resolve_path(args) {
            Some(path) => {
                log::info!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            None => {
                log::info!("No configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        let extent = match Extent::new(self.map_width_meters, self.map_height_meters) {
            Ok(extent) => extent,
            Err(e) => return invalid(e.to_string()),
        };
        if !(self.beacon_step.is_finite() && self.beacon_step > 0.0) {
            return invalid(format!("beacon-step must be positive, got {}", self.beacon_step));
        }
        if !(self.antenna_height.is_finite() && self.antenna_height >= 0.0) {
            return invalid(format!("antenna-height must not be negative, got {}", self.antenna_height));
        }
        if !(0.0..360.0).contains(&self.antenna_angle) {
            return invalid(format!("antenna-angle must be in [0, 360), got {}", self.antenna_angle));
        }
        if !self.rssi.is_finite() {
            return invalid("rssi must be a number".to_string());
        }
        for (i, seed) in self.beacons.iter().enumerate() {
            if !extent.contains(&Point::new(seed.x, seed.y)) {
                return invalid(format!("beacon {} at ({}, {}) lies outside the map", i, seed.x, seed.y));
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> PlacementSettings {
        PlacementSettings {
            rssi: self.rssi,
            beacon_step: self.beacon_step,
            antenna_height: self.antenna_height,
            antenna_angle: self.antenna_angle,
        }
    }

    /// Seed beacons as entities with ids `beacon-seed-N`.
    pub fn seed_beacons(&self) -> Vec<Beacon> {
        self.beacons
            .iter()
            .enumerate()
            .map(|(i, seed)| Beacon {
                id: format!("beacon-seed-{}", i),
                position: Point::new(seed.x, seed.y),
                rssi: seed.rssi,
            })
            .collect()
    }
}

/// Pick the configuration path from the command line arguments (program name
/// excluded).
pub fn resolve_path(args: impl IntoIterator<Item = String>) -> Option<PathBuf> {
    if let Some(arg) = args.into_iter().next() {
        return Some(PathBuf::from(arg));
    }
    let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
    fallback.exists().then_some(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PlannerConfig::from_toml_str("").unwrap();
        assert_eq!(config, PlannerConfig::default());
        assert_eq!(config.settings(), PlacementSettings::default());
    }

    #[test]
    fn parses_kebab_case_keys_and_seeds() {
        let config = PlannerConfig::from_toml_str(
            r#"
            image = "floor.png"
            map-width-meters = 80.0
            map-height-meters = 40.5
            rssi = -60.0
            beacon-step = 4.0
            antenna-height = 6.0
            antenna-angle = 90.0

            [[beacons]]
            x = 10.0
            y = 20.0
            rssi = -55.0

            [[beacons]]
            x = 1.0
            y = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.image.as_deref(), Some("floor.png"));
        assert_eq!((config.map_width_meters, config.map_height_meters), (80.0, 40.5));
        assert_eq!(config.settings().antenna_range(), 18.25);

        let seeds = config.seed_beacons();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0].id, "beacon-seed-0");
        assert_eq!(seeds[0].position, Point::new(10.0, 20.0));
        assert_eq!(seeds[0].rssi, Some(-55.0));
        assert_eq!(seeds[1].rssi, None);
    }

    #[test]
    fn rejects_bad_values() {
        for text in [
            "map-width-meters = 0.0",
            "map-height-meters = -3.0",
            "beacon-step = 0.0",
            "antenna-height = -1.0",
            "antenna-angle = 360.0",
            "[[beacons]]\nx = 150.0\ny = 1.0",
        ] {
            let result = PlannerConfig::from_toml_str(text);
            assert!(matches!(result, Err(ConfigError::ValidationError(_))), "{} accepted", text);
        }
    }

    #[test]
    fn reports_parse_errors() {
        assert!(matches!(PlannerConfig::from_toml_str("rssi = \"loud\""), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn load_resolves_image_next_to_config() {
        let dir = std::env::temp_dir().join(format!("beacon-planner-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("planner.toml");
        std::fs::write(&path, "image = \"plan.png\"\n").unwrap();

        let config = PlannerConfig::load(&path).unwrap();
        assert_eq!(config.image.map(PathBuf::from), Some(dir.join("plan.png")));

        assert!(matches!(PlannerConfig::load(&dir.join("missing.toml")), Err(ConfigError::FileReadError(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn explicit_argument_wins() {
        assert_eq!(resolve_path(vec!["custom.toml".to_string()]), Some(PathBuf::from("custom.toml")));
    }
}
