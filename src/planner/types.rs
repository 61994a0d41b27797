//! Entity and settings types for the planner.
//!
//! Contains the data structures shared across the engine:
//! - Point entities (beacons, antennas) and barrier polygons
//! - The `Entity`/`Positioned` traits the store and hit-tester are generic over
//! - Placement settings supplied by the host and layer visibility flags

use std::sync::Arc;

use super::geometry::Point;
use super::range;

/// The three entity collections kept by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Beacon,
    Antenna,
    Barrier,
}

impl EntityKind {
    /// Prefix used when generating ids for this kind.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Beacon => "beacon",
            EntityKind::Antenna => "antenna",
            EntityKind::Barrier => "barrier",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Beacon => write!(f, "beacon"),
            EntityKind::Antenna => write!(f, "antenna"),
            EntityKind::Barrier => write!(f, "barrier"),
        }
    }
}

/// Wireless beacon placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Beacon {
    pub id: String,
    pub position: Point,
    /// Signal strength in dBm, if known.
    pub rssi: Option<f64>,
}

/// Directional antenna with a circular coverage range.
#[derive(Debug, Clone, PartialEq)]
pub struct Antenna {
    pub id: String,
    pub position: Point,
    /// Installation height in meters.
    pub height: f64,
    /// Operating angle in degrees, `[0, 360)`.
    pub angle: f64,
    /// Coverage radius in meters, derived from height and angle at creation.
    pub range: f64,
}

impl Antenna {
    /// Build an antenna whose range is derived from `height` and `angle` now.
    ///
    /// The range is frozen: later settings changes do not touch it.
    pub fn new(id: String, position: Point, height: f64, angle: f64) -> Self {
        Self {
            id,
            position,
            height,
            angle,
            range: range::antenna_range(height, angle),
        }
    }
}

/// Closed polygon excluded from auto-placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Barrier {
    pub id: String,
    /// Vertices in drawing order; the last one connects back to the first.
    pub vertices: Vec<Point>,
}

/// Common surface of everything the store holds.
pub trait Entity: Clone {
    const KIND: EntityKind;

    fn id(&self) -> &str;
}

/// Entities that live at a single point and can be dragged around.
pub trait Positioned: Entity {
    fn position(&self) -> Point;

    fn set_position(&mut self, position: Point);
}

impl Entity for Beacon {
    const KIND: EntityKind = EntityKind::Beacon;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Positioned for Beacon {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

impl Entity for Antenna {
    const KIND: EntityKind = EntityKind::Antenna;

    fn id(&self) -> &str {
        &self.id
    }
}

impl Positioned for Antenna {
    fn position(&self) -> Point {
        self.position
    }

    fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

impl Entity for Barrier {
    const KIND: EntityKind = EntityKind::Barrier;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Immutable view of one collection. Every store write swaps in a new one.
pub type Snapshot<T> = Arc<Vec<T>>;

/// Values the host feeds into placement: RSSI for new beacons, beacon grid
/// step, and the antenna height/angle the range model works from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementSettings {
    /// RSSI in dBm given to new beacons.
    pub rssi: f64,
    /// Beacon auto-placement step in meters.
    pub beacon_step: f64,
    /// Height in meters given to new antennas.
    pub antenna_height: f64,
    /// Angle in degrees given to new antennas.
    pub antenna_angle: f64,
}

impl PlacementSettings {
    /// Coverage range a new antenna would get right now.
    pub fn antenna_range(&self) -> f64 {
        range::antenna_range(self.antenna_height, self.antenna_angle)
    }

    /// Antenna auto-placement step for the current height/angle.
    pub fn antenna_step(&self) -> f64 {
        range::antenna_step(self.antenna_height, self.antenna_angle)
    }
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            rssi: -70.0,
            beacon_step: 5.0,
            antenna_height: 2.0,
            antenna_angle: 0.0,
        }
    }
}

/// Per-layer display filter. Never touches the collections themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerVisibility {
    pub beacons: bool,
    pub antennas: bool,
    pub barriers: bool,
}

impl LayerVisibility {
    pub fn is_visible(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Beacon => self.beacons,
            EntityKind::Antenna => self.antennas,
            EntityKind::Barrier => self.barriers,
        }
    }
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            beacons: true,
            antennas: true,
            barriers: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antenna_range_is_frozen_at_creation() {
        let mut settings = PlacementSettings::default();
        let antenna = Antenna::new("antenna-0".into(), Point::new(1.0, 1.0), settings.antenna_height, settings.antenna_angle);
        assert_eq!(antenna.range, 10.0);

        settings.antenna_height = 20.0;
        assert_eq!(settings.antenna_range(), 45.0);
        assert_eq!(antenna.range, 10.0);
    }

    #[test]
    fn settings_derive_range_on_every_read() {
        let mut settings = PlacementSettings::default();
        assert_eq!(settings.antenna_step(), 7.5);
        settings.antenna_angle = 360.0;
        settings.antenna_height = 5.0;
        assert_eq!(settings.antenna_range(), 20.0);
        assert_eq!(settings.antenna_step(), 15.0);
    }

    #[test]
    fn layer_visibility_by_kind() {
        let visibility = LayerVisibility {
            beacons: false,
            ..Default::default()
        };
        assert!(!visibility.is_visible(EntityKind::Beacon));
        assert!(visibility.is_visible(EntityKind::Antenna));
        assert!(visibility.is_visible(EntityKind::Barrier));
    }
}
