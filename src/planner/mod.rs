//! Placement engine core.
//!
//! Everything here is UI-independent and works in map meters with the origin
//! at the top-left corner of the map image and `y` growing downwards.
//!
//! ## Module Organization
//!
//! - `geometry`: Points, the map extent and point-in-polygon containment
//! - `types`: Entities (beacons, antennas, barriers) and placement settings
//! - `range`: Antenna coverage heuristic
//! - `placement`: Grid auto-placement with barrier exclusion
//! - `store`: Entity collections and beacon change notification
//! - `hit_test`: Nearest-entity lookup and snapping
//! - `interaction`: Single-active-mode gesture state machine
//! - `export`: One-shot map export and PNG writing
//! - `session`: Facade tying the above together for one loaded map

pub mod error;
pub mod export;
pub mod geometry;
pub mod interaction;
pub mod placement;
pub mod range;
pub mod session;
pub mod store;
pub mod types;

pub use geometry::{Extent, Point};
pub use interaction::{EditEvent, Mode};
pub use session::PlannerSession;
pub use types::{Antenna, Barrier, Beacon, PlacementSettings};
