// UI module for the Beacon Planner
//
// This module organizes the UI into separate components:
// - `map_loader`: Initial screen picking the map image and its size
// - `top_panel`: Mode tool bar, clear/export buttons and layer toggles
// - `right_panel`: Placement settings, auto-placement and entity lists
// - `map`: Central map canvas with entities and gesture routing
// - `view`: Zoom/pan transform between meters and screen points
// - `app_state`: Application state management and main update loop

pub mod app_state;
pub mod map;
pub mod map_loader;
pub mod right_panel;
pub mod top_panel;
pub mod view;

pub use app_state::AppState;
