//! Everything one loaded map needs, in one place.
//!
//! The UI holds a single [`PlannerSession`] per loaded map and drives all
//! editing through it.

use super::error::PlannerError;
use super::export::ExportHook;
use super::geometry::{Extent, RayCasting};
use super::hit_test::Tolerances;
use super::interaction::{GestureEnv, InteractionController, Mode};
use super::placement::{auto_place_antennas, auto_place_beacons};
use super::store::{BeaconObserver, EntityStore};
use super::types::{Antenna, Barrier, Beacon, LayerVisibility, PlacementSettings};

pub struct PlannerSession {
    extent: Extent,
    pub store: EntityStore,
    pub controller: InteractionController,
    pub settings: PlacementSettings,
    pub visibility: LayerVisibility,
    pub export: ExportHook,
}

impl PlannerSession {
    /// Start a session over `extent`, optionally seeded with beacons.
    pub fn new(extent: Extent, settings: PlacementSettings, seed: Vec<Beacon>) -> Self {
        let mut store = EntityStore::new();
        if !seed.is_empty() {
            log::info!("Seeding session with {} beacons", seed.len());
            store.replace_all(seed);
        }
        Self {
            extent,
            store,
            controller: InteractionController::new(),
            settings,
            visibility: LayerVisibility::default(),
            export: ExportHook::new(),
        }
    }

    pub fn extent(&self) -> &Extent {
        &self.extent
    }

    /// Register an observer. Every later beacon mutation reaches it.
    pub fn subscribe_beacons(&mut self, observer: Box<dyn BeaconObserver>) {
        self.store.subscribe_beacons(observer);
    }

    /// Per-frame gesture inputs for the current view scale.
    pub fn gesture_env(&self, tolerances: Tolerances) -> GestureEnv {
        GestureEnv {
            extent: self.extent,
            settings: self.settings,
            visibility: self.visibility,
            tolerances,
        }
    }

    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        self.controller.set_mode(mode)
    }

    /// Replace all beacons with a fresh grid and leave every editing mode.
    ///
    /// # Returns
    ///
    /// The number of beacons placed. On error the store is unchanged.
    pub fn auto_place_beacons(&mut self) -> Result<usize, PlannerError> {
        let beacons = auto_place_beacons(&self.settings, &self.extent, self.store.barriers(), &RayCasting)?;
        let count = beacons.len();
        self.store.replace_all(beacons);
        self.controller.set_mode(Mode::Idle);
        log::info!("Auto-placed {} beacons with step {} m", count, self.settings.beacon_step);
        Ok(count)
    }

    /// Replace all antennas with a fresh grid and leave every editing mode.
    pub fn auto_place_antennas(&mut self) -> Result<usize, PlannerError> {
        let antennas = auto_place_antennas(&self.settings, &self.extent, self.store.barriers(), &RayCasting)?;
        let count = antennas.len();
        self.store.replace_all(antennas);
        self.controller.set_mode(Mode::Idle);
        log::info!(
            "Auto-placed {} antennas with range {:.2} m, step {:.2} m",
            count,
            self.settings.antenna_range(),
            self.settings.antenna_step()
        );
        Ok(count)
    }

    pub fn clear_beacons(&mut self) {
        self.store.clear::<Beacon>();
    }

    pub fn clear_antennas(&mut self) {
        self.store.clear::<Antenna>();
    }

    pub fn clear_barriers(&mut self) {
        self.store.clear::<Barrier>();
    }

    pub fn remove_barrier(&mut self, id: &str) -> Result<(), PlannerError> {
        self.store.remove::<Barrier>(id).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::geometry::Point;
    use crate::planner::store::tests::Recorder;

    fn session() -> PlannerSession {
        PlannerSession::new(Extent::new(100.0, 100.0).unwrap(), PlacementSettings::default(), Vec::new())
    }

    #[test]
    fn seed_beacons_are_loaded() {
        let seed = vec![Beacon {
            id: "beacon-seed-0".into(),
            position: Point::new(1.0, 2.0),
            rssi: Some(-50.0),
        }];
        let session = PlannerSession::new(Extent::new(10.0, 10.0).unwrap(), PlacementSettings::default(), seed);
        assert_eq!(session.store.beacons().len(), 1);
        assert_eq!(session.extent().width(), 10.0);
    }

    #[test]
    fn auto_place_replaces_and_deactivates_modes() {
        let mut s = session();
        let recorder = Recorder::default();
        s.subscribe_beacons(Box::new(recorder.clone()));
        s.store.insert(Beacon {
            id: "beacon-0".into(),
            position: Point::new(1.0, 1.0),
            rssi: None,
        });
        s.set_mode(Mode::PlaceBeacon);

        assert_eq!(s.auto_place_beacons(), Ok(400));
        assert_eq!(s.controller.mode(), Mode::Idle);
        assert!(s.store.beacons().iter().all(|b| b.id.starts_with("beacon-auto-")));
        assert_eq!(recorder.0.borrow().last().map(|b| b.len()), Some(400));
    }

    #[test]
    fn auto_place_antennas_follows_settings() {
        let mut s = session();
        s.settings.antenna_height = 10.0;
        s.set_mode(Mode::DeleteAntennas);
        let count = s.auto_place_antennas().unwrap();
        // step 18.75 m: centres at 9.375 + k·18.75 < 100 gives 5 per axis
        assert_eq!(count, 25);
        assert!(s.store.antennas().iter().all(|a| a.range == 25.0));
        assert_eq!(s.controller.mode(), Mode::Idle);
    }

    #[test]
    fn invalid_step_leaves_store_untouched() {
        let mut s = session();
        s.auto_place_beacons().unwrap();
        s.set_mode(Mode::EditBeacons);
        s.settings.beacon_step = 0.0;
        assert_eq!(s.auto_place_beacons(), Err(PlannerError::InvalidStep(0.0)));
        assert_eq!(s.store.beacons().len(), 400);
        assert_eq!(s.controller.mode(), Mode::EditBeacons);
    }

    #[test]
    fn barriers_shape_auto_placement_and_can_be_removed() {
        let mut s = session();
        s.store.insert(Barrier {
            id: "barrier-0".into(),
            vertices: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0), Point::new(100.0, 50.0), Point::new(0.0, 50.0)],
        });
        assert_eq!(s.auto_place_beacons(), Ok(200));
        s.remove_barrier("barrier-0").unwrap();
        assert!(s.remove_barrier("barrier-0").is_err());
        assert_eq!(s.auto_place_beacons(), Ok(400));
    }

    #[test]
    fn clear_buttons_empty_their_collection_only() {
        let mut s = session();
        s.auto_place_beacons().unwrap();
        s.auto_place_antennas().unwrap();
        s.clear_beacons();
        assert!(s.store.beacons().is_empty());
        assert!(!s.store.antennas().is_empty());
        s.clear_antennas();
        s.clear_barriers();
        assert!(s.store.antennas().is_empty());
    }

    #[test]
    fn gesture_env_carries_current_settings() {
        let mut s = session();
        s.settings.rssi = -42.0;
        s.visibility.antennas = false;
        let env = s.gesture_env(Tolerances::from_pixels(10.0, 5.0, 10.0, 0.1));
        assert_eq!(env.settings.rssi, -42.0);
        assert!(!env.visibility.antennas);
        assert_eq!(env.extent, *s.extent());
    }
}
