//! Automatic grid placement with barrier exclusion.
//!
//! Candidates sit at the centres of a square grid of `step` meters laid over
//! the extent, visited row by row (`y` outer, `x` inner). A candidate inside
//! any barrier polygon is dropped; every other one becomes a new entity with a
//! sequential index `0, 1, 2, …` in visiting order.
//!
//! The result is always a complete replacement collection. It never merges
//! with what the store held before.

use super::error::PlannerError;
use super::geometry::{Extent, Point, PointInPolygon};
use super::types::{Antenna, Barrier, Beacon, PlacementSettings};

/// Largest grid auto-placement will walk. Denser grids are refused up front.
pub const MAX_GRID_CANDIDATES: usize = 250_000;

/// Number of grid candidates for `step` over `extent`.
///
/// Candidates on an axis of length `L` are `step/2 + k·step < L`, so there are
/// `⌈L/step − ½⌉` of them.
pub fn grid_candidate_count(step: f64, extent: &Extent) -> f64 {
    let per_axis = |length: f64| (length / step - 0.5).ceil().max(0.0);
    per_axis(extent.width()) * per_axis(extent.height())
}

/// Grid candidates for `step` over `extent`, in row-major order.
///
/// Coordinates are computed from the row/column index so long rows do not
/// accumulate floating point drift: the k-th value on an axis is exactly
/// `step/2 + k·step`.
fn grid_candidates(step: f64, extent: &Extent) -> impl Iterator<Item = Point> {
    let half = step / 2.0;
    let width = extent.width();
    let height = extent.height();
    let rows = (0usize..).map(move |j| half + j as f64 * step).take_while(move |y| *y < height);
    rows.flat_map(move |y| (0usize..).map(move |i| half + i as f64 * step).take_while(move |x| *x < width).map(move |x| Point::new(x, y)))
}

/// Run auto-placement.
///
/// # Parameters
///
/// * `step` - Grid spacing in meters, must be positive and finite
/// * `extent` - Map area to cover
/// * `barriers` - Polygons whose interior is excluded
/// * `containment` - Point-in-polygon predicate used for exclusion
/// * `factory` - Builds an entity from its sequence index and position
///
/// # Returns
///
/// The new entities in placement order. `InvalidStep` or `GridTooDense` is
/// returned without doing any work.
pub fn auto_place<T, P, F>(step: f64, extent: &Extent, barriers: &[Barrier], containment: &P, mut factory: F) -> Result<Vec<T>, PlannerError>
where
    P: PointInPolygon + ?Sized,
    F: FnMut(usize, Point) -> T,
{
    if !(step.is_finite() && step > 0.0) {
        return Err(PlannerError::InvalidStep(step));
    }
    let candidates = grid_candidate_count(step, extent);
    if candidates > MAX_GRID_CANDIDATES as f64 {
        log::warn!("Refusing auto-placement with step {} m: {} grid positions", step, candidates);
        return Err(PlannerError::GridTooDense { step, candidates });
    }

    let mut placed = Vec::new();
    let mut rejected = 0usize;
    for candidate in grid_candidates(step, extent) {
        if barriers.iter().any(|barrier| containment.contains(&barrier.vertices, &candidate)) {
            rejected += 1;
            continue;
        }
        placed.push(factory(placed.len(), candidate));
    }
    log::debug!("Auto-placement with step {} m: {} placed, {} inside barriers", step, placed.len(), rejected);
    Ok(placed)
}

/// Fill the map with beacons carrying the current RSSI.
pub fn auto_place_beacons<P: PointInPolygon + ?Sized>(
    settings: &PlacementSettings,
    extent: &Extent,
    barriers: &[Barrier],
    containment: &P,
) -> Result<Vec<Beacon>, PlannerError> {
    let rssi = settings.rssi;
    auto_place(settings.beacon_step, extent, barriers, containment, |seq, position| Beacon {
        id: format!("beacon-auto-{}", seq),
        position,
        rssi: Some(rssi),
    })
}

/// Fill the map with antennas spaced by the range model's step.
pub fn auto_place_antennas<P: PointInPolygon + ?Sized>(
    settings: &PlacementSettings,
    extent: &Extent,
    barriers: &[Barrier],
    containment: &P,
) -> Result<Vec<Antenna>, PlannerError> {
    let height = settings.antenna_height;
    let angle = settings.antenna_angle;
    auto_place(settings.antenna_step(), extent, barriers, containment, |seq, position| {
        Antenna::new(format!("antenna-auto-{}", seq), position, height, angle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::geometry::{RayCasting, point_in_polygon};

    fn p(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    fn settings(step: f64) -> PlacementSettings {
        PlacementSettings {
            beacon_step: step,
            ..Default::default()
        }
    }

    fn barrier(id: &str, vertices: Vec<Point>) -> Barrier {
        Barrier { id: id.into(), vertices }
    }

    #[test]
    fn hundred_by_hundred_step_five() {
        let extent = Extent::new(100.0, 100.0).unwrap();
        let beacons = auto_place_beacons(&settings(5.0), &extent, &[], &RayCasting).unwrap();
        assert_eq!(beacons.len(), 400);
        assert_eq!(beacons[0].position, p(2.5, 2.5));
        assert_eq!(beacons[399].position, p(97.5, 97.5));
        assert_eq!(beacons[0].id, "beacon-auto-0");
        assert_eq!(beacons[399].id, "beacon-auto-399");
        assert!(beacons.iter().all(|b| b.rssi == Some(-70.0)));
    }

    #[test]
    fn divisible_extent_fills_full_grid_row_major() {
        let extent = Extent::new(30.0, 20.0).unwrap();
        let step = 10.0;
        let placed = auto_place(step, &extent, &[], &RayCasting, |seq, pos| (seq, pos)).unwrap();
        let cols = (30.0_f64 / step).ceil() as usize;
        let rows = (20.0_f64 / step).ceil() as usize;
        assert_eq!(placed.len(), cols * rows);
        for (k, (seq, pos)) in placed.iter().enumerate() {
            let (i, j) = (k % cols, k / cols);
            assert_eq!(*seq, k);
            assert_eq!(*pos, p(5.0 + i as f64 * step, 5.0 + j as f64 * step));
        }
    }

    #[test]
    fn partial_cells_only_count_when_centre_fits() {
        // 2.5 fits, 7.5 does not on a 7 m axis.
        let extent = Extent::new(7.0, 5.0).unwrap();
        let placed = auto_place(5.0, &extent, &[], &RayCasting, |_, pos| pos).unwrap();
        assert_eq!(placed, vec![p(2.5, 2.5)]);
    }

    #[test]
    fn step_larger_than_map_still_places_when_centre_fits() {
        let extent = Extent::new(10.0, 10.0).unwrap();
        assert_eq!(auto_place(19.0, &extent, &[], &RayCasting, |_, pos| pos).unwrap(), vec![p(9.5, 9.5)]);
        assert!(auto_place(21.0, &extent, &[], &RayCasting, |_, pos| pos).unwrap().is_empty());
    }

    #[test]
    fn invalid_step_is_rejected_not_looped() {
        let extent = Extent::new(10.0, 10.0).unwrap();
        for step in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let result = auto_place(step, &extent, &[], &RayCasting, |_, pos| pos);
            assert!(matches!(result, Err(PlannerError::InvalidStep(_))));
        }
    }

    #[test]
    fn candidate_count_matches_placement() {
        let extent = Extent::new(47.0, 31.0).unwrap();
        for step in [1.0, 2.5, 5.0, 19.0, 40.0, 70.0] {
            let placed = auto_place(step, &extent, &[], &RayCasting, |_, pos| pos).unwrap();
            assert_eq!(placed.len() as f64, grid_candidate_count(step, &extent), "step {}", step);
        }
    }

    #[test]
    fn overly_dense_grid_is_refused() {
        let extent = Extent::new(100_000.0, 100_000.0).unwrap();
        let mut calls = 0;
        let result = auto_place(0.5, &extent, &[], &RayCasting, |_, pos| {
            calls += 1;
            pos
        });
        assert!(matches!(result, Err(PlannerError::GridTooDense { step, .. }) if step == 0.5));
        assert_eq!(calls, 0);

        // 500 x 500 is exactly at the limit.
        let extent = Extent::new(500.0, 500.0).unwrap();
        assert_eq!(auto_place(1.0, &extent, &[], &RayCasting, |_, pos| pos).unwrap().len(), MAX_GRID_CANDIDATES);
    }

    #[test]
    fn barriers_exclude_candidates_and_ids_stay_dense() {
        let extent = Extent::new(100.0, 100.0).unwrap();
        let barriers = vec![
            barrier("barrier-0", vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 50.0), p(0.0, 50.0)]),
            barrier("barrier-1", vec![p(60.0, 60.0), p(90.0, 65.0), p(70.0, 95.0)]),
        ];
        let beacons = auto_place_beacons(&settings(5.0), &extent, &barriers, &RayCasting).unwrap();
        assert_eq!(beacons.len(), 400 - 100 - beacons_inside_triangle(&barriers[1].vertices));
        for beacon in &beacons {
            for b in &barriers {
                assert!(!point_in_polygon(&beacon.position, &b.vertices), "{:?} inside {}", beacon.position, b.id);
            }
        }
        for (i, beacon) in beacons.iter().enumerate() {
            assert_eq!(beacon.id, format!("beacon-auto-{}", i));
        }
    }

    fn beacons_inside_triangle(tri: &[Point]) -> usize {
        let mut count = 0;
        for j in 0..20 {
            for i in 0..20 {
                if point_in_polygon(&p(2.5 + i as f64 * 5.0, 2.5 + j as f64 * 5.0), tri) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn idempotent_for_identical_inputs() {
        let extent = Extent::new(47.0, 31.0).unwrap();
        let barriers = vec![barrier("barrier-0", vec![p(5.0, 5.0), p(20.0, 8.0), p(12.0, 25.0)])];
        let s = PlacementSettings {
            antenna_height: 6.0,
            antenna_angle: 90.0,
            ..Default::default()
        };
        let first = auto_place_antennas(&s, &extent, &barriers, &RayCasting).unwrap();
        let second = auto_place_antennas(&s, &extent, &barriers, &RayCasting).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    #[test]
    fn antennas_use_range_model_step_and_current_attributes() {
        let extent = Extent::new(30.0, 30.0).unwrap();
        let s = PlacementSettings::default(); // range 10, step 7.5
        let antennas = auto_place_antennas(&s, &extent, &[], &RayCasting).unwrap();
        assert_eq!(antennas.len(), 16);
        assert_eq!(antennas[0].position, p(3.75, 3.75));
        assert_eq!(antennas[1].position, p(11.25, 3.75));
        assert!(antennas.iter().all(|a| a.range == 10.0 && a.height == 2.0 && a.angle == 0.0));
        assert_eq!(antennas[15].id, "antenna-auto-15");
    }

    struct Everywhere;

    impl PointInPolygon for Everywhere {
        fn contains(&self, _polygon: &[Point], _p: &Point) -> bool {
            true
        }
    }

    #[test]
    fn containment_capability_is_pluggable() {
        let extent = Extent::new(10.0, 10.0).unwrap();
        let barriers = vec![barrier("barrier-0", vec![])];
        assert!(auto_place(1.0, &extent, &barriers, &Everywhere, |_, pos| pos).unwrap().is_empty());
        assert_eq!(auto_place(1.0, &extent, &[], &Everywhere, |_, pos| pos).unwrap().len(), 100);
    }
}
