//! Geometry for the flat meter grid the planner works in.
//!
//! Contains helper functions for:
//! - The map extent `[0,W]×[0,H]` and pointer clamping
//! - Point-in-polygon tests (even-odd ray casting)
//! - Distance calculations (squared distance to avoid sqrt in comparisons)

use super::error::PlannerError;

/// A position in meters. Origin is the top-left corner of the map image,
/// `x` grows to the right and `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Squared Euclidean distance in meters.
///
/// Hit-testing and snapping only compare distances, so the square root is
/// skipped until a caller needs the real value.
pub fn distance2(a: &Point, b: &Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// The physical area covered by the map image, in meters.
///
/// Entity positions and pointer coordinates are expressed directly in this
/// space; there is no further projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    width: f64,
    height: f64,
}

impl Extent {
    /// Create an extent of `width` x `height` meters.
    ///
    /// Rejects zero, negative and non-finite dimensions before any placement
    /// logic gets to see them.
    pub fn new(width: f64, height: f64) -> Result<Self, PlannerError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(PlannerError::InvalidExtent { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Inclusive containment test.
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Clamp a point onto the extent.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }
}

/// Point-in-polygon capability used by auto-placement and barrier hit-testing.
///
/// Any geometry implementation can stand in here; the engine never looks at
/// how the answer is produced.
pub trait PointInPolygon {
    /// Whether `p` lies inside the closed polygon described by `polygon`.
    fn contains(&self, polygon: &[Point], p: &Point) -> bool;
}

/// Even-odd ray casting.
///
/// Points exactly on an edge may land on either side. Self-intersecting
/// polygons follow the even-odd rule: regions covered an even number of
/// times count as outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayCasting;

impl PointInPolygon for RayCasting {
    fn contains(&self, polygon: &[Point], p: &Point) -> bool {
        point_in_polygon(p, polygon)
    }
}

/// Even-odd ray casting test. Polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(p: &Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > p.y) != (pj.y > p.y) && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// True if the polygon is simple and turns the same way at every vertex.
///
/// The turns of a convex polygon add up to one full revolution; a star that
/// also turns one way at every vertex winds around more than once.
///
/// The renderer can only fill convex shapes; other barriers are drawn as outlines.
pub fn is_convex(polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let n = polygon.len();
    let mut sign = 0.0_f64;
    let mut turning = 0.0_f64;
    for i in 0..n {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        let c = &polygon[(i + 2) % n];
        let (ux, uy) = (b.x - a.x, b.y - a.y);
        let (vx, vy) = (c.x - b.x, c.y - b.y);
        let cross = ux * vy - uy * vx;
        let dot = ux * vx + uy * vy;
        if cross == 0.0 {
            // Straight on is fine, doubling back is not.
            if dot < 0.0 {
                return false;
            }
            continue;
        }
        if sign != 0.0 && cross.signum() != sign {
            return false;
        }
        sign = cross.signum();
        turning += cross.atan2(dot);
    }
    (turning.abs() - std::f64::consts::TAU).abs() < 1e-6
}
