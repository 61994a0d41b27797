//! Antenna coverage heuristic.
//!
//! `range = max(10, 5 + 2·height + (angle/360)·5)` meters. The formula has no
//! physical derivation; it is kept as-is. Auto-placement spaces antennas at
//! three quarters of that range so neighbouring coverage circles overlap.

/// Lower bound for any antenna range, in meters.
pub const MIN_ANTENNA_RANGE: f64 = 10.0;

/// Fraction of the range used as the antenna grid step.
pub const ANTENNA_STEP_FACTOR: f64 = 0.75;

/// Coverage radius in meters for an antenna at `height` meters and `angle` degrees.
pub fn antenna_range(height: f64, angle: f64) -> f64 {
    MIN_ANTENNA_RANGE.max(5.0 + height * 2.0 + angle / 360.0 * 5.0)
}

/// Auto-placement step for antennas with the given height and angle.
pub fn antenna_step(height: f64, angle: f64) -> f64 {
    antenna_range(height, angle) * ANTENNA_STEP_FACTOR
}
