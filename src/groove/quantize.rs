// Grid Quantization - Snaps beat positions to the grid and converts them to ticks
// All arithmetic after the first snap is done in integer grid units so that
// tick positions never drift between events

use super::grid::GridDivision;

/// Round a non-negative value half-up (0.5 goes to 1, not to even)
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Snap a beat position to the nearest grid point, rounding ties upwards
///
/// With the default sixteenth grid this is `round(beat * 4) / 4`.
pub fn quantize_beat(beat: f64, division: GridDivision) -> f64 {
    let subdivisions = division.subdivisions_per_beat() as f64;
    round_half_up(beat * subdivisions) / subdivisions
}

/// Convert a beat position to a whole number of grid units
///
/// Negative or non-finite input maps to zero; callers are expected to have
/// rejected those values already.
pub fn beat_to_grid_units(beat: f64, division: GridDivision) -> u64 {
    if !beat.is_finite() || beat <= 0.0 {
        return 0;
    }

    let units = round_half_up(beat * division.subdivisions_per_beat() as f64);
    // `as` saturates at u64::MAX for absurdly large beats
    units as u64
}

/// Convert grid units to ticks: `round(units / subdivisions * ticks_per_quarter)`
pub fn grid_units_to_ticks(units: u64, division: GridDivision, ticks_per_quarter: u16) -> u64 {
    let subdivisions = division.subdivisions_per_beat() as u64;
    units
        .saturating_mul(2 * ticks_per_quarter as u64)
        .saturating_add(subdivisions)
        / (2 * subdivisions)
}

/// Convert a beat position straight to ticks: `round(beat * ticks_per_quarter)`
pub fn beat_to_ticks(beat: f64, ticks_per_quarter: u16) -> u64 {
    if !beat.is_finite() || beat <= 0.0 {
        return 0;
    }
    round_half_up(beat * ticks_per_quarter as f64) as u64
}
