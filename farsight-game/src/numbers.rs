//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Round a f64 and clamp it to the 0..=100 score range, returning 0 for NaN values.
#[must_use]
pub fn round_to_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    let clamped = value.round().clamp(0.0, 100.0);
    cast::<f64, u8>(clamped).unwrap_or(0)
}

/// Round a non-negative magnitude to whole units, clamping non-finite values to `floor`.
#[must_use]
pub fn round_magnitude(value: f64, floor: f64) -> f64 {
    if !value.is_finite() {
        return floor;
    }
    value.round().max(floor)
}

/// Convert a count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Scale a unit draw in [0,1) to the full u32 range.
#[must_use]
pub fn unit_to_u32(unit: f64) -> u32 {
    if !unit.is_finite() {
        return 0;
    }
    let scaled = (unit.clamp(0.0, 1.0) * f64::from(u32::MAX)).floor();
    cast::<f64, u32>(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_rounding_clamps_and_handles_nan() {
        assert_eq!(round_to_score(59.5), 60);
        assert_eq!(round_to_score(-12.0), 0);
        assert_eq!(round_to_score(140.0), 100);
        assert_eq!(round_to_score(f64::NAN), 0);
    }

    #[test]
    fn magnitudes_respect_floor() {
        assert!((round_magnitude(4.4, 5.0) - 5.0).abs() < f64::EPSILON);
        assert!((round_magnitude(120.6, 5.0) - 121.0).abs() < f64::EPSILON);
        assert!((round_magnitude(f64::INFINITY, 1.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unit_scaling_stays_in_bounds() {
        assert_eq!(unit_to_u32(f64::NAN), 0);
        assert!(unit_to_u32(0.5) > 0);
    }
}
