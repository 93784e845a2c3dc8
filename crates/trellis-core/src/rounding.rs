//! Device-pixel rounding and tolerant float comparison.

use serde::{Deserialize, Serialize};

/// Ratio of device pixels to layout units, per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DpiScale {
    /// Horizontal scale
    pub x: f64,
    /// Vertical scale
    pub y: f64,
}

impl DpiScale {
    /// One device pixel per layout unit.
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// Create a new scale.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Same scale on both axes.
    #[must_use]
    pub const fn uniform(scale: f64) -> Self {
        Self::new(scale, scale)
    }
}

impl Default for DpiScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Relative tolerance comparison.
///
/// Two values are close when they differ by less than machine epsilon scaled
/// by their magnitude (plus ten, so that values near zero still get a usable
/// tolerance).
#[must_use]
pub fn are_close(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    let eps = (a.abs() + b.abs() + 10.0) * f64::EPSILON;
    let delta = a - b;
    -eps < delta && eps > delta
}

/// Snap a layout value onto the device-pixel grid.
///
/// Ties round to even. If scaling overflows or produces NaN the input is
/// returned unchanged.
#[must_use]
pub fn round_layout_value(value: f64, dpi_scale: f64) -> f64 {
    if are_close(dpi_scale, 1.0) {
        return value.round_ties_even();
    }

    let rounded = (value * dpi_scale).round_ties_even() / dpi_scale;
    if rounded.is_nan() || rounded.is_infinite() || are_close(rounded, f64::MAX) {
        value
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_are_close_exact() {
        assert!(are_close(1.0, 1.0));
        assert!(are_close(f64::INFINITY, f64::INFINITY));
    }

    #[test]
    fn test_are_close_tolerance() {
        assert!(are_close(1.0, 1.0 + f64::EPSILON));
        assert!(!are_close(1.0, 1.0001));
    }

    #[test]
    fn test_round_identity_scale_ties_to_even() {
        assert_eq!(round_layout_value(2.5, 1.0), 2.0);
        assert_eq!(round_layout_value(3.5, 1.0), 4.0);
        assert_eq!(round_layout_value(3.49, 1.0), 3.0);
    }

    #[test]
    fn test_round_fractional_scale() {
        // 1.5 device pixels per unit: 10.2 units -> 15.3 px -> 15 px -> 10 units
        assert_eq!(round_layout_value(10.2, 1.5), 10.0);
        assert_eq!(round_layout_value(0.75, 2.0), 1.0);
        assert_eq!(round_layout_value(0.7, 2.0), 0.5);
    }

    #[test]
    fn test_round_overflow_returns_input() {
        let huge = f64::MAX / 2.0;
        assert_eq!(round_layout_value(huge, 4.0), huge);
    }

    #[test]
    fn test_dpi_scale_default() {
        assert_eq!(DpiScale::default(), DpiScale::IDENTITY);
        assert_eq!(DpiScale::uniform(2.0), DpiScale::new(2.0, 2.0));
    }

    proptest! {
        #[test]
        fn prop_rounded_value_within_half_pixel(value in 0.0f64..10_000.0, scale in prop::sample::select(vec![1.0, 1.25, 1.5, 2.0])) {
            let rounded = round_layout_value(value, scale);
            prop_assert!((rounded - value).abs() <= 0.5 / scale + 1e-9);
        }

        #[test]
        fn prop_rounding_is_idempotent(value in 0.0f64..10_000.0) {
            let once = round_layout_value(value, 2.0);
            prop_assert_eq!(round_layout_value(once, 2.0), once);
        }
    }
}
