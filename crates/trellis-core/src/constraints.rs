//! Size constraints handed to elements during measure.

use crate::geometry::Size;
use serde::{Deserialize, Serialize};

/// Bounds an element must size itself within.
///
/// A grid offers each cell loose constraints: zero minimum, the cell extent as
/// maximum. A maximum of `f64::INFINITY` asks for the natural size along that
/// axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    pub min: Size,
    pub max: Size,
}

impl Constraints {
    #[must_use]
    pub const fn new(min: Size, max: Size) -> Self {
        Self { min, max }
    }

    /// Anything from zero up to `max`.
    #[must_use]
    pub const fn loose(max: Size) -> Self {
        Self::new(Size::ZERO, max)
    }

    #[must_use]
    pub const fn unbounded() -> Self {
        Self::loose(Size::INFINITE)
    }

    /// Clamp `size` into these bounds. The minimum wins if the bounds cross.
    #[must_use]
    pub fn constrain(&self, size: Size) -> Size {
        let clamp = |v: f64, lo: f64, hi: f64| v.min(hi).max(lo);
        Size::new(
            clamp(size.width, self.min.width, self.max.width),
            clamp(size.height, self.min.height, self.max.height),
        )
    }

    /// The largest size allowed, which is what a grid cell offers.
    #[must_use]
    pub const fn max_size(&self) -> Size {
        self.max
    }

    #[must_use]
    pub fn is_width_bounded(&self) -> bool {
        self.max.width.is_finite()
    }

    #[must_use]
    pub fn is_height_bounded(&self) -> bool {
        self.max.height.is_finite()
    }
}

impl Default for Constraints {
    fn default() -> Self {
        Self::unbounded()
    }
}
