//! Grid configuration.

use serde::{Deserialize, Serialize};
use trellis_core::DpiScale;

/// Upper bound on passes of the row/column fixed-point measurement loop.
pub const DEFAULT_LAYOUT_LOOP_MAX_COUNT: usize = 5;

/// Which star resolver distributes proportional space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarAlgorithm {
    /// Resolve the most constrained track first, then split the rest by weight
    #[default]
    MaxDiscrepancy,
    /// Single pass in max/weight order; kept for bit-compatible layouts
    Legacy,
}

/// Options controlling how a grid resolves its tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Star resolver used at measure and arrange time
    pub star_algorithm: StarAlgorithm,
    /// Snap track sizes to the device-pixel grid
    pub use_layout_rounding: bool,
    /// Device-pixel scale per axis, used when rounding
    pub dpi: DpiScale,
    /// Cap on iterations of the cyclic measurement loop
    pub layout_loop_max_count: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            star_algorithm: StarAlgorithm::default(),
            use_layout_rounding: false,
            dpi: DpiScale::IDENTITY,
            layout_loop_max_count: DEFAULT_LAYOUT_LOOP_MAX_COUNT,
        }
    }
}

impl GridOptions {
    /// Create the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the star resolver.
    #[must_use]
    pub const fn with_star_algorithm(mut self, algorithm: StarAlgorithm) -> Self {
        self.star_algorithm = algorithm;
        self
    }

    /// Enable or disable device-pixel rounding.
    #[must_use]
    pub const fn with_layout_rounding(mut self, enabled: bool) -> Self {
        self.use_layout_rounding = enabled;
        self
    }

    /// Set the device-pixel scale.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: DpiScale) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the cyclic measurement cap.
    #[must_use]
    pub const fn with_layout_loop_max_count(mut self, count: usize) -> Self {
        self.layout_loop_max_count = count;
        self
    }
}
