//! Row and column definitions, and the per-pass track state derived from them.

use crate::error::GridError;
use crate::length::GridLength;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Which direction a track runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Columns divide the width
    Column,
    /// Rows divide the height
    Row,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Column => "column",
            Self::Row => "row",
        })
    }
}

/// A column or row definition as supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDefinition {
    /// Requested length
    pub size: GridLength,
    /// Lower bound on the resolved size
    pub min: f64,
    /// Upper bound on the resolved size
    #[serde(skip_serializing_if = "is_unbounded")]
    pub max: f64,
    /// Name of the shared size group this track participates in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_size_group: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_unbounded(value: &f64) -> bool {
    *value == f64::INFINITY
}

impl Default for TrackDefinition {
    fn default() -> Self {
        Self {
            size: GridLength::default(),
            min: 0.0,
            max: f64::INFINITY,
            shared_size_group: None,
        }
    }
}

impl From<GridLength> for TrackDefinition {
    fn from(size: GridLength) -> Self {
        Self::new(size)
    }
}

impl TrackDefinition {
    /// Create a definition with the given length and no bounds.
    #[must_use]
    pub fn new(size: GridLength) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Fixed-size track.
    #[must_use]
    pub fn px(value: f64) -> Self {
        Self::new(GridLength::Fixed(value))
    }

    /// Content-sized track.
    #[must_use]
    pub fn auto() -> Self {
        Self::new(GridLength::Auto)
    }

    /// Proportional track.
    #[must_use]
    pub fn star(weight: f64) -> Self {
        Self::new(GridLength::Star(weight))
    }

    /// Set the minimum size.
    #[must_use]
    pub const fn with_min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    /// Set the maximum size.
    #[must_use]
    pub const fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    /// Join a shared size group.
    #[must_use]
    pub fn with_shared_size_group(mut self, group: impl Into<String>) -> Self {
        self.shared_size_group = Some(group.into());
        self
    }

    /// Check the length, bounds, and group name.
    pub fn validate(&self) -> Result<(), GridError> {
        self.size.validate()?;
        if self.min.is_nan() || self.min < 0.0 || self.min.is_infinite() {
            return Err(GridError::InvalidConstraint {
                name: "min",
                value: self.min,
            });
        }
        if self.max.is_nan() || self.max < 0.0 {
            return Err(GridError::InvalidConstraint {
                name: "max",
                value: self.max,
            });
        }
        if let Some(group) = &self.shared_size_group {
            validate_group_name(group)?;
        }
        Ok(())
    }
}

/// Group names are identifiers: a letter or `_`, then letters, digits or `_`.
pub(crate) fn validate_group_name(name: &str) -> Result<(), GridError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(GridError::InvalidSharedSizeGroup(name.to_string()))
    }
}

/// Set of length kinds covered by a track or a span of tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct SizeType(u8);

impl SizeType {
    pub(crate) const NONE: Self = Self(0);
    pub(crate) const PIXEL: Self = Self(1);
    pub(crate) const AUTO: Self = Self(2);
    pub(crate) const STAR: Self = Self(4);

    pub(crate) const fn contains(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub(crate) const fn is_auto(self) -> bool {
        self.contains(Self::AUTO)
    }

    pub(crate) const fn is_star(self) -> bool {
        self.contains(Self::STAR)
    }
}

impl BitOr for SizeType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Solver state for one track, rebuilt when definitions change and reset
/// at the start of every measure pass.
#[derive(Debug, Clone)]
pub(crate) struct Track {
    /// Effective length; a star track in an active shared group reads as `Auto`
    pub(crate) size: GridLength,
    pub(crate) user_min: f64,
    pub(crate) user_max: f64,
    pub(crate) shared_group: Option<String>,
    /// Classification for the current measure pass
    pub(crate) size_type: SizeType,
    /// Minimum accumulated from content during measure
    raw_min: f64,
    /// Minimum imposed by the shared size group
    pub(crate) shared_min: f64,
    pub(crate) measure_size: f64,
    /// Scratch value for sorting and distribution
    pub(crate) size_cache: f64,
    pub(crate) final_size: f64,
    pub(crate) offset: f64,
}

impl Track {
    pub(crate) fn new(definition: &TrackDefinition, in_shared_scope: bool) -> Self {
        let shared_group = definition
            .shared_size_group
            .clone()
            .filter(|_| in_shared_scope);
        let size = if definition.size.is_star() && shared_group.is_some() {
            GridLength::Auto
        } else {
            definition.size
        };
        Self {
            size,
            user_min: definition.min,
            user_max: definition.max,
            shared_group,
            size_type: SizeType::NONE,
            raw_min: 0.0,
            shared_min: 0.0,
            measure_size: 0.0,
            size_cache: 0.0,
            final_size: 0.0,
            offset: 0.0,
        }
    }

    /// Reset measure state from the user values.
    ///
    /// With `star_as_auto` the axis is being sized to content, so star tracks
    /// take part in measurement like auto tracks.
    pub(crate) fn prepare_measure(&mut self, star_as_auto: bool) {
        self.raw_min = 0.0;
        let mut user_min = self.user_min;
        let user_max = self.user_max;
        let user_size = match self.size {
            GridLength::Fixed(value) => {
                self.size_type = SizeType::PIXEL;
                user_min = user_min.max(value.min(user_max));
                value
            }
            GridLength::Auto => {
                self.size_type = SizeType::AUTO;
                f64::INFINITY
            }
            GridLength::Star(_) => {
                self.size_type = if star_as_auto {
                    SizeType::AUTO
                } else {
                    SizeType::STAR
                };
                f64::INFINITY
            }
        };
        self.update_min(user_min);
        self.measure_size = user_min.max(user_size.min(user_max));
    }

    pub(crate) fn min_size(&self) -> f64 {
        self.raw_min.max(self.shared_min)
    }

    /// Minimum from this grid's own content, ignoring shared groups.
    pub(crate) const fn raw_min(&self) -> f64 {
        self.raw_min
    }

    pub(crate) fn update_min(&mut self, value: f64) {
        self.raw_min = self.raw_min.max(value);
    }

    pub(crate) fn set_min(&mut self, value: f64) {
        self.raw_min = value;
    }

    /// Size a span distribution may grow this track to before using its max.
    pub(crate) fn preferred_size(&self) -> f64 {
        if self.size_type.is_auto() {
            self.min_size()
        } else {
            self.min_size().max(self.measure_size)
        }
    }

    /// Size this track is measured against when content depends on it.
    pub(crate) fn measure_extent(&self) -> f64 {
        if self.size_type.is_auto() {
            self.min_size()
        } else {
            self.measure_size
        }
    }

    pub(crate) fn star_weight(&self) -> f64 {
        match self.size {
            GridLength::Star(weight) => weight,
            _ => 0.0,
        }
    }

    pub(crate) const fn is_shared(&self) -> bool {
        self.shared_group.is_some()
    }
}

/// Tracks for one axis, synthesizing a single `1*` track when none are defined.
pub(crate) fn build_tracks(definitions: &[TrackDefinition], in_shared_scope: bool) -> Vec<Track> {
    if definitions.is_empty() {
        return vec![Track::new(&TrackDefinition::default(), false)];
    }
    definitions
        .iter()
        .map(|definition| Track::new(definition, in_shared_scope))
        .collect()
}
