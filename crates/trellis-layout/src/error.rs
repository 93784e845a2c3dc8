//! Error types for trellis-layout.
//!
//! Only the public boundary of the grid can fail: parsing lengths, validating
//! definitions and child attachments, and structural edits. Measure and
//! arrange never return errors.

use crate::definition::Axis;
use thiserror::Error;

/// Errors raised when configuring a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// A row or column span below one.
    #[error("{axis} span must be at least 1, got {span}")]
    InvalidSpan {
        /// Axis the span applies to
        axis: Axis,
        /// The rejected value
        span: i64,
    },

    /// A negative row or column index.
    #[error("{axis} index must not be negative, got {index}")]
    NegativeIndex {
        /// Axis the index applies to
        axis: Axis,
        /// The rejected value
        index: i64,
    },

    /// A track length that cannot be parsed or is out of range.
    #[error("invalid track length `{0}`")]
    InvalidLength(String),

    /// A min/max constraint that is NaN, negative, or an infinite minimum.
    #[error("invalid {name} constraint: {value}")]
    InvalidConstraint {
        /// Which constraint (`min` or `max`)
        name: &'static str,
        /// The rejected value
        value: f64,
    },

    /// A shared size group name that is not an identifier.
    #[error("invalid shared size group name `{0}`")]
    InvalidSharedSizeGroup(String),

    /// A track index past the end of the definitions.
    #[error("{axis} index {index} out of range ({len} defined)")]
    TrackIndexOutOfRange {
        /// Axis of the definition list
        axis: Axis,
        /// The requested index
        index: usize,
        /// Number of definitions
        len: usize,
    },

    /// A child index past the end of the children.
    #[error("child index {index} out of range ({len} children)")]
    ChildIndexOutOfRange {
        /// The requested index
        index: usize,
        /// Number of children
        len: usize,
    },

    /// A structural edit attempted while layout state is mid-pass.
    #[error("grid structure cannot change while a layout pass is in progress")]
    LayoutInProgress,
}
