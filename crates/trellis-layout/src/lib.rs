#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::similar_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]
//! Grid layout for Trellis.
//!
//! A [`Grid`] divides its space into rows and columns sized as fixed
//! lengths, to content (`Auto`), or as weighted shares of what remains
//! (`*`). Children occupy a cell or a span of cells.
//!
//! Layout runs in two passes:
//!
//! - **Measure**: children are measured in an order that lets content-sized
//!   tracks settle before proportional tracks that depend on them. The
//!   result is the grid's desired size.
//! - **Arrange**: the final size is distributed over the tracks, optionally
//!   snapped to device pixels, and each child receives its cell rectangle.
//!
//! Grids can keep tracks the same size across instances through a
//! [`SharedSizeScope`].

mod arrange;
mod cell;
mod definition;
mod error;
mod grid;
mod length;
mod measure;
mod options;
mod shared;
mod span;
mod star;
mod template;

pub use cell::Placement;
pub use definition::{Axis, TrackDefinition};
pub use error::GridError;
pub use grid::{Grid, GridLayout};
pub use length::GridLength;
pub use options::{GridOptions, StarAlgorithm, DEFAULT_LAYOUT_LOOP_MAX_COUNT};
pub use shared::SharedSizeScope;
pub use template::GridTemplate;
