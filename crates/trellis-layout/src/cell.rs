//! Child placement and the cell classifier.
//!
//! Cells are split into four groups by whether they touch star tracks in
//! each axis. The groups decide the order of measurement so that a cell is
//! measured only after the tracks it depends on have a usable size.

use crate::definition::{Axis, SizeType, Track};
use crate::error::GridError;
use serde::{Deserialize, Serialize};

/// Where a child sits in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// First row (0-indexed)
    pub row: usize,
    /// First column (0-indexed)
    pub column: usize,
    /// Number of rows covered (at least 1)
    pub row_span: usize,
    /// Number of columns covered (at least 1)
    pub column_span: usize,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            row: 0,
            column: 0,
            row_span: 1,
            column_span: 1,
        }
    }
}

impl Placement {
    /// Single cell at the given row and column.
    #[must_use]
    pub const fn new(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
        }
    }

    /// Set the row span.
    #[must_use]
    pub const fn with_row_span(mut self, span: usize) -> Self {
        self.row_span = span;
        self
    }

    /// Set the column span.
    #[must_use]
    pub const fn with_column_span(mut self, span: usize) -> Self {
        self.column_span = span;
        self
    }

    /// Build a placement from signed attached values, rejecting negative
    /// indices and spans below one.
    pub fn from_raw(
        row: i64,
        column: i64,
        row_span: i64,
        column_span: i64,
    ) -> Result<Self, GridError> {
        let index = |axis, value: i64| {
            usize::try_from(value).map_err(|_| GridError::NegativeIndex { axis, index: value })
        };
        let span = |axis, value: i64| match usize::try_from(value) {
            Ok(span) if span >= 1 => Ok(span),
            _ => Err(GridError::InvalidSpan { axis, span: value }),
        };
        Ok(Self {
            row: index(Axis::Row, row)?,
            column: index(Axis::Column, column)?,
            row_span: span(Axis::Row, row_span)?,
            column_span: span(Axis::Column, column_span)?,
        })
    }

    /// Check both spans are at least one.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.column_span == 0 {
            return Err(GridError::InvalidSpan {
                axis: Axis::Column,
                span: 0,
            });
        }
        if self.row_span == 0 {
            return Err(GridError::InvalidSpan {
                axis: Axis::Row,
                span: 0,
            });
        }
        Ok(())
    }

    /// Clamp into a grid with the given track counts: the start moves to the
    /// last track and the span is cut at the edge.
    #[must_use]
    pub fn clamped(&self, columns: usize, rows: usize) -> Self {
        let (column, column_span) = clamp_range(self.column, self.column_span, columns);
        let (row, row_span) = clamp_range(self.row, self.row_span, rows);
        Self {
            row,
            column,
            row_span,
            column_span,
        }
    }
}

fn clamp_range(start: usize, span: usize, count: usize) -> (usize, usize) {
    let last = count.saturating_sub(1);
    let start = start.min(last);
    (start, span.clamp(1, count.saturating_sub(start).max(1)))
}

/// Measurement group of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellGroup {
    /// No star track in either axis
    NonStar,
    /// Star rows, auto (non-star) columns
    StarRowsAutoColumns,
    /// Non-star rows, star columns
    NonStarRowsStarColumns,
    /// Everything else
    Rest,
}

/// A child placement clamped to the current tracks, with its span kinds.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cell {
    pub(crate) column: usize,
    pub(crate) column_span: usize,
    pub(crate) row: usize,
    pub(crate) row_span: usize,
    pub(crate) size_type_u: SizeType,
    pub(crate) size_type_v: SizeType,
}

impl Cell {
    pub(crate) const fn is_star_u(&self) -> bool {
        self.size_type_u.is_star()
    }

    pub(crate) const fn is_star_v(&self) -> bool {
        self.size_type_v.is_star()
    }

    pub(crate) const fn is_auto_u(&self) -> bool {
        self.size_type_u.is_auto()
    }

    pub(crate) const fn is_auto_v(&self) -> bool {
        self.size_type_v.is_auto()
    }

    const fn group(&self) -> CellGroup {
        if !self.is_star_v() {
            if self.is_star_u() {
                CellGroup::NonStarRowsStarColumns
            } else {
                CellGroup::NonStar
            }
        } else if self.is_auto_u() && !self.is_star_u() {
            CellGroup::StarRowsAutoColumns
        } else {
            CellGroup::Rest
        }
    }
}

/// Output of classification: cells in child order plus per-group indices.
#[derive(Debug, Clone, Default)]
pub(crate) struct CellStructure {
    pub(crate) cells: Vec<Cell>,
    pub(crate) group1: Vec<usize>,
    pub(crate) group2: Vec<usize>,
    pub(crate) group3: Vec<usize>,
    pub(crate) group4: Vec<usize>,
    pub(crate) has_star_cells_u: bool,
    pub(crate) has_star_cells_v: bool,
    pub(crate) has_group3_cells_in_auto_rows: bool,
}

fn span_size_type(tracks: &[Track], start: usize, count: usize) -> SizeType {
    tracks[start..start + count]
        .iter()
        .fold(SizeType::NONE, |acc, track| acc | track.size_type)
}

/// Clamp every placement and sort the cells into measurement groups.
///
/// Track size types must already be set for the current pass.
pub(crate) fn classify<'a>(
    placements: impl IntoIterator<Item = &'a Placement>,
    columns: &[Track],
    rows: &[Track],
) -> CellStructure {
    debug_assert!(!columns.is_empty() && !rows.is_empty());
    let mut structure = CellStructure::default();

    for (index, placement) in placements.into_iter().enumerate() {
        let clamped = placement.clamped(columns.len(), rows.len());
        let cell = Cell {
            column: clamped.column,
            column_span: clamped.column_span,
            row: clamped.row,
            row_span: clamped.row_span,
            size_type_u: span_size_type(columns, clamped.column, clamped.column_span),
            size_type_v: span_size_type(rows, clamped.row, clamped.row_span),
        };

        structure.has_star_cells_u |= cell.is_star_u();
        structure.has_star_cells_v |= cell.is_star_v();

        match cell.group() {
            CellGroup::NonStar => structure.group1.push(index),
            CellGroup::StarRowsAutoColumns => structure.group2.push(index),
            CellGroup::NonStarRowsStarColumns => {
                structure.has_group3_cells_in_auto_rows |= cell.is_auto_v();
                structure.group3.push(index);
            }
            CellGroup::Rest => structure.group4.push(index),
        }
        structure.cells.push(cell);
    }

    structure
}
