//! The measure pass: cell groups measured in dependency order.
//!
//! Star rows and star columns depend on each other when a cell in an auto
//! row spans a star column and another cell in a star row spans an auto
//! column. That case is solved by fixed-point iteration with a bounded
//! number of rounds.

use crate::cell::{Cell, CellStructure};
use crate::definition::{Axis, Track};
use crate::grid::{Child, Scratch};
use crate::options::{GridOptions, StarAlgorithm};
use crate::span::{ensure_min_size_in_range, SpanKey, SpanRequests};
use crate::star::{resolve_legacy, resolve_max_discrepancy, StarSlot};
use tracing::{debug, trace};
use trellis_core::{are_close, Constraints, Element, Size};

/// Borrowed view of a grid for the duration of one measure pass.
pub(crate) struct MeasurePass<'a, E> {
    pub(crate) columns: &'a mut [Track],
    pub(crate) rows: &'a mut [Track],
    pub(crate) structure: &'a CellStructure,
    pub(crate) children: &'a mut [Child<E>],
    pub(crate) options: &'a GridOptions,
    pub(crate) scratch: &'a mut Scratch,
    pub(crate) available: Size,
}

impl<E: Element> MeasurePass<'_, E> {
    /// Measure every cell and return the desired size of the grid.
    pub(crate) fn run(&mut self) -> Size {
        let structure = self.structure;

        self.measure_group(&structure.group1, false, false);

        if !structure.has_group3_cells_in_auto_rows {
            trace!("measure path: rows before columns");
            if structure.has_star_cells_v {
                self.resolve_star(Axis::Row);
            }
            self.measure_group(&structure.group2, false, false);
            if structure.has_star_cells_u {
                self.resolve_star(Axis::Column);
            }
            self.measure_group(&structure.group3, false, false);
        } else if structure.group2.is_empty() {
            trace!("measure path: columns before rows");
            if structure.has_star_cells_u {
                self.resolve_star(Axis::Column);
            }
            self.measure_group(&structure.group3, false, false);
            if structure.has_star_cells_v {
                self.resolve_star(Axis::Row);
            }
        } else {
            self.measure_cyclic();
        }

        self.measure_group(&structure.group4, false, false);

        Size::new(
            self.columns.iter().map(Track::min_size).sum(),
            self.rows.iter().map(Track::min_size).sum(),
        )
    }

    fn measure_cyclic(&mut self) {
        let structure = self.structure;
        let max_count = self.options.layout_loop_max_count;

        let group2_column_mins =
            cache_min_sizes(self.columns, &structure.cells, &structure.group2, Axis::Column);
        let group3_row_mins =
            cache_min_sizes(self.rows, &structure.cells, &structure.group3, Axis::Row);

        // Star rows first see an unbounded height so auto columns get a
        // provisional width.
        self.measure_group(&structure.group2, false, true);

        let mut count = 0;
        let mut changed = false;
        loop {
            trace!(iteration = count, "measure path: cyclic");
            if changed {
                apply_cached_min_sizes(self.rows, &group3_row_mins);
            }
            if structure.has_star_cells_u {
                self.resolve_star(Axis::Column);
            }
            self.measure_group(&structure.group3, false, false);

            apply_cached_min_sizes(self.columns, &group2_column_mins);
            if structure.has_star_cells_v {
                self.resolve_star(Axis::Row);
            }
            changed = self.measure_group(&structure.group2, count == max_count, false);

            count += 1;
            if !changed || count > max_count {
                break;
            }
        }

        if changed {
            debug!(
                iterations = count,
                "cyclic measurement hit its iteration cap; keeping the last layout"
            );
        }
    }

    /// Measure a group of cells and fold their desired sizes into the track
    /// minimums. Returns whether any desired width changed.
    fn measure_group(
        &mut self,
        group: &[usize],
        ignore_desired_u: bool,
        force_infinity_v: bool,
    ) -> bool {
        if group.is_empty() {
            return false;
        }

        let ignore_desired_v = force_infinity_v;
        let mut changed_u = false;
        let mut spans = SpanRequests::default();

        for &index in group {
            let cell = self.structure.cells[index];
            let old_width = self.children[index].desired.width;
            let desired = self.measure_cell(index, &cell, force_infinity_v);
            changed_u |= !are_close(old_width, desired.width);

            if !ignore_desired_u {
                if cell.column_span == 1 {
                    let track = &mut self.columns[cell.column];
                    track.update_min(desired.width.min(track.user_max));
                } else {
                    spans.register(
                        SpanKey {
                            axis: Axis::Column,
                            start: cell.column,
                            count: cell.column_span,
                        },
                        desired.width,
                    );
                }
            }

            if !ignore_desired_v {
                if cell.row_span == 1 {
                    let track = &mut self.rows[cell.row];
                    track.update_min(desired.height.min(track.user_max));
                } else {
                    spans.register(
                        SpanKey {
                            axis: Axis::Row,
                            start: cell.row,
                            count: cell.row_span,
                        },
                        desired.height,
                    );
                }
            }
        }

        for (key, requested) in spans.drain() {
            let tracks = match key.axis {
                Axis::Column => &mut *self.columns,
                Axis::Row => &mut *self.rows,
            };
            ensure_min_size_in_range(
                tracks,
                key.start,
                key.count,
                requested,
                &mut self.scratch.order,
            );
        }

        changed_u
    }

    fn measure_cell(&mut self, index: usize, cell: &Cell, force_infinity_v: bool) -> Size {
        let width = if cell.is_auto_u() && !cell.is_star_u() {
            f64::INFINITY
        } else {
            range_extent(self.columns, cell.column, cell.column_span)
        };
        let height = if force_infinity_v || (cell.is_auto_v() && !cell.is_star_v()) {
            f64::INFINITY
        } else {
            range_extent(self.rows, cell.row, cell.row_span)
        };

        let child = &mut self.children[index];
        child.desired = child
            .element
            .measure(Constraints::loose(Size::new(width, height)))
            .sanitized();
        child.desired
    }

    fn resolve_star(&mut self, axis: Axis) {
        let (tracks, available) = match axis {
            Axis::Column => (&mut *self.columns, self.available.width),
            Axis::Row => (&mut *self.rows, self.available.height),
        };

        let slots = &mut self.scratch.slots;
        slots.clear();
        let mut taken = 0.0;
        for (index, track) in tracks.iter().enumerate() {
            if track.size_type.is_star() {
                slots.push(StarSlot::new(
                    index,
                    track.star_weight(),
                    track.min_size(),
                    track.user_max,
                ));
            } else {
                taken += track.measure_extent();
            }
        }

        match self.options.star_algorithm {
            StarAlgorithm::MaxDiscrepancy => {
                resolve_max_discrepancy(slots, taken, available, &mut self.scratch.star);
            }
            StarAlgorithm::Legacy => resolve_legacy(slots, taken, available),
        }

        for slot in slots.iter() {
            tracks[slot.index].measure_size = slot.size;
        }
        trace!(%axis, available, stars = slots.len(), "resolved star tracks for measure");
    }
}

fn range_extent(tracks: &[Track], start: usize, count: usize) -> f64 {
    tracks[start..start + count].iter().map(Track::measure_extent).sum()
}

/// Snapshot the content minimum of every track a group's cells start in.
fn cache_min_sizes(
    tracks: &[Track],
    cells: &[Cell],
    group: &[usize],
    axis: Axis,
) -> Vec<Option<f64>> {
    let mut mins = vec![None; tracks.len()];
    for &index in group {
        let start = match axis {
            Axis::Column => cells[index].column,
            Axis::Row => cells[index].row,
        };
        mins[start] = Some(tracks[start].raw_min());
    }
    mins
}

fn apply_cached_min_sizes(tracks: &mut [Track], mins: &[Option<f64>]) {
    for (track, min) in tracks.iter_mut().zip(mins) {
        if let Some(min) = *min {
            track.set_min(min);
        }
    }
}
