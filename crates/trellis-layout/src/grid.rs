//! The grid container: owns definitions, children, and layout state.

use crate::arrange::{set_final_size, Rounding};
use crate::cell::{classify, CellStructure, Placement};
use crate::definition::{build_tracks, Axis, Track, TrackDefinition};
use crate::error::GridError;
use crate::measure::MeasurePass;
use crate::options::GridOptions;
use crate::shared::{OwnerId, SharedSizeScope};
use crate::star::{StarBuffers, StarSlot};
use crate::template::GridTemplate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use trellis_core::{round_layout_value, Constraints, Element, LayoutResult, Rect, Size};

/// A child element with its placement and last desired size.
#[derive(Debug)]
pub(crate) struct Child<E> {
    pub(crate) element: E,
    pub(crate) placement: Placement,
    pub(crate) desired: Size,
}

/// Buffers reused across passes.
#[derive(Debug, Default)]
pub(crate) struct Scratch {
    pub(crate) order: Vec<usize>,
    pub(crate) errors: Vec<f64>,
    pub(crate) slots: Vec<StarSlot>,
    pub(crate) star: StarBuffers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Measure,
    Arrange,
}

#[derive(Debug)]
struct SharedLink {
    scope: SharedSizeScope,
    owner: OwnerId,
}

/// A table of rows and columns that sizes and positions its children.
///
/// Structural edits only mark state dirty; the work happens in
/// [`Grid::measure`] and [`Grid::arrange`].
///
/// ```
/// use trellis_core::Size;
/// use trellis_layout::{Grid, TrackDefinition};
///
/// let mut grid: Grid<Box<dyn trellis_core::Element>> = Grid::new();
/// grid.add_row(TrackDefinition::star(1.0)).unwrap();
/// grid.add_row(TrackDefinition::star(2.0)).unwrap();
/// grid.arrange(Size::new(100.0, 300.0));
///
/// assert_eq!(grid.actual_row_height(0), Some(100.0));
/// assert_eq!(grid.actual_row_height(1), Some(200.0));
/// ```
#[derive(Debug)]
pub struct Grid<E> {
    column_definitions: Vec<TrackDefinition>,
    row_definitions: Vec<TrackDefinition>,
    children: Vec<Child<E>>,
    options: GridOptions,
    shared: Option<SharedLink>,

    columns: Vec<Track>,
    rows: Vec<Track>,
    structure: CellStructure,
    scratch: Scratch,

    columns_dirty: bool,
    rows_dirty: bool,
    cells_dirty: bool,
    measure_valid: bool,
    arrange_valid: bool,
    /// Whether the last measure was unbounded in width and height
    size_to_content: Option<(bool, bool)>,
    /// Set while a pass runs; left set if a child panicked mid-pass
    pass: Option<Pass>,
    desired: Size,
    extent: Size,
}

impl<E> Default for Grid<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Drop for Grid<E> {
    fn drop(&mut self) {
        if let Some(link) = &self.shared {
            link.scope.withdraw(link.owner);
        }
    }
}

impl<E> Grid<E> {
    /// Create an empty grid: one implicit `1*` column and row.
    #[must_use]
    pub fn new() -> Self {
        Self {
            column_definitions: Vec::new(),
            row_definitions: Vec::new(),
            children: Vec::new(),
            options: GridOptions::default(),
            shared: None,
            columns: Vec::new(),
            rows: Vec::new(),
            structure: CellStructure::default(),
            scratch: Scratch::default(),
            columns_dirty: true,
            rows_dirty: true,
            cells_dirty: true,
            measure_valid: false,
            arrange_valid: false,
            size_to_content: None,
            pass: None,
            desired: Size::ZERO,
            extent: Size::ZERO,
        }
    }

    /// Create an empty grid with the given options.
    #[must_use]
    pub fn with_options(options: GridOptions) -> Self {
        let mut grid = Self::new();
        grid.options = options;
        grid
    }

    /// Create a grid from a declarative template.
    pub fn from_template(template: &GridTemplate) -> Result<Self, GridError> {
        template.validate()?;
        let mut grid = Self::with_options(template.options);
        grid.column_definitions.clone_from(&template.columns);
        grid.row_definitions.clone_from(&template.rows);
        Ok(grid)
    }

    /// Capture the definitions and options as a template.
    #[must_use]
    pub fn template(&self) -> GridTemplate {
        GridTemplate {
            columns: self.column_definitions.clone(),
            rows: self.row_definitions.clone(),
            options: self.options,
        }
    }

    /// Current options.
    #[must_use]
    pub const fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Replace the options.
    pub fn set_options(&mut self, options: GridOptions) -> Result<(), GridError> {
        self.check_idle()?;
        self.options = options;
        self.invalidate_measure();
        Ok(())
    }

    /// Attach to a shared size scope, or detach with `None`.
    pub fn set_shared_size_scope(
        &mut self,
        scope: Option<SharedSizeScope>,
    ) -> Result<(), GridError> {
        self.check_idle()?;
        if let (Some(link), Some(scope)) = (&self.shared, &scope) {
            if link.scope.ptr_eq(scope) {
                return Ok(());
            }
        }
        if let Some(link) = self.shared.take() {
            link.scope.withdraw(link.owner);
        }
        self.shared = scope.map(|scope| {
            let owner = scope.register();
            SharedLink { scope, owner }
        });
        self.columns_dirty = true;
        self.rows_dirty = true;
        self.invalidate_measure();
        Ok(())
    }

    /// The shared size scope this grid belongs to.
    #[must_use]
    pub fn shared_size_scope(&self) -> Option<&SharedSizeScope> {
        self.shared.as_ref().map(|link| &link.scope)
    }

    /// Whether a layout pass was interrupted, blocking structural edits until
    /// the next pass completes.
    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        self.pass.is_some()
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// Column definitions as supplied.
    #[must_use]
    pub fn column_definitions(&self) -> &[TrackDefinition] {
        &self.column_definitions
    }

    /// Row definitions as supplied.
    #[must_use]
    pub fn row_definitions(&self) -> &[TrackDefinition] {
        &self.row_definitions
    }

    /// Number of columns laid out, counting the implicit one.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.column_definitions.len().max(1)
    }

    /// Number of rows laid out, counting the implicit one.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_definitions.len().max(1)
    }

    /// Append a column.
    pub fn add_column(&mut self, definition: TrackDefinition) -> Result<(), GridError> {
        let len = self.definitions(Axis::Column).len();
        self.insert_definition(Axis::Column, len, definition)
    }

    /// Append a row.
    pub fn add_row(&mut self, definition: TrackDefinition) -> Result<(), GridError> {
        let len = self.definitions(Axis::Row).len();
        self.insert_definition(Axis::Row, len, definition)
    }

    /// Insert a column before `index`.
    pub fn insert_column(
        &mut self,
        index: usize,
        definition: TrackDefinition,
    ) -> Result<(), GridError> {
        self.insert_definition(Axis::Column, index, definition)
    }

    /// Insert a row before `index`.
    pub fn insert_row(
        &mut self,
        index: usize,
        definition: TrackDefinition,
    ) -> Result<(), GridError> {
        self.insert_definition(Axis::Row, index, definition)
    }

    /// Replace the column at `index`.
    pub fn set_column(
        &mut self,
        index: usize,
        definition: TrackDefinition,
    ) -> Result<(), GridError> {
        self.set_definition(Axis::Column, index, definition)
    }

    /// Replace the row at `index`.
    pub fn set_row(&mut self, index: usize, definition: TrackDefinition) -> Result<(), GridError> {
        self.set_definition(Axis::Row, index, definition)
    }

    /// Remove and return the column at `index`.
    pub fn remove_column(&mut self, index: usize) -> Result<TrackDefinition, GridError> {
        self.remove_definition(Axis::Column, index)
    }

    /// Remove and return the row at `index`.
    pub fn remove_row(&mut self, index: usize) -> Result<TrackDefinition, GridError> {
        self.remove_definition(Axis::Row, index)
    }

    /// Remove every column definition.
    pub fn clear_columns(&mut self) -> Result<(), GridError> {
        self.check_idle()?;
        self.column_definitions.clear();
        self.mark_definitions_dirty(Axis::Column);
        Ok(())
    }

    /// Remove every row definition.
    pub fn clear_rows(&mut self) -> Result<(), GridError> {
        self.check_idle()?;
        self.row_definitions.clear();
        self.mark_definitions_dirty(Axis::Row);
        Ok(())
    }

    fn definitions(&self, axis: Axis) -> &[TrackDefinition] {
        match axis {
            Axis::Column => &self.column_definitions,
            Axis::Row => &self.row_definitions,
        }
    }

    fn definitions_mut(&mut self, axis: Axis) -> &mut Vec<TrackDefinition> {
        match axis {
            Axis::Column => &mut self.column_definitions,
            Axis::Row => &mut self.row_definitions,
        }
    }

    fn insert_definition(
        &mut self,
        axis: Axis,
        index: usize,
        definition: TrackDefinition,
    ) -> Result<(), GridError> {
        self.check_idle()?;
        definition.validate()?;
        let len = self.definitions(axis).len();
        if index > len {
            return Err(GridError::TrackIndexOutOfRange { axis, index, len });
        }
        self.definitions_mut(axis).insert(index, definition);
        self.mark_definitions_dirty(axis);
        Ok(())
    }

    fn set_definition(
        &mut self,
        axis: Axis,
        index: usize,
        definition: TrackDefinition,
    ) -> Result<(), GridError> {
        self.check_idle()?;
        definition.validate()?;
        let len = self.definitions(axis).len();
        let slot = self
            .definitions_mut(axis)
            .get_mut(index)
            .ok_or(GridError::TrackIndexOutOfRange { axis, index, len })?;
        *slot = definition;
        self.mark_definitions_dirty(axis);
        Ok(())
    }

    fn remove_definition(
        &mut self,
        axis: Axis,
        index: usize,
    ) -> Result<TrackDefinition, GridError> {
        self.check_idle()?;
        let len = self.definitions(axis).len();
        if index >= len {
            return Err(GridError::TrackIndexOutOfRange { axis, index, len });
        }
        let removed = self.definitions_mut(axis).remove(index);
        self.mark_definitions_dirty(axis);
        Ok(removed)
    }

    fn mark_definitions_dirty(&mut self, axis: Axis) {
        match axis {
            Axis::Column => self.columns_dirty = true,
            Axis::Row => self.rows_dirty = true,
        }
        self.invalidate_measure();
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Add a child at `placement`, returning its index.
    pub fn add_child(&mut self, element: E, placement: Placement) -> Result<usize, GridError> {
        self.check_idle()?;
        placement.validate()?;
        self.children.push(Child {
            element,
            placement,
            desired: Size::ZERO,
        });
        self.cells_dirty = true;
        self.invalidate_measure();
        Ok(self.children.len() - 1)
    }

    /// Remove and return the child at `index`.
    pub fn remove_child(&mut self, index: usize) -> Result<E, GridError> {
        self.check_idle()?;
        let len = self.children.len();
        if index >= len {
            return Err(GridError::ChildIndexOutOfRange { index, len });
        }
        let child = self.children.remove(index);
        self.cells_dirty = true;
        self.invalidate_measure();
        Ok(child.element)
    }

    /// Move the child at `index`.
    pub fn set_placement(&mut self, index: usize, placement: Placement) -> Result<(), GridError> {
        self.check_idle()?;
        placement.validate()?;
        let len = self.children.len();
        let child = self
            .children
            .get_mut(index)
            .ok_or(GridError::ChildIndexOutOfRange { index, len })?;
        child.placement = placement;
        self.cells_dirty = true;
        self.invalidate_measure();
        Ok(())
    }

    /// Placement of the child at `index`, as supplied.
    #[must_use]
    pub fn placement(&self, index: usize) -> Option<Placement> {
        self.children.get(index).map(|child| child.placement)
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&E> {
        self.children.get(index).map(|child| &child.element)
    }

    /// Mutable access to the child at `index`.
    ///
    /// Changing what a child will report from `measure` requires
    /// [`Grid::invalidate_measure`].
    pub fn child_mut(&mut self, index: usize) -> Option<&mut E> {
        self.children.get_mut(index).map(|child| &mut child.element)
    }

    /// Iterate over the children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = &E> {
        self.children.iter().map(|child| &child.element)
    }

    /// Force the next arrange to measure again.
    pub fn invalidate_measure(&mut self) {
        self.measure_valid = false;
        self.arrange_valid = false;
    }

    fn check_idle(&self) -> Result<(), GridError> {
        if self.pass.is_some() {
            Err(GridError::LayoutInProgress)
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Desired size from the last measure: the sum of track minimums.
    #[must_use]
    pub const fn desired_size(&self) -> Size {
        self.desired
    }

    /// Final width of a column; 0 until arranged, `None` out of range.
    #[must_use]
    pub fn actual_column_width(&self, index: usize) -> Option<f64> {
        self.actual(Axis::Column, index, |track| track.final_size)
    }

    /// Final height of a row; 0 until arranged, `None` out of range.
    #[must_use]
    pub fn actual_row_height(&self, index: usize) -> Option<f64> {
        self.actual(Axis::Row, index, |track| track.final_size)
    }

    /// Left edge of a column. `index == column_count()` gives the right
    /// edge of the last column.
    #[must_use]
    pub fn column_offset(&self, index: usize) -> Option<f64> {
        self.offset(Axis::Column, index)
    }

    /// Top edge of a row. `index == row_count()` gives the bottom edge of
    /// the last row.
    #[must_use]
    pub fn row_offset(&self, index: usize) -> Option<f64> {
        self.offset(Axis::Row, index)
    }

    fn track_count(&self, axis: Axis) -> usize {
        match axis {
            Axis::Column => self.column_count(),
            Axis::Row => self.row_count(),
        }
    }

    fn tracks(&self, axis: Axis) -> &[Track] {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    fn actual(&self, axis: Axis, index: usize, read: impl Fn(&Track) -> f64) -> Option<f64> {
        if index >= self.track_count(axis) {
            return None;
        }
        if !self.arrange_valid {
            return Some(0.0);
        }
        self.tracks(axis).get(index).map(read)
    }

    fn offset(&self, axis: Axis, index: usize) -> Option<f64> {
        let count = self.track_count(axis);
        if index == count && count > 0 {
            let extent = match axis {
                Axis::Column => self.extent.width,
                Axis::Row => self.extent.height,
            };
            return Some(if self.arrange_valid { extent } else { 0.0 });
        }
        self.actual(axis, index, |track| track.offset)
    }

    /// Snapshot of the arranged tracks.
    #[must_use]
    pub fn layout(&self) -> GridLayout {
        let snapshot = |axis: Axis| -> Vec<(f64, f64)> {
            (0..self.track_count(axis))
                .map(|i| {
                    (
                        self.offset(axis, i).unwrap_or(0.0),
                        self.actual(axis, i, |track| track.final_size).unwrap_or(0.0),
                    )
                })
                .collect()
        };
        GridLayout {
            columns: snapshot(Axis::Column),
            rows: snapshot(Axis::Row),
            width: if self.arrange_valid { self.extent.width } else { 0.0 },
            height: if self.arrange_valid { self.extent.height } else { 0.0 },
        }
    }

    // =========================================================================
    // Shared Size Groups
    // =========================================================================

    /// Pull each shared track's group minimum, optionally withdrawing this
    /// grid's previous contributions first.
    fn read_shared_minimums(&mut self, withdraw: bool) {
        let Some(link) = &self.shared else {
            return;
        };
        if withdraw {
            link.scope.withdraw(link.owner);
        }
        for track in self.columns.iter_mut().chain(self.rows.iter_mut()) {
            if let Some(group) = &track.shared_group {
                track.shared_min = link.scope.group_size(group).unwrap_or(0.0);
            }
        }
    }

    fn publish_shared_minimums(&mut self) {
        let Some(link) = &self.shared else {
            return;
        };
        for (axis, tracks) in [(Axis::Column, &self.columns), (Axis::Row, &self.rows)] {
            for (index, track) in tracks.iter().enumerate() {
                if let Some(group) = &track.shared_group {
                    link.scope.publish(link.owner, axis, index, group, track.raw_min());
                }
            }
        }
        self.read_shared_minimums(false);
    }

    // =========================================================================
    // Layout State
    // =========================================================================

    fn begin_pass(&mut self, pass: Pass) {
        if let Some(interrupted) = self.pass {
            debug!(?interrupted, "recovering from an interrupted layout pass");
            self.columns_dirty = true;
            self.rows_dirty = true;
            self.cells_dirty = true;
            self.invalidate_measure();
        }
        self.pass = Some(pass);
    }

    fn end_pass(&mut self) {
        self.pass = None;
    }

    fn validate_tracks(&mut self) {
        let in_scope = self.shared.is_some();
        if self.columns_dirty {
            self.columns = build_tracks(&self.column_definitions, in_scope);
            self.columns_dirty = false;
            self.cells_dirty = true;
        }
        if self.rows_dirty {
            self.rows = build_tracks(&self.row_definitions, in_scope);
            self.rows_dirty = false;
            self.cells_dirty = true;
        }
    }
}

impl<E: Element> Grid<E> {
    /// Measure against `available` and return the desired size.
    ///
    /// An infinite dimension sizes that axis to content: star tracks in it
    /// behave as auto tracks.
    pub fn measure(&mut self, available: Size) -> Size {
        debug!(
            width = available.width,
            height = available.height,
            children = self.children.len(),
            "grid measure"
        );
        self.begin_pass(Pass::Measure);

        let size_to_content = (available.width.is_infinite(), available.height.is_infinite());
        if self.size_to_content != Some(size_to_content) {
            self.size_to_content = Some(size_to_content);
            self.cells_dirty = true;
        }

        self.validate_tracks();
        for track in &mut self.columns {
            track.prepare_measure(size_to_content.0);
        }
        for track in &mut self.rows {
            track.prepare_measure(size_to_content.1);
        }
        self.read_shared_minimums(true);

        if self.cells_dirty {
            self.structure = classify(
                self.children.iter().map(|child| &child.placement),
                &self.columns,
                &self.rows,
            );
            self.cells_dirty = false;
        }

        let desired = MeasurePass {
            columns: &mut self.columns,
            rows: &mut self.rows,
            structure: &self.structure,
            children: &mut self.children,
            options: &self.options,
            scratch: &mut self.scratch,
            available,
        }
        .run();

        self.publish_shared_minimums();
        self.desired = desired;
        self.measure_valid = true;
        self.arrange_valid = false;
        self.end_pass();
        desired
    }

    /// Arrange into `final_size` at the origin and return the size used.
    ///
    /// Measures first if anything changed since the last measure.
    pub fn arrange(&mut self, final_size: Size) -> Size {
        self.arrange_in(Rect::from_size(final_size))
    }

    fn arrange_in(&mut self, bounds: Rect) -> Size {
        if !self.measure_valid || self.pass.is_some() {
            self.measure(bounds.size());
        }
        debug!(
            width = bounds.width,
            height = bounds.height,
            children = self.children.len(),
            "grid arrange"
        );
        self.begin_pass(Pass::Arrange);

        let options = self.options;
        let mut final_size = bounds.size();
        let (rounding_x, rounding_y) = if options.use_layout_rounding {
            final_size = Size::new(
                round_layout_value(final_size.width, options.dpi.x),
                round_layout_value(final_size.height, options.dpi.y),
            );
            (
                Some(Rounding { dpi: options.dpi.x }),
                Some(Rounding { dpi: options.dpi.y }),
            )
        } else {
            (None, None)
        };

        self.read_shared_minimums(false);
        let width = set_final_size(
            &mut self.columns,
            final_size.width,
            options.star_algorithm,
            rounding_x,
            &mut self.scratch,
        );
        let height = set_final_size(
            &mut self.rows,
            final_size.height,
            options.star_algorithm,
            rounding_y,
            &mut self.scratch,
        );
        self.extent = Size::new(width, height);

        for (child, cell) in self.children.iter_mut().zip(&self.structure.cells) {
            let columns = &self.columns[cell.column..cell.column + cell.column_span];
            let rows = &self.rows[cell.row..cell.row + cell.row_span];
            let rect = Rect::new(
                columns[0].offset,
                rows[0].offset,
                columns.iter().map(|track| track.final_size).sum(),
                rows.iter().map(|track| track.final_size).sum(),
            );
            child.element.arrange(rect.translate(bounds.origin()));
        }

        self.arrange_valid = true;
        self.end_pass();
        final_size
    }
}

impl<E: Element> Element for Grid<E> {
    fn measure(&mut self, constraints: Constraints) -> Size {
        let desired = Grid::measure(self, constraints.max_size());
        constraints.constrain(desired)
    }

    fn arrange(&mut self, bounds: Rect) -> LayoutResult {
        LayoutResult {
            size: self.arrange_in(bounds),
        }
    }
}

/// Arranged track geometry of a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Column positions and sizes (start, size)
    pub columns: Vec<(f64, f64)>,
    /// Row positions and sizes (start, size)
    pub rows: Vec<(f64, f64)>,
    /// Total grid width
    pub width: f64,
    /// Total grid height
    pub height: f64,
}

impl GridLayout {
    /// Rectangle covered by a placement, clamped like the grid clamps
    /// children. `None` if the layout has no tracks.
    #[must_use]
    pub fn cell_rect(&self, placement: &Placement) -> Option<Rect> {
        if self.columns.is_empty() || self.rows.is_empty() {
            return None;
        }
        let p = placement.clamped(self.columns.len(), self.rows.len());
        let columns = &self.columns[p.column..p.column + p.column_span];
        let rows = &self.rows[p.row..p.row + p.row_span];

        Some(Rect::new(
            columns[0].0,
            rows[0].0,
            columns.iter().map(|(_, size)| size).sum(),
            rows.iter().map(|(_, size)| size).sum(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::length::GridLength;

    #[derive(Debug, Clone, PartialEq)]
    struct Block {
        size: Size,
        bounds: Option<Rect>,
    }

    impl Block {
        fn new(width: f64, height: f64) -> Self {
            Self {
                size: Size::new(width, height),
                bounds: None,
            }
        }
    }

    impl Element for Block {
        fn measure(&mut self, constraints: Constraints) -> Size {
            constraints.constrain(self.size)
        }

        fn arrange(&mut self, bounds: Rect) -> LayoutResult {
            self.bounds = Some(bounds);
            LayoutResult {
                size: bounds.size(),
            }
        }
    }

    fn grid(columns: &[GridLength], rows: &[GridLength]) -> Grid<Block> {
        let mut grid = Grid::new();
        for &c in columns {
            grid.add_column(c.into()).unwrap();
        }
        for &r in rows {
            grid.add_row(r.into()).unwrap();
        }
        grid
    }

    // =========================================================================
    // Structure Tests
    // =========================================================================

    #[test]
    fn test_empty_grid_has_implicit_tracks() {
        let mut g: Grid<Block> = Grid::new();
        assert_eq!(g.column_count(), 1);
        assert_eq!(g.row_count(), 1);
        g.arrange(Size::new(40.0, 30.0));
        assert_eq!(g.actual_column_width(0), Some(40.0));
        assert_eq!(g.actual_row_height(0), Some(30.0));
        assert_eq!(g.actual_column_width(1), None);
    }

    #[test]
    fn test_definition_edits() {
        let mut g: Grid<Block> = Grid::new();
        g.add_column(TrackDefinition::px(10.0)).unwrap();
        g.add_column(TrackDefinition::px(30.0)).unwrap();
        g.insert_column(1, TrackDefinition::px(20.0)).unwrap();
        assert_eq!(g.column_count(), 3);
        assert_eq!(g.column_definitions()[1], TrackDefinition::px(20.0));

        g.set_column(0, TrackDefinition::auto()).unwrap();
        assert_eq!(g.remove_column(2).unwrap(), TrackDefinition::px(30.0));
        assert_eq!(
            g.remove_column(5),
            Err(GridError::TrackIndexOutOfRange {
                axis: Axis::Column,
                index: 5,
                len: 2
            })
        );
        assert!(g.insert_row(1, TrackDefinition::auto()).is_err());
        g.clear_columns().unwrap();
        assert_eq!(g.column_count(), 1);
    }

    #[test]
    fn test_invalid_definition_rejected() {
        let mut g: Grid<Block> = Grid::new();
        assert!(g.add_row(TrackDefinition::auto().with_min(-5.0)).is_err());
        assert!(g.row_definitions().is_empty());
    }

    #[test]
    fn test_child_edits() {
        let mut g: Grid<Block> = Grid::new();
        let a = g.add_child(Block::new(1.0, 1.0), Placement::new(0, 0)).unwrap();
        let b = g.add_child(Block::new(2.0, 2.0), Placement::new(3, 3)).unwrap();
        assert_eq!((a, b), (0, 1));
        assert_eq!(g.child_count(), 2);

        g.set_placement(0, Placement::new(1, 1)).unwrap();
        assert_eq!(g.placement(0), Some(Placement::new(1, 1)));
        assert!(g.set_placement(9, Placement::default()).is_err());
        assert!(g
            .add_child(Block::new(1.0, 1.0), Placement::new(0, 0).with_row_span(0))
            .is_err());

        let removed = g.remove_child(1).unwrap();
        assert_eq!(removed.size, Size::new(2.0, 2.0));
        assert_eq!(
            g.remove_child(1).unwrap_err(),
            GridError::ChildIndexOutOfRange { index: 1, len: 1 }
        );
    }

    // =========================================================================
    // Dirty State Tests
    // =========================================================================

    #[test]
    fn test_actuals_zero_until_arranged() {
        let mut g = grid(&[GridLength::px(10.0)], &[GridLength::px(10.0)]);
        assert_eq!(g.actual_column_width(0), Some(0.0));
        g.arrange(Size::new(100.0, 100.0));
        assert_eq!(g.actual_column_width(0), Some(10.0));

        g.add_column(TrackDefinition::px(5.0)).unwrap();
        assert_eq!(g.actual_column_width(0), Some(0.0));
        assert_eq!(g.actual_column_width(1), Some(0.0));
        g.arrange(Size::new(100.0, 100.0));
        assert_eq!(g.actual_column_width(1), Some(5.0));
    }

    #[test]
    fn test_offsets_and_extent() {
        let mut g = grid(
            &[GridLength::px(10.0), GridLength::px(20.0)],
            &[GridLength::Auto],
        );
        g.arrange(Size::new(100.0, 50.0));
        assert_eq!(g.column_offset(0), Some(0.0));
        assert_eq!(g.column_offset(1), Some(10.0));
        assert_eq!(g.column_offset(2), Some(30.0));
        assert_eq!(g.column_offset(3), None);
    }

    // =========================================================================
    // Layout Tests
    // =========================================================================

    #[test]
    fn test_child_rect_covers_span() {
        let mut g = grid(
            &[GridLength::px(10.0), GridLength::px(20.0), GridLength::px(30.0)],
            &[GridLength::px(5.0), GridLength::px(15.0)],
        );
        g.add_child(
            Block::new(0.0, 0.0),
            Placement::new(1, 1).with_column_span(2),
        )
        .unwrap();
        g.arrange(Size::new(60.0, 20.0));
        assert_eq!(g.child(0).unwrap().bounds, Some(Rect::new(10.0, 5.0, 50.0, 15.0)));
    }

    #[test]
    fn test_desired_size_is_sum_of_minimums() {
        let mut g = grid(
            &[GridLength::Auto, GridLength::px(25.0)],
            &[GridLength::Auto],
        );
        g.add_child(Block::new(40.0, 12.0), Placement::new(0, 0)).unwrap();
        let desired = g.measure(Size::new(500.0, 500.0));
        assert_eq!(desired, Size::new(65.0, 12.0));
        assert_eq!(g.desired_size(), desired);
    }

    #[test]
    fn test_layout_snapshot_and_cell_rect() {
        let mut g = grid(&[GridLength::star(1.0), GridLength::star(3.0)], &[]);
        g.arrange(Size::new(400.0, 50.0));
        let layout = g.layout();
        assert_eq!(layout.columns, vec![(0.0, 100.0), (100.0, 300.0)]);
        assert_eq!(layout.rows, vec![(0.0, 50.0)]);
        assert_eq!(layout.width, 400.0);
        assert_eq!(
            layout.cell_rect(&Placement::new(0, 0).with_column_span(2)),
            Some(Rect::new(0.0, 0.0, 400.0, 50.0))
        );
        assert_eq!(
            layout.cell_rect(&Placement::new(4, 9)),
            Some(Rect::new(100.0, 0.0, 300.0, 50.0))
        );
        assert_eq!(GridLayout::default().cell_rect(&Placement::default()), None);
    }

    #[test]
    fn test_nested_grid_as_element() {
        let mut inner = grid(&[GridLength::px(30.0)], &[GridLength::px(20.0)]);
        inner.add_child(Block::new(5.0, 5.0), Placement::default()).unwrap();

        let mut outer: Grid<Grid<Block>> = Grid::new();
        outer.add_column(TrackDefinition::px(10.0)).unwrap();
        outer.add_column(TrackDefinition::auto()).unwrap();
        outer.add_child(inner, Placement::new(0, 1)).unwrap();

        let desired = outer.measure(Size::new(f64::INFINITY, f64::INFINITY));
        assert_eq!(desired, Size::new(40.0, 20.0));

        outer.arrange(Size::new(40.0, 20.0));
        let inner = outer.child(0).unwrap();
        assert_eq!(inner.child(0).unwrap().bounds, Some(Rect::new(10.0, 0.0, 30.0, 20.0)));
    }

    #[test]
    fn test_template_round_trip() {
        let mut g: Grid<Block> = Grid::with_options(GridOptions::new().with_layout_rounding(true));
        g.add_column(TrackDefinition::auto()).unwrap();
        let template = g.template();
        let rebuilt: Grid<Block> = Grid::from_template(&template).unwrap();
        assert_eq!(rebuilt.column_definitions(), g.column_definitions());
        assert!(rebuilt.options().use_layout_rounding);
    }
}
