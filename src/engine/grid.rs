//! Hex-offset grid: rows, cell addressing and pixel mapping
//!
//! The board is an ordered list of rows, index 0 adjacent to the ceiling.
//! Row kinds strictly alternate: a `Whole` row starts half a bubble-width
//! from the board edge, a `Half` row is shifted right another half width and
//! holds one fewer column. Rows overlap vertically by 15% so the packing
//! reads as hexagonal.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bubble::{Bubble, BubbleState, Colour};
use crate::consts::ROW_OVERLAP;

/// Lateral offset state of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowKind {
    Whole = 0,
    Half = 1,
}

impl RowKind {
    /// Offset multiplier (0 for `Whole`, 1 for `Half`), used by both the
    /// pixel mapping and the diagonal neighbour deltas
    #[inline]
    pub fn offset(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            RowKind::Whole => RowKind::Half,
            RowKind::Half => RowKind::Whole,
        }
    }
}

/// A cell address `(column, row)`. Valid only relative to the addressed
/// row's kind; addresses are not stable pointers and the cell may be empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: usize,
    pub row: usize,
}

impl Cell {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Row {
    kind: RowKind,
    cells: Vec<Option<Bubble>>,
}

impl Row {
    fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

/// The bubble grid. Owns every resting bubble and keeps the colour-in-play
/// counters equal to the occupied-cell counts at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Row>,
    /// Column counts, indexed by `RowKind::offset()`
    columns: [usize; 2],
    bubble_size: Vec2,
    offset: Vec2,
    colours_in_play: [u32; Colour::PALETTE],
    total_bubbles: u32,
}

impl Grid {
    /// Create an empty grid filling `board_width` pixels, centred by
    /// adjusting the x offset for the leftover fraction of a column.
    pub fn new(board_width: f32, bubble_size: Vec2, board_offset: Vec2) -> Self {
        let whole = (board_width / bubble_size.x).floor() as usize;
        let half = (board_width / bubble_size.x - 0.5).floor() as usize;

        // Centre on the longest row (a Half row is half a width longer than
        // its column count suggests).
        let longest = if whole > half {
            whole as f32
        } else {
            half as f32 + 0.5
        };
        let x_centering = (board_width - longest * bubble_size.x) * 0.5;

        Self {
            rows: Vec::new(),
            columns: [whole, half],
            bubble_size,
            offset: Vec2::new(board_offset.x + x_centering, board_offset.y),
            colours_in_play: [0; Colour::PALETTE],
            total_bubbles: 0,
        }
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn columns_for(&self, kind: RowKind) -> usize {
        self.columns[kind.offset()]
    }

    #[inline]
    pub fn bubble_size(&self) -> Vec2 {
        self.bubble_size
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Board midline x, used to pick the lateral kick direction of falling
    /// bubbles
    pub fn midline_x(&self) -> f32 {
        self.offset.x + self.columns_for(RowKind::Whole) as f32 * self.bubble_size.x * 0.5
    }

    /// Kind of an arbitrary row index, including indices at or past the last
    /// row. Derived, never stored: alternation makes it a pure function of
    /// the stored rows' parity (`Whole` at row 0 when the grid is empty).
    pub fn row_kind(&self, row: usize) -> RowKind {
        if let Some(stored) = self.rows.get(row) {
            return stored.kind;
        }
        match self.rows.last() {
            Some(last) => {
                let last_index = self.rows.len() - 1;
                if (row - last_index) % 2 == 0 {
                    last.kind
                } else {
                    last.kind.opposite()
                }
            }
            None => {
                if row % 2 == 0 {
                    RowKind::Whole
                } else {
                    RowKind::Half
                }
            }
        }
    }

    /// Kind a row inserted above the ceiling row would get
    pub fn next_kind_top(&self) -> RowKind {
        self.rows
            .first()
            .map_or(RowKind::Whole, |row| row.kind.opposite())
    }

    /// Kind a row inserted below the last row would get
    pub fn next_kind_bottom(&self) -> RowKind {
        self.rows
            .last()
            .map_or(RowKind::Whole, |row| row.kind.opposite())
    }

    /// Pixel centre of a cell. Valid for any row index; kind is derived.
    pub fn cell_to_pixel(&self, cell: Cell) -> Vec2 {
        let kind = self.row_kind(cell.row);
        let w = self.bubble_size.x;
        let h = self.bubble_size.y;

        // Column offset: half a width for Whole rows, a full width for Half
        let x = cell.col as f32 * w + w * 0.5 * (1 + kind.offset()) as f32 + self.offset.x;
        // Rows overlap by 15%; half a height accounts for the centre origin
        let y = cell.row as f32 * ROW_OVERLAP * h + h * 0.5 + self.offset.y;

        Vec2::new(x, y)
    }

    /// Cell containing a pixel position. Row is clamped to `[0, row_count]`
    /// (`row_count` itself means "would land in a new bottom row"); column is
    /// clamped to the valid range for the resolved row's kind.
    pub fn pixel_to_cell(&self, pos: Vec2) -> Cell {
        let h = self.bubble_size.y;
        let w = self.bubble_size.x;

        let row_f = ((pos.y - self.offset.y) / h / ROW_OVERLAP).floor();
        let row = (row_f as isize).clamp(0, self.rows.len() as isize) as usize;

        let kind = self.row_kind(row);
        let col_f = ((pos.x - self.offset.x - kind.offset() as f32 * w * 0.5) / w).floor();
        let max_col = self.columns_for(kind).saturating_sub(1);
        let col = (col_f as isize).clamp(0, max_col as isize) as usize;

        Cell::new(col, row)
    }

    /// Up to six neighbour addresses of a cell: same-row left/right plus two
    /// diagonals each in the rows above and below, offset by the current
    /// row's kind (`kind-1` and `kind` column deltas). Out-of-bounds indices
    /// are omitted; an out-of-bounds `cell` has no neighbours.
    pub fn neighbours(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(6);
        let Some(row) = self.rows.get(cell.row) else {
            return out;
        };
        let kind = row.kind;
        if cell.col >= self.columns_for(kind) {
            return out;
        }

        let lower = kind.offset() as isize - 1;
        let upper = kind.offset() as isize;
        let other_cols = self.columns_for(kind.opposite()) as isize;
        let col = cell.col as isize;

        if cell.row > 0 {
            if col + lower >= 0 {
                out.push(Cell::new((col + lower) as usize, cell.row - 1));
            }
            if col + upper < other_cols {
                out.push(Cell::new((col + upper) as usize, cell.row - 1));
            }
        }

        if cell.col > 0 {
            out.push(Cell::new(cell.col - 1, cell.row));
        }
        if cell.col + 1 < self.columns_for(kind) {
            out.push(Cell::new(cell.col + 1, cell.row));
        }

        if cell.row + 1 < self.rows.len() {
            if col + lower >= 0 {
                out.push(Cell::new((col + lower) as usize, cell.row + 1));
            }
            if col + upper < other_cols {
                out.push(Cell::new((col + upper) as usize, cell.row + 1));
            }
        }

        out
    }

    /// Bubble at a cell. `None` both for an empty cell and for an
    /// out-of-bounds address; use [`Grid::in_bounds`] to distinguish.
    pub fn bubble(&self, cell: Cell) -> Option<&Bubble> {
        self.rows.get(cell.row)?.cells.get(cell.col)?.as_ref()
    }

    /// Whether the address names a cell slot in the current grid
    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.rows
            .get(cell.row)
            .is_some_and(|row| cell.col < row.cells.len())
    }

    /// Add a row above the current ceiling row
    pub fn add_row_top(&mut self, cells: Vec<Option<Bubble>>) {
        self.add_row(cells, true);
    }

    /// Add a row below the current last row
    pub fn add_row_bottom(&mut self, cells: Vec<Option<Bubble>>) {
        self.add_row(cells, false);
    }

    fn add_row(&mut self, mut cells: Vec<Option<Bubble>>, at_top: bool) {
        let kind = if at_top {
            self.next_kind_top()
        } else {
            self.next_kind_bottom()
        };
        let width = self.columns_for(kind);

        // Wrong-length rows are normalized, not rejected: the generator and
        // the row geometry are allowed to drift.
        cells.truncate(width);
        cells.resize_with(width, || None);

        for bubble in cells.iter().flatten() {
            self.colours_in_play[bubble.colour.index()] += 1;
            self.total_bubbles += 1;
        }

        let row = Row { kind, cells };
        if at_top {
            self.rows.insert(0, row);
        } else {
            self.rows.push(row);
        }
        self.update_positions();

        log::debug!(
            "added {:?} row at {}; rows={} bubbles={}",
            kind,
            if at_top { "top" } else { "bottom" },
            self.rows.len(),
            self.total_bubbles
        );
    }

    /// Re-snap every resting bubble to its cell centre (row indices shift
    /// when a row is inserted at the top)
    fn update_positions(&mut self) {
        for row in 0..self.rows.len() {
            for col in 0..self.rows[row].cells.len() {
                let pos = self.cell_to_pixel(Cell::new(col, row));
                if let Some(bubble) = &mut self.rows[row].cells[col] {
                    bubble.pos = pos;
                }
            }
        }
    }

    /// Place a bubble into an empty in-bounds cell, snapping its position to
    /// the cell centre. Ownership moves into the grid.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of bounds; check with [`Grid::in_bounds`]
    /// first. Inserting into an occupied cell is a logic error and trips a
    /// debug assertion.
    pub fn insert(&mut self, cell: Cell, mut bubble: Bubble) {
        bubble.pos = self.cell_to_pixel(cell);
        bubble.vel = Vec2::ZERO;
        bubble.state = BubbleState::Still;

        let slot = &mut self.rows[cell.row].cells[cell.col];
        debug_assert!(slot.is_none(), "insert into occupied cell {cell:?}");

        self.colours_in_play[bubble.colour.index()] += 1;
        self.total_bubbles += 1;
        *slot = Some(bubble);
    }

    /// Take the bubble out of a cell, if present. Ownership moves to the
    /// caller.
    pub fn remove(&mut self, cell: Cell) -> Option<Bubble> {
        let slot = self.rows.get_mut(cell.row)?.cells.get_mut(cell.col)?;
        let bubble = slot.take()?;
        self.colours_in_play[bubble.colour.index()] -= 1;
        self.total_bubbles -= 1;
        Some(bubble)
    }

    /// Drop fully-empty rows from the bottom of the grid. Interior empty
    /// rows stay. Returns the number of rows pruned.
    pub fn prune_trailing_empty_rows(&mut self) -> usize {
        let mut pruned = 0;
        while self.rows.last().is_some_and(Row::is_empty) {
            self.rows.pop();
            pruned += 1;
        }
        if pruned > 0 {
            log::debug!("pruned {pruned} empty trailing rows; rows={}", self.rows.len());
        }
        pruned
    }

    /// Occupied-cell count per palette colour
    #[inline]
    pub fn colour_counts(&self) -> [u32; Colour::PALETTE] {
        self.colours_in_play
    }

    /// Occupied-cell count across all colours
    #[inline]
    pub fn total_bubbles(&self) -> u32 {
        self.total_bubbles
    }

    /// All occupied cells with their bubbles, ceiling row first
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, &Bubble)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.cells
                .iter()
                .enumerate()
                .filter_map(move |(c, slot)| slot.as_ref().map(|b| (Cell::new(c, r), b)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_grid() -> Grid {
        // 160 px wide with 32 px bubbles: 5 Whole columns, 4 Half columns
        Grid::new(160.0, Vec2::new(32.0, 32.0), Vec2::ZERO)
    }

    fn red() -> Option<Bubble> {
        Some(Bubble::new(Colour::Red, Vec2::ZERO))
    }

    #[test]
    fn column_counts_per_kind() {
        let grid = test_grid();
        assert_eq!(grid.columns_for(RowKind::Whole), 5);
        assert_eq!(grid.columns_for(RowKind::Half), 4);
    }

    #[test]
    fn first_row_is_whole_and_kinds_alternate() {
        let mut grid = test_grid();
        for _ in 0..4 {
            grid.add_row_bottom(Vec::new());
        }
        assert_eq!(grid.row_kind(0), RowKind::Whole);
        for r in 0..3 {
            assert_ne!(grid.row_kind(r), grid.row_kind(r + 1));
        }
        // One past the last row continues the alternation
        assert_ne!(grid.row_kind(3), grid.row_kind(4));
    }

    #[test]
    fn row_kind_derivation_on_empty_grid() {
        let grid = test_grid();
        assert_eq!(grid.row_kind(0), RowKind::Whole);
        assert_eq!(grid.row_kind(1), RowKind::Half);
    }

    #[test]
    fn top_insert_flips_existing_kinds_consistently() {
        let mut grid = test_grid();
        grid.add_row_bottom(Vec::new()); // Whole
        grid.add_row_top(Vec::new()); // new Half ceiling row
        assert_eq!(grid.row_kind(0), RowKind::Half);
        assert_eq!(grid.row_kind(1), RowKind::Whole);
    }

    #[test]
    fn row_normalization_pads_and_truncates() {
        let mut grid = test_grid();

        // Too short: padded with empty cells to 5 (Whole)
        grid.add_row_bottom(vec![red()]);
        assert_eq!(grid.total_bubbles(), 1);
        assert!(grid.bubble(Cell::new(0, 0)).is_some());
        assert!(grid.in_bounds(Cell::new(4, 0)));
        assert!(grid.bubble(Cell::new(4, 0)).is_none());

        // Too long for a Half row (4): truncated, extras never counted
        grid.add_row_bottom(vec![red(), red(), red(), red(), red(), red()]);
        assert_eq!(grid.total_bubbles(), 5);
        assert!(!grid.in_bounds(Cell::new(4, 1)));
    }

    #[test]
    fn out_of_bounds_and_empty_are_distinct() {
        let mut grid = test_grid();
        grid.add_row_bottom(vec![red()]);

        let empty = Cell::new(1, 0);
        assert!(grid.in_bounds(empty));
        assert!(grid.bubble(empty).is_none());

        let oob = Cell::new(7, 0);
        assert!(!grid.in_bounds(oob));
        assert!(grid.bubble(oob).is_none());
        assert!(grid.neighbours(oob).is_empty());
    }

    #[test]
    fn neighbours_interior_cell_has_six() {
        let mut grid = test_grid();
        for _ in 0..3 {
            grid.add_row_bottom(Vec::new());
        }
        // Row 1 is Half (kind 1): deltas 0 and +1 into the Whole rows
        let n = grid.neighbours(Cell::new(1, 1));
        assert_eq!(n.len(), 6);
        for cell in [
            Cell::new(1, 0),
            Cell::new(2, 0),
            Cell::new(0, 1),
            Cell::new(2, 1),
            Cell::new(1, 2),
            Cell::new(2, 2),
        ] {
            assert!(n.contains(&cell), "missing neighbour {cell:?}");
        }
    }

    #[test]
    fn neighbours_whole_row_uses_minus_one_and_zero_deltas() {
        let mut grid = test_grid();
        for _ in 0..3 {
            grid.add_row_bottom(Vec::new());
        }
        // Row 2 is Whole (kind 0): deltas -1 and 0 into the Half row above
        let n = grid.neighbours(Cell::new(2, 2));
        assert!(n.contains(&Cell::new(1, 1)));
        assert!(n.contains(&Cell::new(2, 1)));
        assert!(!n.contains(&Cell::new(3, 1)));
    }

    #[test]
    fn neighbours_clip_at_edges() {
        let mut grid = test_grid();
        grid.add_row_bottom(Vec::new());
        grid.add_row_bottom(Vec::new());

        // Ceiling corner: no row above, no left, right + one diagonal below
        let n = grid.neighbours(Cell::new(0, 0));
        assert_eq!(n.len(), 2);
        assert!(n.contains(&Cell::new(1, 0)));
        assert!(n.contains(&Cell::new(0, 1)));

        // Rightmost Whole column (4): Half rows only reach column 3
        let n = grid.neighbours(Cell::new(4, 0));
        assert_eq!(n.len(), 2);
        assert!(n.contains(&Cell::new(3, 0)));
        assert!(n.contains(&Cell::new(3, 1)));
    }

    #[test]
    fn neighbour_relation_is_symmetric() {
        let mut grid = test_grid();
        for _ in 0..4 {
            grid.add_row_bottom(Vec::new());
        }
        for row in 0..4 {
            for col in 0..grid.columns_for(grid.row_kind(row)) {
                let cell = Cell::new(col, row);
                for n in grid.neighbours(cell) {
                    assert!(
                        grid.neighbours(n).contains(&cell),
                        "{n:?} does not see {cell:?} back"
                    );
                }
            }
        }
    }

    #[test]
    fn insert_and_remove_keep_counters() {
        let mut grid = test_grid();
        grid.add_row_bottom(Vec::new());

        grid.insert(Cell::new(2, 0), Bubble::new(Colour::Blue, Vec2::ZERO));
        assert_eq!(grid.colour_counts()[Colour::Blue.index()], 1);
        assert_eq!(grid.total_bubbles(), 1);

        let taken = grid.remove(Cell::new(2, 0)).unwrap();
        assert_eq!(taken.colour, Colour::Blue);
        assert_eq!(grid.colour_counts()[Colour::Blue.index()], 0);
        assert_eq!(grid.total_bubbles(), 0);

        // Removing an empty or out-of-bounds cell is a no-op
        assert!(grid.remove(Cell::new(2, 0)).is_none());
        assert!(grid.remove(Cell::new(9, 9)).is_none());
    }

    #[test]
    fn insert_snaps_position_to_cell_centre() {
        let mut grid = test_grid();
        grid.add_row_bottom(Vec::new());
        grid.insert(Cell::new(3, 0), Bubble::new(Colour::Red, Vec2::new(-5.0, 900.0)));
        let bubble = grid.bubble(Cell::new(3, 0)).unwrap();
        assert_eq!(bubble.pos, grid.cell_to_pixel(Cell::new(3, 0)));
        assert_eq!(bubble.state, BubbleState::Still);
    }

    #[test]
    fn prune_drops_only_trailing_empty_rows() {
        let mut grid = test_grid();
        grid.add_row_bottom(vec![red()]);
        grid.add_row_bottom(Vec::new()); // interior-to-be empty row
        grid.add_row_bottom(vec![None, red()]);
        grid.add_row_bottom(Vec::new());
        grid.add_row_bottom(Vec::new());

        assert_eq!(grid.prune_trailing_empty_rows(), 2);
        assert_eq!(grid.row_count(), 3);

        // The interior empty row survives
        assert!((0..grid.columns_for(grid.row_kind(1)))
            .all(|c| grid.bubble(Cell::new(c, 1)).is_none()));
    }

    #[test]
    fn top_insert_shifts_resting_positions_down() {
        let mut grid = test_grid();
        grid.add_row_bottom(vec![red()]);
        let before = grid.bubble(Cell::new(0, 0)).unwrap().pos;

        grid.add_row_top(Vec::new());
        let after = grid.bubble(Cell::new(0, 1)).unwrap().pos;
        assert!(after.y > before.y);
        assert_eq!(after, grid.cell_to_pixel(Cell::new(0, 1)));
    }

    proptest! {
        #[test]
        fn prop_row_kinds_alternate(adds in proptest::collection::vec(any::<bool>(), 1..24)) {
            let mut grid = test_grid();
            for at_top in adds {
                if at_top {
                    grid.add_row_top(Vec::new());
                } else {
                    grid.add_row_bottom(Vec::new());
                }
            }
            for r in 0..grid.row_count().saturating_sub(1) {
                prop_assert_ne!(grid.row_kind(r), grid.row_kind(r + 1));
            }
        }

        #[test]
        fn prop_cell_pixel_round_trip(rows in 1usize..12) {
            let mut grid = test_grid();
            for _ in 0..rows {
                grid.add_row_bottom(Vec::new());
            }
            // row_count itself is a valid candidate row ("new bottom row")
            for row in 0..=grid.row_count() {
                for col in 0..grid.columns_for(grid.row_kind(row)) {
                    let cell = Cell::new(col, row);
                    prop_assert_eq!(grid.pixel_to_cell(grid.cell_to_pixel(cell)), cell);
                }
            }
        }

        #[test]
        fn prop_counters_match_grid_contents(
            ops in proptest::collection::vec((0usize..5, 0usize..5, 0usize..9, any::<bool>()), 0..64)
        ) {
            let mut grid = test_grid();
            for _ in 0..5 {
                grid.add_row_bottom(Vec::new());
            }

            for (col, row, colour, insert) in ops {
                let cell = Cell::new(col, row);
                if !grid.in_bounds(cell) {
                    continue;
                }
                if insert && grid.bubble(cell).is_none() {
                    let colour = Colour::from_index(colour).unwrap();
                    grid.insert(cell, Bubble::new(colour, Vec2::ZERO));
                } else if !insert {
                    grid.remove(cell);
                }
            }

            let mut expected = [0u32; Colour::PALETTE];
            for (_, bubble) in grid.occupied() {
                expected[bubble.colour.index()] += 1;
            }
            prop_assert_eq!(grid.colour_counts(), expected);
            prop_assert_eq!(grid.total_bubbles(), expected.iter().sum::<u32>());
        }
    }
}
