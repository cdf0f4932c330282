//! Game board: grid storage, collision detection, row clearing and garbage
//!
//! Row 0 is the top of the grid and row indices grow downward. Columns grow
//! rightward. Full rows are not removed at once: they are queued at lock time
//! and dismantled one cell per tick by [`Board::advance_clear_animation`].

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::event::GameEvent;
use crate::piece::Tetromino;
use crate::tetromino::{MAX_SHAPE_TAG, Shape};

/// Default grid dimensions
pub const DEFAULT_ROWS: usize = 25;
pub const DEFAULT_COLUMNS: usize = 10;
/// Ticks between two garbage injection opportunities
pub const DEFAULT_GARBAGE_PERIOD: u32 = 11;

/// Tag of a garbage block
pub const GARBAGE_TAG: u8 = 8;
/// Tag of a cell that is mid-explosion during a row clear
pub const EXPLODING_TAG: u8 = 9;

/// A single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    /// Locked piece cell carrying its shape tag (1..=7)
    Block(u8),
    Garbage,
    /// Transient marker used by the clear animation
    Exploding,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        !self.is_empty()
    }

    /// Numeric tag as seen by the presentation layer
    pub fn tag(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Block(tag) => *tag,
            Cell::Garbage => GARBAGE_TAG,
            Cell::Exploding => EXPLODING_TAG,
        }
    }

    /// Inverse of [`Cell::tag`]. Panics on tags above 9.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => Cell::Empty,
            1..=MAX_SHAPE_TAG => Cell::Block(tag),
            GARBAGE_TAG => Cell::Garbage,
            EXPLODING_TAG => Cell::Exploding,
            other => panic!("invalid cell tag {other}"),
        }
    }
}

/// The game board
#[derive(Debug, Clone)]
pub struct Board {
    /// Grid stored as [row][col], row 0 at the top
    cells: Vec<Vec<Cell>>,
    columns: usize,
    /// Rows queued for the clear animation, top to bottom
    pending_clear: VecDeque<usize>,
    pending_garbage: u32,
    garbage_tick: u32,
    garbage_period: u32,
    rng: ChaCha8Rng,
    events: Vec<GameEvent>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLUMNS, 0)
    }
}

impl Board {
    /// Create an empty board. `seed` drives the garbage hole placement.
    pub fn new(rows: usize, columns: usize, seed: u64) -> Self {
        assert!(rows > 0 && columns > 0, "board must have at least one cell");
        Self {
            cells: vec![vec![Cell::Empty; columns]; rows],
            columns,
            pending_clear: VecDeque::new(),
            pending_garbage: 0,
            garbage_tick: 0,
            garbage_period: DEFAULT_GARBAGE_PERIOD,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Create a board from a matrix of cell tags (0..=9)
    pub fn from_tags(rows: Vec<Vec<u8>>, seed: u64) -> Self {
        assert!(!rows.is_empty(), "board must have at least one row");
        let columns = rows[0].len();
        let mut board = Self::new(rows.len(), columns, seed);
        for (row, tags) in rows.into_iter().enumerate() {
            assert_eq!(tags.len(), columns, "board rows must all have the same length");
            board.cells[row] = tags.into_iter().map(Cell::from_tag).collect();
        }
        board
    }

    /// Override the garbage injection period (in ticks)
    pub fn with_garbage_period(mut self, period: u32) -> Self {
        assert!(period > 0, "garbage period must be at least one tick");
        self.garbage_period = period;
        self
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Get the cell at (row, col). Panics when out of range.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        assert!(
            row < self.rows() && col < self.columns,
            "cell ({row}, {col}) outside {}x{} board",
            self.rows(),
            self.columns
        );
        self.cells[row][col]
    }

    /// Grid contents as numeric tags, top row first
    pub fn tags(&self) -> Vec<Vec<u8>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(Cell::tag).collect())
            .collect()
    }

    /// Pure collision query, see [`Board::check_collision`]
    pub fn collides(&self, shape: &Shape, x: usize, y: usize) -> bool {
        if y + shape.height() > self.rows() || x + shape.width() > self.columns {
            return true;
        }
        shape
            .filled_cells()
            .any(|(row, col, _)| self.cells[y + row][x + col].is_filled())
    }

    /// Check whether `shape` placed with its top-left corner at (x, y) overlaps
    /// a filled cell or reaches past the grid. Blocked checks emit
    /// [`GameEvent::CollisionBlocked`].
    pub fn check_collision(&mut self, shape: &Shape, x: usize, y: usize) -> bool {
        let blocked = self.collides(shape, x, y);
        if blocked {
            self.events.push(GameEvent::CollisionBlocked);
        }
        blocked
    }

    /// Merge a piece into the grid at its current position.
    ///
    /// The caller must have verified the position is free; overlapping a
    /// filled cell panics.
    pub fn lock(&mut self, piece: Tetromino) {
        let (x, y) = (piece.x(), piece.y());
        for (row, col, tag) in piece.shape().filled_cells() {
            let target = &mut self.cells[y + row][x + col];
            assert!(
                target.is_empty(),
                "locking onto filled cell ({}, {})",
                y + row,
                x + col
            );
            *target = Cell::Block(tag);
        }
        self.events.push(GameEvent::PieceLocked);
        debug!(x, y, "piece locked");
    }

    /// Queue every full row for the clear animation and return how many were found.
    ///
    /// Panics if a previous clear is still pending.
    pub fn scan_for_full_rows(&mut self) -> u32 {
        assert!(
            self.pending_clear.is_empty(),
            "row scan started while a clear is still pending"
        );
        for (index, row) in self.cells.iter().enumerate() {
            if row.iter().all(Cell::is_filled) {
                self.pending_clear.push_back(index);
            }
        }
        self.pending_clear.len() as u32
    }

    pub fn has_pending_clear(&self) -> bool {
        !self.pending_clear.is_empty()
    }

    /// Row indices still waiting to be cleared, top to bottom
    pub fn pending_clear(&self) -> impl Iterator<Item = usize> + '_ {
        self.pending_clear.iter().copied()
    }

    /// Advance the clear animation by one step.
    ///
    /// Only the first pending row is touched, and only one of its cells:
    /// an exploding cell is emptied, otherwise the leftmost filled cell starts
    /// exploding. Once the row is all empty it is removed and an empty row is
    /// inserted at the top.
    pub fn advance_clear_animation(&mut self) {
        let Some(&row) = self.pending_clear.front() else {
            return;
        };

        if self.cells[row].iter().all(Cell::is_empty) {
            self.cells.remove(row);
            self.cells.insert(0, vec![Cell::Empty; self.columns]);
            self.pending_clear.pop_front();
            self.events.push(GameEvent::RowCleared { row });
            trace!(row, "row removed");
            return;
        }

        let cells = &mut self.cells[row];
        if let Some(col) = cells.iter().position(|c| matches!(c, Cell::Exploding)) {
            cells[col] = Cell::Empty;
            trace!(row, col, "exploded cell emptied");
        } else if let Some(col) = cells.iter().position(Cell::is_filled) {
            cells[col] = Cell::Exploding;
            self.events.push(GameEvent::CellExploded { row, col });
            trace!(row, col, "cell exploding");
        }
    }

    /// Queue incoming garbage rows. Injection happens in [`Board::apply_garbage_step`].
    pub fn enqueue_garbage(&mut self, count: u32) {
        if count == 0 {
            return;
        }
        self.pending_garbage += count;
        self.events.push(GameEvent::GarbageReceived { count });
        debug!(count, pending = self.pending_garbage, "garbage queued");
    }

    pub fn pending_garbage(&self) -> u32 {
        self.pending_garbage
    }

    /// Advance the garbage cycle by one tick.
    ///
    /// When the cycle wraps, garbage is pending and no clear animation is
    /// running, the top row is dropped and a garbage row with one random hole
    /// is pushed in at the bottom. Returns whether a row was injected.
    pub fn apply_garbage_step(&mut self) -> bool {
        self.garbage_tick = (self.garbage_tick + 1) % self.garbage_period;
        if self.garbage_tick != 0 || self.pending_garbage == 0 || self.has_pending_clear() {
            return false;
        }

        let hole = self.rng.gen_range(0..self.columns);
        let mut row = vec![Cell::Garbage; self.columns];
        row[hole] = Cell::Empty;
        self.cells.remove(0);
        self.cells.push(row);
        self.pending_garbage -= 1;
        self.events.push(GameEvent::GarbageRaised { hole });
        debug!(hole, pending = self.pending_garbage, "garbage row raised");
        true
    }

    /// Take all buffered events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(Cell::is_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::ShapeCatalog;
    use proptest::prelude::*;

    fn i_piece() -> Shape {
        Shape::new(vec![vec![6, 6, 6, 6]])
    }

    fn o_piece() -> Shape {
        Shape::new(vec![vec![7, 7], vec![7, 7]])
    }

    /// Board whose bottom row is full except for the last `gap` columns
    fn board_with_bottom_gap(gap: usize) -> Board {
        let mut board = Board::new(DEFAULT_ROWS, DEFAULT_COLUMNS, 1);
        let bottom = board.rows() - 1;
        for col in 0..DEFAULT_COLUMNS - gap {
            board.cells[bottom][col] = Cell::Garbage;
        }
        board
    }

    fn run_clear(board: &mut Board) -> usize {
        let mut calls = 0;
        while board.has_pending_clear() {
            board.advance_clear_animation();
            calls += 1;
            assert!(calls < 10_000, "clear animation did not terminate");
        }
        calls
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::default();
        assert!(board.is_empty());
        assert_eq!(board.rows(), 25);
        assert_eq!(board.columns(), 10);
    }

    #[test]
    fn test_cell_tags_round_trip() {
        for tag in 0..=9 {
            assert_eq!(Cell::from_tag(tag).tag(), tag);
        }
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_cell_panics() {
        let board = Board::default();
        let _ = board.cell(25, 0);
    }

    #[test]
    fn test_vertical_overflow_collides() {
        let mut board = Board::default();
        assert!(!board.check_collision(&o_piece(), 0, 23));
        assert!(board.check_collision(&o_piece(), 0, 24));
        assert_eq!(board.drain_events(), vec![GameEvent::CollisionBlocked]);
    }

    #[test]
    fn test_horizontal_overflow_collides() {
        let board = Board::default();
        assert!(!board.collides(&i_piece(), 6, 0));
        assert!(board.collides(&i_piece(), 7, 0));
    }

    #[test]
    fn test_empty_shape_cells_do_not_collide() {
        let mut board = Board::default();
        board.cells[1][0] = Cell::Garbage;
        let t = Shape::new(vec![vec![1, 1, 1], vec![0, 1, 0]]);
        // The hole under the T's left arm sits on the garbage cell
        assert!(!board.collides(&t, 0, 0));
        assert!(board.collides(&t, 0, 1));
    }

    #[test]
    fn test_lock_and_scan_single_row() {
        let mut board = board_with_bottom_gap(4);
        board.lock(Tetromino::at(i_piece(), 6, 24));
        assert_eq!(board.scan_for_full_rows(), 1);
        assert!(board.has_pending_clear());
        assert_eq!(board.pending_clear().collect::<Vec<_>>(), vec![24]);
    }

    #[test]
    fn test_scan_orders_rows_top_to_bottom() {
        let mut tags = vec![vec![0; 4]; 6];
        tags[2] = vec![8; 4];
        tags[5] = vec![1; 4];
        tags[4] = vec![1, 0, 1, 1];
        let mut board = Board::from_tags(tags, 0);
        assert_eq!(board.scan_for_full_rows(), 2);
        assert_eq!(board.pending_clear().collect::<Vec<_>>(), vec![2, 5]);
    }

    #[test]
    fn test_clear_animation_touches_one_cell_per_call() {
        let mut board = Board::from_tags(vec![vec![0, 0, 0], vec![0, 2, 0], vec![1, 1, 1]], 0);
        board.scan_for_full_rows();

        board.advance_clear_animation();
        assert_eq!(board.tags()[2], vec![9, 1, 1]);
        board.advance_clear_animation();
        assert_eq!(board.tags()[2], vec![0, 1, 1]);
        board.advance_clear_animation();
        assert_eq!(board.tags()[2], vec![0, 9, 1]);
        board.advance_clear_animation();
        board.advance_clear_animation();
        board.advance_clear_animation();
        assert_eq!(board.tags()[2], vec![0, 0, 0]);
        assert!(board.has_pending_clear());

        board.advance_clear_animation();
        assert!(!board.has_pending_clear());
        // Stack settles: the lone block drops one row
        assert_eq!(board.tags(), vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 2, 0]]);

        let events = board.drain_events();
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::CellExploded { .. }))
                .count(),
            3
        );
        assert_eq!(events.last(), Some(&GameEvent::RowCleared { row: 2 }));
    }

    #[test]
    fn test_second_row_waits_for_first() {
        let mut board = Board::from_tags(vec![vec![3, 3], vec![4, 4]], 0);
        assert_eq!(board.scan_for_full_rows(), 2);
        for _ in 0..5 {
            board.advance_clear_animation();
        }
        // First row is gone, second untouched
        assert_eq!(board.tags(), vec![vec![0, 0], vec![4, 4]]);
        assert_eq!(board.pending_clear().collect::<Vec<_>>(), vec![1]);
        run_clear(&mut board);
        assert!(board.is_empty());
    }

    #[test]
    #[should_panic(expected = "still pending")]
    fn test_second_scan_while_pending_panics() {
        let mut board = Board::from_tags(vec![vec![1, 1]], 0);
        board.scan_for_full_rows();
        board.scan_for_full_rows();
    }

    #[test]
    fn test_garbage_arrives_on_period() {
        let mut board = Board::new(5, 4, 3);
        board.enqueue_garbage(2);
        for _ in 0..DEFAULT_GARBAGE_PERIOD - 1 {
            assert!(!board.apply_garbage_step());
        }
        assert!(board.apply_garbage_step());
        assert_eq!(board.pending_garbage(), 1);

        let bottom = board.tags()[4].clone();
        assert_eq!(bottom.iter().filter(|&&t| t == 0).count(), 1);
        assert_eq!(bottom.iter().filter(|&&t| t == GARBAGE_TAG).count(), 3);
        assert_eq!(board.rows(), 5);
    }

    #[test]
    fn test_garbage_deferred_during_clear() {
        let mut board = Board::from_tags(vec![vec![0; 3], vec![0; 3], vec![1, 1, 1]], 9)
            .with_garbage_period(1);
        board.enqueue_garbage(1);
        board.scan_for_full_rows();
        let before = board.tags();
        assert!(!board.apply_garbage_step());
        assert_eq!(board.tags(), before);
        assert_eq!(board.pending_garbage(), 1);

        run_clear(&mut board);
        assert!(board.apply_garbage_step());
        assert_eq!(board.pending_garbage(), 0);
    }

    #[test]
    fn test_garbage_does_not_join_computed_clear_list() {
        let mut board = Board::from_tags(vec![vec![0; 2], vec![5, 0], vec![1, 1]], 2)
            .with_garbage_period(1);
        board.scan_for_full_rows();
        board.enqueue_garbage(3);
        assert_eq!(board.pending_clear().collect::<Vec<_>>(), vec![2]);
        run_clear(&mut board);
        while board.pending_garbage() > 0 {
            board.apply_garbage_step();
        }
        assert!(!board.has_pending_clear());
    }

    #[test]
    fn test_enqueue_emits_received_event() {
        let mut board = Board::default();
        board.enqueue_garbage(0);
        board.enqueue_garbage(3);
        assert_eq!(board.drain_events(), vec![GameEvent::GarbageReceived { count: 3 }]);
    }

    fn arb_grid() -> impl Strategy<Value = Vec<Vec<u8>>> {
        prop::collection::vec(prop::collection::vec(prop_oneof![3 => Just(0u8), 1 => 1u8..=8], 6), 8)
    }

    proptest! {
        #[test]
        fn collision_matches_cell_occupancy(
            grid in arb_grid(),
            shape_index in 0usize..7,
            x in 0usize..8,
            y in 0usize..10,
        ) {
            let board = Board::from_tags(grid.clone(), 0);
            let shape = ShapeCatalog::standard().shapes()[shape_index].clone();
            let out_of_range = x + shape.width() > 6 || y + shape.height() > 8;
            let overlaps = !out_of_range
                && shape.filled_cells().any(|(r, c, _)| grid[y + r][x + c] != 0);
            prop_assert_eq!(board.collides(&shape, x, y), out_of_range || overlaps);
        }

        #[test]
        fn lock_writes_piece_cells_and_keeps_others(
            grid in arb_grid(),
            shape_index in 0usize..7,
            x in 0usize..=2,
            y in 0usize..=4,
        ) {
            let shape = ShapeCatalog::standard().shapes()[shape_index].clone();
            let mut grid = grid;
            for (r, c, _) in shape.filled_cells() {
                grid[y + r][x + c] = 0;
            }
            let mut board = Board::from_tags(grid.clone(), 0);
            prop_assert!(!board.collides(&shape, x, y));
            board.lock(Tetromino::at(shape.clone(), x, y));
            let after = board.tags();
            for (r, row) in grid.iter().enumerate() {
                for (c, &before) in row.iter().enumerate() {
                    let piece_tag = if r >= y && c >= x && r - y < shape.height() && c - x < shape.width() {
                        shape.get(r - y, c - x)
                    } else {
                        0
                    };
                    prop_assert_eq!(after[r][c], before + piece_tag);
                }
            }
        }

        #[test]
        fn clear_animation_terminates(full_rows in prop::collection::vec(any::<bool>(), 8)) {
            let grid: Vec<Vec<u8>> = full_rows
                .iter()
                .map(|&full| if full { vec![4; 6] } else { vec![0, 2, 0, 0, 3, 0] })
                .collect();
            let k = full_rows.iter().filter(|&&f| f).count();
            let mut board = Board::from_tags(grid, 0);
            prop_assert_eq!(board.scan_for_full_rows() as usize, k);
            let calls = run_clear(&mut board);
            prop_assert!(calls <= k * (6 * 2 + 1));
            prop_assert!(board.tags().iter().all(|row| row.iter().any(|&t| t == 0)));
        }

        #[test]
        fn garbage_never_mutates_while_clearing(period in 1u32..15, ticks in 1usize..60) {
            let mut board = Board::from_tags(vec![vec![0; 4], vec![0; 4], vec![2; 4]], 5)
                .with_garbage_period(period);
            board.enqueue_garbage(5);
            board.scan_for_full_rows();
            for _ in 0..ticks {
                let before = board.tags();
                let clearing = board.has_pending_clear();
                let injected = board.apply_garbage_step();
                if clearing {
                    prop_assert!(!injected);
                    prop_assert_eq!(board.tags(), before);
                }
                board.advance_clear_animation();
            }
        }
    }
}
