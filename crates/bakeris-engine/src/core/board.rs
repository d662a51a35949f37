use serde::{Deserialize, Serialize};

use super::block::BlockId;

/// Cell coordinate (or offset) on the board.
///
/// `x` grows to the right and `y` grows upward; `(0, 0)` is the bottom-left
/// cell. Coordinates are signed so that shape offsets and out-of-bounds
/// candidates can be represented directly.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
)]
#[display("({x}, {y})")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Fixed-size grid of cells referencing placed blocks.
///
/// The board knows nothing about legality: it only checks bounds. Whether a
/// block may be written to a cell is decided by the placement engine.
///
/// # Example
///
/// ```
/// use bakeris_engine::{Board, Position};
///
/// let board = Board::new(10, 24);
/// assert!(board.is_in_bounds(Position::new(9, 23)));
/// assert!(!board.is_in_bounds(Position::new(10, 0)));
/// assert_eq!(board.cell_at(Position::new(0, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells, row 0 first (`y * width + x`).
    cells: Vec<Option<BlockId>>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width * height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    #[must_use]
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Returns the block occupying `pos`, or `None` if the cell is empty or out of bounds.
    #[must_use]
    pub fn cell_at(&self, pos: Position) -> Option<BlockId> {
        self.index(pos).and_then(|idx| self.cells[idx])
    }

    /// Writes `block` into the cell at `pos`, overwriting whatever was there.
    ///
    /// Returns `false` (and changes nothing) if `pos` is out of bounds.
    pub fn place(&mut self, pos: Position, block: BlockId) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = Some(block);
                true
            }
            None => false,
        }
    }

    /// Empties the cell at `pos` and returns the block that was there.
    pub fn clear(&mut self, pos: Position) -> Option<BlockId> {
        self.index(pos).and_then(|idx| self.cells[idx].take())
    }

    /// Returns the cells of row `y`, left to right.
    ///
    /// # Panics
    ///
    /// Panics if `y` is out of bounds.
    #[must_use]
    pub fn row(&self, y: usize) -> &[Option<BlockId>] {
        &self.cells[y * self.width..][..self.width]
    }

    /// Returns an iterator over rows from bottom (`y = 0`) to top.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Option<BlockId>]> + '_ {
        self.cells.chunks_exact(self.width)
    }

    /// Returns an iterator over all occupied cells.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Position, BlockId)> + '_ {
        self.rows().enumerate().flat_map(|(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                let block = (*cell)?;
                let pos = Position::new(i32::try_from(x).ok()?, i32::try_from(y).ok()?);
                Some((pos, block))
            })
        })
    }

    /// Removes the given rows and shifts every row above them down.
    ///
    /// Rows not listed keep their relative order; the freed rows at the top are
    /// emptied. Returns the number of rows removed.
    pub fn remove_rows(&mut self, rows: &[usize]) -> usize {
        let width = self.width;
        let mut write = 0;
        for read in 0..self.height {
            if rows.contains(&read) {
                continue;
            }
            if write != read {
                self.cells
                    .copy_within(read * width..(read + 1) * width, write * width);
            }
            write += 1;
        }
        self.cells[write * width..].fill(None);
        self.height - write
    }

    /// Empties every cell.
    pub fn reset(&mut self) {
        self.cells.fill(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockColor, BlockStore, PieceKind};

    fn ids(n: usize) -> Vec<BlockId> {
        let mut store = BlockStore::new();
        let piece = store.create_piece(PieceKind::I, BlockColor::Plain, Position::ORIGIN);
        (0..n)
            .map(|_| store.allocate_block(piece.id(), BlockColor::Plain))
            .collect()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 24);
        assert_eq!(board.width(), 10);
        assert_eq!(board.height(), 24);
        assert_eq!(board.occupied_cells().count(), 0);
        for y in 0..24 {
            assert!(board.row(y).iter().all(Option::is_none));
        }
    }

    #[test]
    fn test_bounds() {
        let board = Board::new(10, 24);
        assert!(board.is_in_bounds(Position::new(0, 0)));
        assert!(board.is_in_bounds(Position::new(9, 23)));
        assert!(!board.is_in_bounds(Position::new(-1, 0)));
        assert!(!board.is_in_bounds(Position::new(0, -1)));
        assert!(!board.is_in_bounds(Position::new(10, 0)));
        assert!(!board.is_in_bounds(Position::new(0, 24)));
    }

    #[test]
    fn test_place_and_clear() {
        let mut board = Board::new(10, 24);
        let block = ids(1)[0];
        let pos = Position::new(3, 5);

        assert!(board.place(pos, block));
        assert_eq!(board.cell_at(pos), Some(block));
        assert_eq!(board.row(5)[3], Some(block));

        assert_eq!(board.clear(pos), Some(block));
        assert_eq!(board.cell_at(pos), None);
        assert_eq!(board.clear(pos), None);
    }

    #[test]
    fn test_place_out_of_bounds_is_noop() {
        let mut board = Board::new(10, 24);
        assert!(!board.place(Position::new(10, 0), ids(1)[0]));
        assert!(!board.place(Position::new(0, -1), ids(1)[0]));
        assert_eq!(board.occupied_cells().count(), 0);
        assert_eq!(board.clear(Position::new(-3, 2)), None);
    }

    #[test]
    fn test_place_overwrites_without_validation() {
        let mut board = Board::new(4, 4);
        let [a, b] = ids(2)[..] else { unreachable!() };
        board.place(Position::new(1, 1), a);
        board.place(Position::new(1, 1), b);
        assert_eq!(board.cell_at(Position::new(1, 1)), Some(b));
    }

    #[test]
    fn test_remove_rows_shifts_down() {
        let mut board = Board::new(2, 4);
        let [a, b, c] = ids(3)[..] else { unreachable!() };
        board.place(Position::new(0, 0), a);
        board.place(Position::new(1, 1), b);
        board.place(Position::new(0, 3), c);

        let removed = board.remove_rows(&[1]);
        assert_eq!(removed, 1);
        assert_eq!(board.cell_at(Position::new(0, 0)), Some(a));
        assert_eq!(board.cell_at(Position::new(1, 1)), None);
        assert_eq!(board.cell_at(Position::new(0, 2)), Some(c));
        assert!(board.row(3).iter().all(Option::is_none));
    }

    #[test]
    fn test_remove_multiple_rows() {
        let mut board = Board::new(1, 5);
        let blocks = ids(5);
        for (y, &block) in blocks.iter().enumerate() {
            board.place(Position::new(0, i32::try_from(y).unwrap()), block);
        }

        assert_eq!(board.remove_rows(&[0, 2, 3]), 3);
        assert_eq!(board.cell_at(Position::new(0, 0)), Some(blocks[1]));
        assert_eq!(board.cell_at(Position::new(0, 1)), Some(blocks[4]));
        assert_eq!(board.cell_at(Position::new(0, 2)), None);
        assert_eq!(board.occupied_cells().count(), 2);
    }

    #[test]
    fn test_position_arithmetic() {
        let a = Position::new(3, -1);
        let b = Position::new(-1, 2);
        assert_eq!(a + b, Position::new(2, 1));
        assert_eq!(a - b, Position::new(4, -3));
        assert_eq!(a.to_string(), "(3, -1)");
    }
}
