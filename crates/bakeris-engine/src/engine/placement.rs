//! Collision checks, movement and rotation of the active piece.
//!
//! The active piece is stamped on the board while it falls. Every operation
//! here follows the same pattern: erase the piece, test the candidate
//! position, then stamp the piece either at the candidate or back where it was.
//! A rejected move or rotation leaves the board and the piece unchanged.

use tracing::trace;

use crate::core::{
    board::{Board, Position},
    piece::{Piece, PieceRotation},
};

use super::wall_kick::{BoundingBox, RotationDirection, ShapeClass, kick_offsets};

const LEFT: Position = Position::new(-1, 0);
const RIGHT: Position = Position::new(1, 0);
const DOWN: Position = Position::new(0, -1);

/// Returns `true` if `piece` fits at `anchor` with its current rotation.
///
/// A cell fits if it is inside the board and either empty or holding one of
/// the piece's own blocks.
#[must_use]
pub fn can_place(board: &Board, piece: &Piece, anchor: Position) -> bool {
    can_place_with(board, piece, piece.rotation(), anchor)
}

/// Like [`can_place`], but with an explicit rotation.
#[must_use]
pub fn can_place_with(
    board: &Board,
    piece: &Piece,
    rotation: PieceRotation,
    anchor: Position,
) -> bool {
    piece
        .world_positions_with(rotation, anchor)
        .iter()
        .all(|&pos| {
            board.is_in_bounds(pos) && board.cell_at(pos).is_none_or(|block| piece.owns(block))
        })
}

/// Writes the piece's blocks to the board at its current anchor and rotation.
pub fn stamp(board: &mut Board, piece: &Piece) {
    for (pos, block) in piece.occupied_cells() {
        board.place(pos, block);
    }
}

/// Removes the piece's blocks from the board.
///
/// Only cells still holding the piece's own blocks are cleared.
pub fn erase(board: &mut Board, piece: &Piece) {
    for (pos, block) in piece.occupied_cells() {
        if board.cell_at(pos) == Some(block) {
            board.clear(pos);
        }
    }
}

/// Shifts the piece by `delta` if the destination is free.
///
/// Returns `true` if the piece moved.
pub fn try_shift(board: &mut Board, piece: &mut Piece, delta: Position) -> bool {
    erase(board, piece);
    let candidate = piece.anchor() + delta;
    let moved = can_place(board, piece, candidate);
    if moved {
        piece.set_anchor(candidate);
    }
    stamp(board, piece);
    moved
}

pub fn move_left(board: &mut Board, piece: &mut Piece) -> bool {
    try_shift(board, piece, LEFT)
}

pub fn move_right(board: &mut Board, piece: &mut Piece) -> bool {
    try_shift(board, piece, RIGHT)
}

/// Moves the piece one row down. A `false` result means the piece has landed.
pub fn move_down(board: &mut Board, piece: &mut Piece) -> bool {
    try_shift(board, piece, DOWN)
}

/// Rotates the piece a quarter turn, trying wall kicks in order.
///
/// Returns `true` if a legal orientation was found. Otherwise the piece keeps
/// its previous rotation and anchor.
pub fn rotate(board: &mut Board, piece: &mut Piece, direction: RotationDirection) -> bool {
    erase(board, piece);

    let old_rotation = piece.rotation();
    let new_rotation = match direction {
        RotationDirection::Clockwise => old_rotation.rotated_cw(),
        RotationDirection::CounterClockwise => old_rotation.rotated_ccw(),
    };
    let before = piece.cell_offsets(old_rotation);
    let after = piece.cell_offsets(new_rotation);
    let class = ShapeClass::classify(&after);
    let kicks = kick_offsets(
        class,
        BoundingBox::of(&before),
        BoundingBox::of(&after),
        direction,
    );

    let anchor = piece.anchor();
    let accepted = kicks
        .iter()
        .map(|&kick| anchor + kick)
        .find(|&candidate| can_place_with(board, piece, new_rotation, candidate));
    if let Some(candidate) = accepted {
        trace!(%piece, ?class, kick = %(candidate - anchor), "rotation accepted");
        piece.set_rotation(new_rotation);
        piece.set_anchor(candidate);
    }
    stamp(board, piece);
    accepted.is_some()
}

pub fn rotate_cw(board: &mut Board, piece: &mut Piece) -> bool {
    rotate(board, piece, RotationDirection::Clockwise)
}

pub fn rotate_ccw(board: &mut Board, piece: &mut Piece) -> bool {
    rotate(board, piece, RotationDirection::CounterClockwise)
}

/// Returns the lowest anchor the piece can reach by dropping straight down.
///
/// Used for hard drops and for the ghost piece preview.
#[must_use]
pub fn drop_position(board: &Board, piece: &Piece) -> Position {
    let mut anchor = piece.anchor();
    while can_place(board, piece, anchor + DOWN) {
        anchor = anchor + DOWN;
    }
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlockColor, BlockStore, PieceKind};

    struct Fixture {
        board: Board,
        store: BlockStore,
    }

    impl Fixture {
        fn new(width: usize, height: usize) -> Self {
            Self {
                board: Board::new(width, height),
                store: BlockStore::new(),
            }
        }

        fn spawn(&mut self, kind: PieceKind, anchor: Position) -> Piece {
            let piece = self.store.create_piece(kind, BlockColor::Dough, anchor);
            stamp(&mut self.board, &piece);
            piece
        }

        /// Fills a cell with a foreign block.
        fn wall(&mut self, x: i32, y: i32) {
            let piece = self
                .store
                .create_piece(PieceKind::O, BlockColor::Plain, Position::ORIGIN);
            self.board.place(Position::new(x, y), piece.blocks()[0]);
        }

        fn occupied(&self) -> Vec<Position> {
            self.board.occupied_cells().map(|(pos, _)| pos).collect()
        }
    }

    #[test]
    fn test_can_place_allows_own_blocks() {
        let mut f = Fixture::new(10, 20);
        let piece = f.spawn(PieceKind::T, Position::new(4, 10));
        // Overlapping its own stamped cells is fine
        assert!(can_place(&f.board, &piece, Position::new(5, 10)));

        let other = f.store.create_piece(PieceKind::T, BlockColor::Yeast, Position::new(5, 10));
        assert!(!can_place(&f.board, &other, Position::new(5, 10)));
    }

    #[test]
    fn test_can_place_rejects_out_of_bounds() {
        let mut f = Fixture::new(10, 20);
        let piece = f.store.create_piece(PieceKind::I, BlockColor::Dough, Position::ORIGIN);
        assert!(!can_place(&f.board, &piece, Position::new(0, 0)));
        assert!(can_place(&f.board, &piece, Position::new(1, 0)));
        assert!(!can_place(&f.board, &piece, Position::new(8, 0)));
        assert!(!can_place(&f.board, &piece, Position::new(4, -1)));
        assert!(!can_place(&f.board, &piece, Position::new(4, 20)));
    }

    #[test]
    fn test_move_left_and_right() {
        let mut f = Fixture::new(10, 20);
        let mut piece = f.spawn(PieceKind::O, Position::new(4, 10));

        assert!(move_left(&mut f.board, &mut piece));
        assert_eq!(piece.anchor(), Position::new(3, 10));
        assert!(move_right(&mut f.board, &mut piece));
        assert!(move_right(&mut f.board, &mut piece));
        assert_eq!(piece.anchor(), Position::new(5, 10));
        // Board reflects the piece exactly
        let mut cells = f.occupied();
        cells.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            cells,
            vec![
                Position::new(5, 10),
                Position::new(6, 10),
                Position::new(5, 11),
                Position::new(6, 11),
            ]
        );
    }

    #[test]
    fn test_blocked_move_is_noop() {
        let mut f = Fixture::new(10, 20);
        let mut piece = f.spawn(PieceKind::O, Position::new(0, 10));
        let before = f.board.clone();

        assert!(!move_left(&mut f.board, &mut piece));
        assert_eq!(piece.anchor(), Position::new(0, 10));
        assert_eq!(f.board, before);

        f.wall(2, 11);
        let before = f.board.clone();
        assert!(!move_right(&mut f.board, &mut piece));
        assert_eq!(f.board, before);
    }

    #[test]
    fn test_move_down_lands_on_floor() {
        let mut f = Fixture::new(10, 20);
        let mut piece = f.spawn(PieceKind::T, Position::new(4, 2));
        assert!(move_down(&mut f.board, &mut piece));
        assert!(move_down(&mut f.board, &mut piece));
        assert!(!move_down(&mut f.board, &mut piece));
        assert_eq!(piece.anchor(), Position::new(4, 0));
    }

    #[test]
    fn test_drop_position_stops_on_stack() {
        let mut f = Fixture::new(10, 20);
        f.wall(4, 5);
        let piece = f.spawn(PieceKind::T, Position::new(4, 15));
        assert_eq!(drop_position(&f.board, &piece), Position::new(4, 6));

        let piece = f.spawn(PieceKind::I, Position::new(7, 15));
        assert_eq!(drop_position(&f.board, &piece), Position::new(7, 0));
    }

    #[test]
    fn test_rotation_in_open_space() {
        let mut f = Fixture::new(10, 20);
        let mut piece = f.spawn(PieceKind::T, Position::new(4, 10));

        assert!(rotate_cw(&mut f.board, &mut piece));
        assert_eq!(piece.rotation(), PieceRotation::new(1));
        assert_eq!(piece.anchor(), Position::new(4, 10));
        assert_eq!(f.occupied().len(), 4);

        assert!(rotate_ccw(&mut f.board, &mut piece));
        assert!(rotate_ccw(&mut f.board, &mut piece));
        assert_eq!(piece.rotation(), PieceRotation::new(3));
    }

    #[test]
    fn test_o_piece_rotation_cycles_without_moving() {
        let mut f = Fixture::new(10, 20);
        let mut piece = f.spawn(PieceKind::O, Position::new(4, 10));
        let before = f.board.clone();
        for turns in 1..=4 {
            assert!(rotate_cw(&mut f.board, &mut piece));
            assert_eq!(piece.rotation(), PieceRotation::new(turns));
            assert_eq!(f.board, before);
        }
    }

    #[test]
    fn test_rotation_kicks_off_the_wall() {
        let mut f = Fixture::new(10, 20);
        // Vertical I hugging the right wall
        let mut piece = f.spawn(PieceKind::I, Position::new(4, 10));
        assert!(rotate_cw(&mut f.board, &mut piece));
        while move_right(&mut f.board, &mut piece) {}
        assert_eq!(piece.anchor().x, 9);

        // Turning back to horizontal needs a kick to the left
        assert!(rotate_ccw(&mut f.board, &mut piece));
        assert_eq!(piece.rotation(), PieceRotation::new(0));
        assert!(
            piece
                .world_positions(piece.anchor())
                .iter()
                .all(|&p| f.board.is_in_bounds(p))
        );
        assert_eq!(f.occupied().len(), 4);
    }

    #[test]
    fn test_impossible_rotation_reverts_exactly() {
        let mut f = Fixture::new(10, 20);
        let mut piece = f.spawn(PieceKind::I, Position::new(4, 0));
        // Box the horizontal I in so that no kick can make it vertical
        for x in 2..=7 {
            f.wall(x, 1);
            f.wall(x, 2);
        }
        f.wall(2, 0);
        f.wall(7, 0);

        let board_before = f.board.clone();
        let piece_before = piece.clone();
        assert!(!rotate_cw(&mut f.board, &mut piece));
        assert!(!rotate_ccw(&mut f.board, &mut piece));
        assert_eq!(piece, piece_before);
        assert_eq!(f.board, board_before);
    }

    #[test]
    fn test_erase_leaves_foreign_blocks() {
        let mut f = Fixture::new(10, 20);
        let piece = f.spawn(PieceKind::O, Position::new(4, 10));
        // Overwrite one of the piece's cells with a foreign block
        let foreign = f.store.create_piece(PieceKind::O, BlockColor::Plain, Position::ORIGIN);
        f.board.place(Position::new(4, 10), foreign.blocks()[0]);

        erase(&mut f.board, &piece);
        assert_eq!(f.occupied(), vec![Position::new(4, 10)]);
    }
}
