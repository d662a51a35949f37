use std::fmt;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{
    block::{BlockColor, BlockId},
    board::Position,
};

/// Maximum number of cells in a piece.
pub const MAX_PIECE_CELLS: usize = 4;

/// Identifier of a piece record.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("piece#{_0}")]
pub struct PieceId(u32);

impl PieceId {
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// A falling-block piece (tetromino) with position, rotation, color and blocks.
///
/// The piece owns an ordered list of block ids, one per shape cell. The order
/// matches [`PieceKind::offsets`]: offset *i* is always occupied by block *i*,
/// whatever the rotation.
///
/// # Coordinate System
///
/// - The anchor is the rotation pivot, in board coordinates (y grows upward)
/// - Rotation is tracked as 0 (spawn), 1 (90° clockwise), 2 (180°) or 3 (270° clockwise)
/// - Cells are the shape offsets rotated clockwise `rotation` times, plus the anchor
///
/// # Example
///
/// ```
/// use bakeris_engine::{BlockColor, BlockStore, PieceKind, Position};
///
/// let mut store = BlockStore::new();
/// let piece = store.create_piece(PieceKind::T, BlockColor::Dough, Position::new(4, 10));
/// let cells = piece.world_positions(piece.anchor());
/// assert!(cells.contains(&Position::new(4, 11)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    color: BlockColor,
    rotation: PieceRotation,
    anchor: Position,
    state: PieceState,
    blocks: ArrayVec<BlockId, MAX_PIECE_CELLS>,
}

impl fmt::Display for Piece {
    // Format: "kind#rotation@x,y" (e.g. "S#1@4,18")
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.rotation.0,
            self.anchor.x,
            self.anchor.y
        )
    }
}

impl Piece {
    pub(crate) fn new(
        id: PieceId,
        kind: PieceKind,
        color: BlockColor,
        anchor: Position,
        blocks: ArrayVec<BlockId, MAX_PIECE_CELLS>,
    ) -> Self {
        debug_assert_eq!(blocks.len(), kind.offsets().len());
        Self {
            id,
            kind,
            color,
            rotation: PieceRotation::default(),
            anchor,
            state: PieceState::Inactive,
            blocks,
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> BlockColor {
        self.color
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn state(&self) -> PieceState {
        self.state
    }

    /// Returns the piece's blocks in shape-offset order.
    #[must_use]
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Returns `true` if `block` is one of this piece's own blocks.
    #[must_use]
    pub fn owns(&self, block: BlockId) -> bool {
        self.blocks.contains(&block)
    }

    /// Returns the shape offsets rotated to `rotation`, in block order.
    #[must_use]
    pub fn cell_offsets(&self, rotation: PieceRotation) -> ArrayVec<Position, MAX_PIECE_CELLS> {
        let offsets = self.kind.offsets().iter();
        if self.kind.is_rotation_invariant() {
            offsets.copied().collect()
        } else {
            offsets.map(|&offset| rotation.apply(offset)).collect()
        }
    }

    /// Returns the board cells the piece would occupy at `anchor` with its current rotation.
    #[must_use]
    pub fn world_positions(&self, anchor: Position) -> ArrayVec<Position, MAX_PIECE_CELLS> {
        self.world_positions_with(self.rotation, anchor)
    }

    /// Like [`Self::world_positions`], but with an explicit rotation.
    #[must_use]
    pub fn world_positions_with(
        &self,
        rotation: PieceRotation,
        anchor: Position,
    ) -> ArrayVec<Position, MAX_PIECE_CELLS> {
        self.cell_offsets(rotation)
            .into_iter()
            .map(|offset| offset + anchor)
            .collect()
    }

    /// Returns the board cells the piece currently occupies, paired with their blocks.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Position, BlockId)> + '_ {
        self.world_positions(self.anchor)
            .into_iter()
            .zip(self.blocks.iter().copied())
    }

    pub(crate) fn set_anchor(&mut self, anchor: Position) {
        self.anchor = anchor;
    }

    pub(crate) fn set_rotation(&mut self, rotation: PieceRotation) {
        self.rotation = rotation;
    }

    pub(crate) fn set_state(&mut self, state: PieceState) {
        self.state = state;
    }

    /// Moves the piece back to `spawn` in its spawn orientation.
    pub(crate) fn reset_to_spawn(&mut self, spawn: Position) {
        self.anchor = spawn;
        self.rotation = PieceRotation::default();
    }
}

/// Lifecycle state of a piece record.
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
    derive_more::IsVariant,
)]
pub enum PieceState {
    /// Waiting in the queue, or fixed on the board.
    #[default]
    Inactive,
    /// Controlled by the player.
    Active,
    /// Stored in the hold buffer.
    Held,
}

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    #[must_use]
    pub fn new(quarter_turns: u8) -> Self {
        Self(quarter_turns % 4)
    }

    #[must_use]
    pub fn quarter_turns(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn rotated_cw(self) -> Self {
        PieceRotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_ccw(self) -> Self {
        PieceRotation((self.0 + 3) % 4)
    }

    /// Rotates an offset clockwise by this rotation around the origin.
    #[must_use]
    pub fn apply(self, offset: Position) -> Position {
        let Position { x, y } = offset;
        match self.0 {
            0 => Position::new(x, y),
            1 => Position::new(y, -x),
            2 => Position::new(-x, -y),
            _ => Position::new(-y, x),
        }
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// T-piece.
    T = 2,
    /// S-piece.
    S = 3,
    /// Z-piece.
    Z = 4,
    /// J-piece.
    J = 5,
    /// L-piece.
    L = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Returns the shape offsets at rotation 0, relative to the pivot.
    ///
    /// The order of the offsets is the order of the piece's blocks.
    #[must_use]
    pub fn offsets(self) -> &'static [Position; MAX_PIECE_CELLS] {
        &PIECE_OFFSETS[self as usize]
    }

    /// The O-piece keeps its footprint under rotation; every other piece turns around its pivot.
    #[must_use]
    pub const fn is_rotation_invariant(self) -> bool {
        matches!(self, PieceKind::O)
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use bakeris_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'T' => Some(PieceKind::T),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            _ => None,
        }
    }
}

static PIECE_OFFSETS: [[Position; MAX_PIECE_CELLS]; PieceKind::LEN] = {
    const fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }
    [
        // I-piece: ####
        [p(-1, 0), p(0, 0), p(1, 0), p(2, 0)],
        // O-piece
        [p(0, 0), p(1, 0), p(0, 1), p(1, 1)],
        // T-piece
        [p(-1, 0), p(0, 0), p(1, 0), p(0, 1)],
        // S-piece
        [p(-1, 0), p(0, 0), p(0, 1), p(1, 1)],
        // Z-piece
        [p(-1, 1), p(0, 1), p(0, 0), p(1, 0)],
        // J-piece
        [p(-1, 1), p(-1, 0), p(0, 0), p(1, 0)],
        // L-piece
        [p(-1, 0), p(0, 0), p(1, 0), p(1, 1)],
    ]
};
