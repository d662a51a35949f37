use serde::{Deserialize, Serialize};

use super::{
    board::Position,
    piece::{Piece, PieceId, PieceKind},
};

/// Identifier of a [`Block`] stored in a [`BlockStore`].
///
/// Ids are never reused within a match, so a stale id can be detected by a
/// failed lookup instead of silently aliasing a newer block.
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
#[display("block#{_0}")]
pub struct BlockId(u32);

impl BlockId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Activation state of a block.
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
pub enum BlockState {
    /// Unbaked: the block still counts towards completing a line.
    #[default]
    Empty,
    /// Baked: the block has been consumed by a completed line.
    Living,
}

/// Color of a block, doubling as the recipe ingredient it represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockColor {
    Dough = 0,
    Yeast = 1,
    Syrup = 2,
    /// Neutral color, never used by a recipe.
    Plain = 3,
}

impl BlockColor {
    /// Number of supported colors (4).
    pub const LEN: usize = 4;

    pub const ALL: [Self; Self::LEN] = [Self::Dough, Self::Yeast, Self::Syrup, Self::Plain];

    /// Returns the single character representation of this color.
    ///
    /// # Examples
    ///
    /// ```
    /// use bakeris_engine::BlockColor;
    ///
    /// assert_eq!(BlockColor::Dough.as_char(), 'D');
    /// assert_eq!(BlockColor::Plain.as_char(), 'P');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            BlockColor::Dough => 'D',
            BlockColor::Yeast => 'Y',
            BlockColor::Syrup => 'S',
            BlockColor::Plain => 'P',
        }
    }

    /// Parses a color from its single character representation (case-insensitive).
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'D' => Some(BlockColor::Dough),
            'Y' => Some(BlockColor::Yeast),
            'S' => Some(BlockColor::Syrup),
            'P' => Some(BlockColor::Plain),
            _ => None,
        }
    }
}

/// A single cell of a piece ("mino").
///
/// A block belongs to exactly one piece. The back-reference is a plain
/// [`PieceId`]; once the piece is fixed the block outlives the piece record and
/// is referenced only by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    piece: PieceId,
    color: BlockColor,
    state: BlockState,
}

impl Block {
    #[must_use]
    pub fn piece(&self) -> PieceId {
        self.piece
    }

    #[must_use]
    pub fn color(&self) -> BlockColor {
        self.color
    }

    #[must_use]
    pub fn state(&self) -> BlockState {
        self.state
    }
}

/// Arena owning every block and handing out piece ids.
///
/// Removed blocks keep their slot for the rest of the match so ids are never
/// reused. [`Self::clear`] releases every slot when the board is reset.
#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: Vec<Option<Block>>,
    next_piece: u32,
}

impl BlockStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inactive piece with one freshly allocated block per shape cell.
    pub fn create_piece(&mut self, kind: PieceKind, color: BlockColor, anchor: Position) -> Piece {
        let id = PieceId::new(self.next_piece);
        self.next_piece += 1;
        let blocks = (0..kind.offsets().len())
            .map(|_| self.allocate_block(id, color))
            .collect();
        Piece::new(id, kind, color, anchor, blocks)
    }

    /// Allocates a loose block owned by `piece`.
    pub fn allocate_block(&mut self, piece: PieceId, color: BlockColor) -> BlockId {
        let id = BlockId(u32::try_from(self.blocks.len()).expect("block id space exhausted"));
        self.blocks.push(Some(Block {
            piece,
            color,
            state: BlockState::Empty,
        }));
        id
    }

    #[must_use]
    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index()).and_then(Option::as_ref)
    }

    /// Changes the activation state of a block.
    ///
    /// Returns `false` if the block does not exist.
    pub fn set_state(&mut self, id: BlockId, state: BlockState) -> bool {
        match self.blocks.get_mut(id.index()).and_then(Option::as_mut) {
            Some(block) => {
                block.state = state;
                true
            }
            None => false,
        }
    }

    /// Drops a block from the arena. Its id is never handed out again.
    pub fn remove(&mut self, id: BlockId) -> Option<Block> {
        self.blocks.get_mut(id.index()).and_then(Option::take)
    }

    /// Returns the number of blocks still alive.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.blocks.iter().flatten().count()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.next_piece = 0;
    }
}
