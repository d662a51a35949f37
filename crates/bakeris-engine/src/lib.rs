//! Simulation core of Bakeris, a falling-block puzzle with recipe scoring.
//!
//! Pieces fall onto a grid, completed rows are baked, and the colors of a
//! baked row are turned into points by a greedy recipe allocation. Rendering
//! and input live outside this crate: a host submits [`Command`]s, calls
//! [`Game::step`] once per tick and reads the state back through accessors,
//! [`GameSnapshot`] or [`EngineEvent`]s.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Engine invariant violation.
///
/// These never result from player input: illegal moves and rotations are
/// silently rejected. An `EngineError` means the match state is corrupt and
/// the host should end or restart the match.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    #[display("hold buffer holds {count} pieces, exceeding its capacity of {capacity}")]
    HoldOverflow { count: usize, capacity: usize },
    #[display("board cell {position} references missing {block}")]
    DanglingBlock { position: Position, block: BlockId },
    #[display("piece queue and hold buffer are both empty")]
    PieceSupplyExhausted,
    #[display("no active piece while playing")]
    MissingActivePiece,
}

/// Invalid [`EngineConfig`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board width must be between 4 and 1024, got {width}")]
    InvalidWidth { width: usize },
    #[display("board height must be between 1 and 1024, got {height}")]
    InvalidHeight { height: usize },
    #[display("hold size must be at least 1")]
    ZeroHoldSize,
    #[display("line bonus table has no multipliers")]
    EmptyBonusTable,
    #[display("{kind:?} piece does not fit at spawn anchor {anchor}")]
    SpawnOutOfBounds { anchor: Position, kind: PieceKind },
}
