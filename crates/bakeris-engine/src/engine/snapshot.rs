use serde::Serialize;

use crate::core::{
    block::BlockColor,
    board::Position,
    piece::{Piece, PieceId, PieceKind},
};

use super::{
    game::{Game, GameState},
    game_stats::GameStats,
    scoring::ScoreState,
};

/// Read-only, serializable view of a [`Game`], taken between steps.
///
/// Board rows are listed top to bottom as strings, one character per cell:
///
/// - `.`: empty
/// - `D`, `Y`, `S`, `P`: unbaked block of that color
/// - `d`, `y`, `s`, `p`: baked (`Living`) block of that color
/// - `?`: cell referencing a missing block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub state: GameState,
    pub score: ScoreState,
    pub board: Vec<String>,
    pub active: Option<PieceView>,
    pub ghost: Option<Position>,
    pub hold: Vec<PieceView>,
    pub queue: Vec<PieceView>,
    pub stats: GameStats,
}

/// Shape, color and placement of a piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub id: PieceId,
    pub kind: PieceKind,
    pub color: BlockColor,
    pub rotation: u8,
    pub anchor: Position,
    pub cells: Vec<Position>,
}

impl From<&Piece> for PieceView {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id(),
            kind: piece.kind(),
            color: piece.color(),
            rotation: piece.rotation().quarter_turns(),
            anchor: piece.anchor(),
            cells: piece.world_positions(piece.anchor()).to_vec(),
        }
    }
}

impl GameSnapshot {
    #[must_use]
    pub fn capture(game: &Game) -> Self {
        let board: Vec<String> = game
            .board()
            .rows()
            .rev()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        None => '.',
                        Some(id) => match game.block(*id) {
                            None => '?',
                            Some(block) if block.state().is_living() => {
                                block.color().as_char().to_ascii_lowercase()
                            }
                            Some(block) => block.color().as_char(),
                        },
                    })
                    .collect::<String>()
            })
            .collect();

        Self {
            state: game.state(),
            score: *game.score(),
            board,
            active: game.active_piece().map(PieceView::from),
            ghost: game.ghost_position(),
            hold: game.hold().iter().map(PieceView::from).collect(),
            queue: game.queue().iter().map(PieceView::from).collect(),
            stats: game.stats().clone(),
        }
    }
}
