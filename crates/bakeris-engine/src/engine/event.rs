use std::collections::VecDeque;

use serde::Serialize;

use crate::core::{block::BlockId, piece::PieceId};

use super::game::GameState;

/// Notification emitted by the engine for observers (animations, sound, logs).
///
/// Events never feed back into the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::IsVariant)]
#[serde(rename_all = "snake_case")]
pub enum EngineEvent {
    /// A block in a completed row was baked (`Empty` to `Living`).
    BlockActivated(BlockId),
    /// The active piece landed and was fixed to the board.
    PieceFixed(PieceId),
    /// Rows completed in one resolution pass, bottom to top.
    LinesCompleted { rows: Vec<usize> },
    /// Points earned by one completed row.
    RowScored { row: usize, points: u64 },
    StateChanged(GameState),
}

/// Pending events, oldest first.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: VecDeque<EngineEvent>,
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: EngineEvent) {
        self.events.push_back(event);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and returns every pending event.
    pub fn drain(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
