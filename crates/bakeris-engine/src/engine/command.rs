use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::piece_generator::PieceSeed;

/// A player or host intent, consumed one per [`Game::step`](crate::Game::step).
///
/// Serialized as a snake_case tag, with `start_game` optionally carrying a seed:
///
/// ```
/// use bakeris_engine::Command;
///
/// let commands: Vec<Command> = serde_json::from_str(
///     r#"[{ "start_game": "000102030405060708090a0b0c0d0e0f" }, "move_left", "hard_drop"]"#,
/// ).unwrap();
/// assert_eq!(commands[1], Command::MoveLeft);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Starts (or restarts) a match. A seed makes the piece sequence reproducible.
    StartGame(Option<PieceSeed>),
    EndGame,
    MoveLeft,
    MoveRight,
    /// Moves one row down, fixing the piece if it cannot move.
    SoftDrop,
    /// Drops to the lowest reachable row and fixes the piece.
    HardDrop,
    RotateCw,
    RotateCcw,
    Hold,
    /// Appends a freshly generated batch to the piece queue.
    Generate,
}

impl Command {
    /// Returns `true` for commands that act on the active piece.
    #[must_use]
    pub fn is_piece_control(self) -> bool {
        matches!(
            self,
            Self::MoveLeft
                | Self::MoveRight
                | Self::SoftDrop
                | Self::HardDrop
                | Self::RotateCw
                | Self::RotateCcw
                | Self::Hold
        )
    }
}

/// Unbounded FIFO of submitted commands.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    commands: VecDeque<Command>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }
}

impl Extend<Command> for CommandQueue {
    fn extend<T: IntoIterator<Item = Command>>(&mut self, iter: T) {
        self.commands.extend(iter);
    }
}
