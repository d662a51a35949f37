//! Game engine logic and state management.
//!
//! This module builds the rules of the game on top of the core data
//! structures:
//!
//! - [`Game`] - A match: owns the board, pieces and score, consumes [`Command`]s
//! - [`placement`] - Collision, movement, rotation and drop position
//! - [`wall_kick`] - Shape classes and their wall-kick tables
//! - [`PieceGenerator`] - Color-lane 7-bag generation, seeded by [`PieceSeed`]
//! - [`HoldBuffer`] - Bounded FIFO of held pieces
//! - [`line_resolution`] - Completion predicate, baking and compaction
//! - [`scoring`] - Greedy recipe allocation, currency and line bonus
//! - [`GameStats`] / [`GameSnapshot`] / [`EngineEvent`] - Read-only outputs
//!
//! # Game Flow
//!
//! 1. The host submits [`Command::StartGame`]; the queue is filled and the first piece spawns
//! 2. Each [`Game::step`] consumes one command and moves, rotates or holds the active piece
//! 3. A piece that cannot move down is fixed and completed rows are resolved and scored
//! 4. The next piece spawns; a blocked spawn area ends the match
//! 5. Reaching the target score moves the match to [`GameState::Victory`]

pub use self::{
    command::*, config::*, event::*, game::*, game_stats::*, hold::*, piece_generator::*,
    piece_queue::*, scoring::*, snapshot::*,
};

mod command;
mod config;
mod event;
mod game;
mod game_stats;
mod hold;
pub mod line_resolution;
mod piece_generator;
mod piece_queue;
pub mod placement;
pub mod scoring;
mod snapshot;
pub mod wall_kick;
