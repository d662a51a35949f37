use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace};

use crate::{
    ConfigError, EngineError,
    core::{
        block::{Block, BlockId, BlockStore},
        board::{Board, Position},
        piece::{Piece, PieceState},
    },
};

use super::{
    command::{Command, CommandQueue},
    config::EngineConfig,
    event::{EngineEvent, EventQueue},
    game_stats::GameStats,
    hold::{HoldBuffer, HoldResult},
    line_resolution::{self, CompletedLines},
    piece_generator::{PieceGenerator, PieceSeed},
    piece_queue::PieceQueue,
    placement,
    scoring::{ScoreState, score_row},
    snapshot::GameSnapshot,
};

/// Lifecycle of a match.
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
pub enum GameState {
    /// No match has been started yet.
    #[default]
    Uninitialized,
    /// A match is being set up; the first piece has not spawned yet.
    Initial,
    Playing,
    /// Topped out, ended by the host, or stopped by an engine error.
    GameOver,
    /// The target score was reached.
    Victory,
    /// Between rounds, while the host offers rewards.
    RewardSelection,
}

/// What a call to [`Game::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    /// No command was pending.
    Idle,
    /// The command changed the match.
    Applied(Command),
    /// The command was not legal in the current state and changed nothing.
    Rejected(Command),
}

/// A match: board, pieces, score and the command queue driving them.
///
/// Commands are submitted with [`Game::submit`] and processed strictly in
/// order, one per [`Game::step`]. Illegal moves are rejected without side
/// effects. An [`EngineError`] means an internal invariant broke: the match
/// is moved to [`GameState::GameOver`] and the error is returned to the host.
///
/// # Example
///
/// ```
/// use bakeris_engine::{Command, EngineConfig, Game, GameState, PieceSeed};
///
/// let mut game = Game::new(EngineConfig::default()).unwrap();
/// game.submit(Command::StartGame(Some(PieceSeed::from_bytes([1; 16]))));
/// game.submit(Command::MoveLeft);
/// game.submit(Command::HardDrop);
/// game.run_pending().unwrap();
///
/// assert_eq!(game.state(), GameState::Playing);
/// assert_eq!(game.stats().completed_pieces(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    config: EngineConfig,
    spawn: Position,
    board: Board,
    blocks: BlockStore,
    generator: PieceGenerator,
    queue: PieceQueue,
    hold: HoldBuffer,
    active: Option<Piece>,
    score: ScoreState,
    stats: GameStats,
    state: GameState,
    commands: CommandQueue,
    events: EventQueue,
}

impl Game {
    /// Creates an idle game with a randomly seeded piece generator.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_generator(config, PieceGenerator::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    pub fn with_seed(config: EngineConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        Self::with_generator(config, PieceGenerator::with_seed(seed))
    }

    fn with_generator(
        config: EngineConfig,
        generator: PieceGenerator,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            spawn: config.spawn_anchor(),
            board: Board::new(config.board_width, config.board_height()),
            blocks: BlockStore::new(),
            generator,
            queue: PieceQueue::new(),
            hold: HoldBuffer::new(config.hold_size),
            active: None,
            score: ScoreState::new(config.target_score),
            stats: GameStats::new(),
            state: GameState::Uninitialized,
            commands: CommandQueue::new(),
            events: EventQueue::new(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Looks up a block referenced by the board or a piece.
    #[must_use]
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    #[must_use]
    pub fn spawn_anchor(&self) -> Position {
        self.spawn
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// Returns where the active piece would land if hard-dropped.
    #[must_use]
    pub fn ghost_position(&self) -> Option<Position> {
        self.active
            .as_ref()
            .map(|piece| placement::drop_position(&self.board, piece))
    }

    #[must_use]
    pub fn hold(&self) -> &HoldBuffer {
        &self.hold
    }

    #[must_use]
    pub fn queue(&self) -> &PieceQueue {
        &self.queue
    }

    #[must_use]
    pub fn score(&self) -> &ScoreState {
        &self.score
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Captures a serializable view of the match.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    /// Queues a command for a later [`Self::step`].
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Removes and returns every pending event, oldest first.
    ///
    /// Events accumulate until drained. Hosts that never drain still see them
    /// discarded when the next match starts.
    pub fn drain_events(&mut self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.events.drain()
    }

    /// Processes the oldest pending command.
    pub fn step(&mut self) -> Result<StepOutcome, EngineError> {
        let Some(command) = self.commands.pop() else {
            return Ok(StepOutcome::Idle);
        };
        debug!(?command, state = ?self.state, "processing command");

        match self.apply(command) {
            Ok(true) => Ok(StepOutcome::Applied(command)),
            Ok(false) => {
                trace!(?command, "command rejected");
                Ok(StepOutcome::Rejected(command))
            }
            Err(err) => {
                error!(%err, ?command, "engine invariant violated, ending match");
                self.active = None;
                self.set_state(GameState::GameOver);
                Err(err)
            }
        }
    }

    /// Steps until the command queue is empty. Returns the number of commands processed.
    pub fn run_pending(&mut self) -> Result<usize, EngineError> {
        let mut processed = 0;
        while !self.step()?.is_idle() {
            processed += 1;
        }
        Ok(processed)
    }

    /// Moves a won match to reward selection.
    ///
    /// Returns `false` unless the match is in [`GameState::Victory`].
    pub fn begin_reward_selection(&mut self) -> bool {
        if !self.state.is_victory() {
            return false;
        }
        self.set_state(GameState::RewardSelection);
        true
    }

    /// Starts the next round with a new target, keeping the earned currency.
    ///
    /// Returns `Ok(false)` unless the match is in [`GameState::RewardSelection`].
    pub fn start_next_round(&mut self, target: u64) -> Result<bool, EngineError> {
        if !self.state.is_reward_selection() {
            return Ok(false);
        }
        let currency = self.score.currency;
        self.reset();
        self.score = ScoreState {
            currency,
            ..ScoreState::new(target)
        };
        self.begin_round()?;
        Ok(true)
    }

    fn apply(&mut self, command: Command) -> Result<bool, EngineError> {
        if command.is_piece_control() && !self.state.is_playing() {
            return Ok(false);
        }
        match command {
            Command::StartGame(seed) => {
                if let Some(seed) = seed {
                    self.generator = PieceGenerator::with_seed(seed);
                }
                // Undrained events of the previous match are dropped.
                self.events.clear();
                self.reset();
                self.score = ScoreState::new(self.config.target_score);
                self.begin_round()?;
                Ok(true)
            }
            Command::EndGame => {
                if !matches!(
                    self.state,
                    GameState::Initial | GameState::Playing | GameState::RewardSelection
                ) {
                    return Ok(false);
                }
                self.active = None;
                self.set_state(GameState::GameOver);
                Ok(true)
            }
            Command::Generate => {
                if !matches!(self.state, GameState::Initial | GameState::Playing) {
                    return Ok(false);
                }
                let added = self.queue.refill(&mut self.generator, &mut self.blocks, self.spawn);
                debug!(added, queued = self.queue.len(), "piece batch generated");
                Ok(true)
            }
            Command::MoveLeft => {
                let piece = self.active.as_mut().ok_or(EngineError::MissingActivePiece)?;
                Ok(placement::move_left(&mut self.board, piece))
            }
            Command::MoveRight => {
                let piece = self.active.as_mut().ok_or(EngineError::MissingActivePiece)?;
                Ok(placement::move_right(&mut self.board, piece))
            }
            Command::RotateCw => {
                let piece = self.active.as_mut().ok_or(EngineError::MissingActivePiece)?;
                Ok(placement::rotate_cw(&mut self.board, piece))
            }
            Command::RotateCcw => {
                let piece = self.active.as_mut().ok_or(EngineError::MissingActivePiece)?;
                Ok(placement::rotate_ccw(&mut self.board, piece))
            }
            Command::SoftDrop => {
                let piece = self.active.as_mut().ok_or(EngineError::MissingActivePiece)?;
                if !placement::move_down(&mut self.board, piece) {
                    self.fix_active()?;
                }
                Ok(true)
            }
            Command::HardDrop => {
                let piece = self.active.as_mut().ok_or(EngineError::MissingActivePiece)?;
                while placement::move_down(&mut self.board, piece) {}
                self.fix_active()?;
                Ok(true)
            }
            Command::Hold => self.hold_active(),
        }
    }

    fn set_state(&mut self, state: GameState) {
        if self.state == state {
            return;
        }
        info!(from = ?self.state, to = ?state, "game state changed");
        self.state = state;
        self.events.push(EngineEvent::StateChanged(state));
    }

    /// Clears the board and every piece container.
    fn reset(&mut self) {
        self.board.reset();
        self.blocks.clear();
        self.queue.clear();
        self.hold.clear();
        self.active = None;
        self.stats = GameStats::new();
    }

    fn begin_round(&mut self) -> Result<(), EngineError> {
        self.set_state(GameState::Initial);
        self.queue
            .refill(&mut self.generator, &mut self.blocks, self.spawn);
        self.spawn_next()
    }

    /// Draws the next piece and places it at the spawn anchor.
    ///
    /// Tops out (game over) if the spawn area is blocked.
    fn spawn_next(&mut self) -> Result<(), EngineError> {
        let next = match self.queue.pop_front() {
            Some(piece) => piece,
            None => self
                .hold
                .take_oldest(self.spawn)
                .ok_or(EngineError::PieceSupplyExhausted)?,
        };
        if self.queue.is_empty() {
            self.queue
                .refill(&mut self.generator, &mut self.blocks, self.spawn);
        }
        self.activate(next);
        Ok(())
    }

    fn activate(&mut self, mut piece: Piece) {
        piece.reset_to_spawn(self.spawn);
        piece.set_state(PieceState::Active);
        if !placement::can_place(&self.board, &piece, self.spawn) {
            info!(%piece, "spawn area blocked");
            for &id in piece.blocks() {
                self.blocks.remove(id);
            }
            self.active = None;
            self.set_state(GameState::GameOver);
            return;
        }
        placement::stamp(&mut self.board, &piece);
        debug!(%piece, color = ?piece.color(), "piece spawned");
        self.active = Some(piece);
        self.set_state(GameState::Playing);
    }

    fn hold_active(&mut self) -> Result<bool, EngineError> {
        let active = self.active.take().ok_or(EngineError::MissingActivePiece)?;
        placement::erase(&mut self.board, &active);

        let incoming = if self.hold.is_full() {
            self.hold.oldest()
        } else {
            self.queue.front().or(self.hold.oldest())
        };
        // The incoming piece is already in spawn orientation.
        let fits =
            incoming.is_some_and(|piece| placement::can_place(&self.board, piece, self.spawn));
        if !fits {
            placement::stamp(&mut self.board, &active);
            self.active = Some(active);
            return Ok(false);
        }

        match self.hold.try_hold(active, &mut self.queue, self.spawn)? {
            HoldResult::Rejected(piece) => {
                placement::stamp(&mut self.board, &piece);
                self.active = Some(piece);
                Ok(false)
            }
            HoldResult::Stored(next) | HoldResult::Exchanged(next) => {
                if self.queue.is_empty() {
                    self.queue
                        .refill(&mut self.generator, &mut self.blocks, self.spawn);
                }
                debug!(piece = %next, held = self.hold.len(), "hold applied");
                placement::stamp(&mut self.board, &next);
                self.active = Some(next);
                Ok(true)
            }
        }
    }

    /// Fixes the active piece, resolves completed rows and spawns the next piece.
    fn fix_active(&mut self) -> Result<(), EngineError> {
        let piece = self.active.take().ok_or(EngineError::MissingActivePiece)?;
        debug!(%piece, "piece fixed");
        // Blocks stay on the board; only the piece record goes away.
        self.events.push(EngineEvent::PieceFixed(piece.id()));

        let lines = line_resolution::find_completed_lines(&self.board, &self.blocks)?;
        let points = if lines.is_empty() {
            0
        } else {
            self.resolve_lines(&lines)?
        };
        self.stats.complete_piece(lines.len());

        if points > 0 {
            let currency = self.score.award(points, self.config.scoring.currency_percent);
            debug!(points, currency, score = self.score.current, "score awarded");
        }
        if self.score.reached_target() {
            info!(score = self.score.current, target = self.score.target, "target reached");
            self.set_state(GameState::Victory);
            return Ok(());
        }
        self.spawn_next()
    }

    fn resolve_lines(&mut self, lines: &CompletedLines) -> Result<u64, EngineError> {
        self.events.push(EngineEvent::LinesCompleted {
            rows: lines.rows().to_vec(),
        });
        let resolved =
            line_resolution::resolve(&self.board, &mut self.blocks, lines, &mut self.events)?;

        let scoring = &self.config.scoring;
        let mut points = 0_u64;
        let mut living_blocks = 0;
        for row in &resolved {
            let row_score = score_row(row.colors, &scoring.recipes);
            self.stats.record_row(&row_score);
            self.events.push(EngineEvent::RowScored {
                row: row.y,
                points: row_score.points,
            });
            points = points.saturating_add(row_score.points);
            living_blocks += row.colors.total() as usize;
        }
        points = points.saturating_add(scoring.line_bonus.bonus(lines.len(), living_blocks));

        if self.config.line_clear.is_compact() {
            line_resolution::compact(&mut self.board, &mut self.blocks, lines);
        }
        info!(lines = lines.len(), points, "lines completed");
        Ok(points)
    }
}
