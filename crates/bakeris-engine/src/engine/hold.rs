use std::collections::VecDeque;

use crate::{
    EngineError,
    core::{
        board::Position,
        piece::{Piece, PieceState},
    },
};

use super::piece_queue::PieceQueue;

/// Outcome of a hold request.
///
/// Every variant hands back the piece that should be active afterwards.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum HoldResult {
    /// The buffer was full: its oldest piece was swapped for the active one.
    Exchanged(Piece),
    /// The buffer had room: the active piece was stored and a new one drawn.
    Stored(Piece),
    /// Nothing to swap with. The active piece is returned untouched.
    Rejected(Piece),
}

impl HoldResult {
    #[must_use]
    pub fn into_piece(self) -> Piece {
        match self {
            Self::Exchanged(piece) | Self::Stored(piece) | Self::Rejected(piece) => piece,
        }
    }
}

/// Bounded FIFO of held pieces.
///
/// # Example
///
/// ```
/// use bakeris_engine::{BlockColor, BlockStore, HoldBuffer, PieceKind, PieceQueue, Position};
///
/// let spawn = Position::new(4, 21);
/// let mut store = BlockStore::new();
/// let mut queue = PieceQueue::new();
/// queue.push_back(store.create_piece(PieceKind::T, BlockColor::Yeast, spawn));
///
/// let mut hold = HoldBuffer::new(1);
/// let active = store.create_piece(PieceKind::I, BlockColor::Dough, spawn);
/// let result = hold.try_hold(active, &mut queue, spawn).unwrap();
///
/// assert!(result.is_stored());
/// assert_eq!(result.into_piece().kind(), PieceKind::T);
/// assert_eq!(hold.oldest().unwrap().kind(), PieceKind::I);
/// ```
#[derive(Debug, Clone)]
pub struct HoldBuffer {
    capacity: usize,
    pieces: VecDeque<Piece>,
}

impl HoldBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            pieces: VecDeque::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.pieces.len() >= self.capacity
    }

    /// Returns the piece that will leave the buffer next.
    #[must_use]
    pub fn oldest(&self) -> Option<&Piece> {
        self.pieces.front()
    }

    /// Returns an iterator over held pieces, oldest first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Piece> + '_ {
        self.pieces.iter()
    }

    /// Takes the oldest held piece out of the buffer, ready to become active.
    pub fn take_oldest(&mut self, spawn: Position) -> Option<Piece> {
        let mut piece = self.pieces.pop_front()?;
        activate(&mut piece, spawn);
        Some(piece)
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }

    /// Stores the active piece and returns the piece to play next.
    ///
    /// `active` must already be erased from the board. The returned piece is
    /// reset to `spawn` in its spawn orientation and marked active, but it is
    /// not stamped: the caller decides whether it fits.
    pub fn try_hold(
        &mut self,
        mut active: Piece,
        queue: &mut PieceQueue,
        spawn: Position,
    ) -> Result<HoldResult, EngineError> {
        self.check_capacity()?;

        if queue.is_empty() && self.pieces.is_empty() {
            return Ok(HoldResult::Rejected(active));
        }

        active.reset_to_spawn(spawn);
        active.set_state(PieceState::Held);

        let result = if self.is_full() {
            let Some(mut next) = self.pieces.pop_front() else {
                return Err(self.overflow());
            };
            activate(&mut next, spawn);
            self.pieces.push_back(active);
            HoldResult::Exchanged(next)
        } else {
            // Draw before storing so the active piece can't come straight back.
            let next = queue.pop_front().or_else(|| self.pieces.pop_front());
            self.pieces.push_back(active);
            let Some(mut next) = next else {
                return Err(EngineError::PieceSupplyExhausted);
            };
            activate(&mut next, spawn);
            HoldResult::Stored(next)
        };

        self.check_capacity()?;
        Ok(result)
    }

    fn check_capacity(&self) -> Result<(), EngineError> {
        if self.pieces.len() > self.capacity {
            return Err(self.overflow());
        }
        Ok(())
    }

    fn overflow(&self) -> EngineError {
        EngineError::HoldOverflow {
            count: self.pieces.len(),
            capacity: self.capacity,
        }
    }
}

fn activate(piece: &mut Piece, spawn: Position) {
    piece.reset_to_spawn(spawn);
    piece.set_state(PieceState::Active);
}
