use std::collections::VecDeque;

use crate::core::{block::BlockStore, board::Position, piece::Piece};

use super::piece_generator::PieceGenerator;

/// FIFO of upcoming pieces.
///
/// Pieces in the queue are already materialized: their blocks exist in the
/// [`BlockStore`] so that previews can show their colors.
#[derive(Debug, Clone, Default)]
pub struct PieceQueue {
    pieces: VecDeque<Piece>,
}

impl PieceQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one generated batch, creating each piece at `spawn`.
    ///
    /// Returns the number of pieces added.
    pub fn refill(
        &mut self,
        generator: &mut PieceGenerator,
        store: &mut BlockStore,
        spawn: Position,
    ) -> usize {
        let batch = generator.next_batch();
        let added = batch.len();
        self.pieces.extend(
            batch
                .into_iter()
                .map(|template| store.create_piece(template.kind, template.color, spawn)),
        );
        added
    }

    pub fn push_back(&mut self, piece: Piece) {
        self.pieces.push_back(piece);
    }

    pub fn pop_front(&mut self) -> Option<Piece> {
        self.pieces.pop_front()
    }

    #[must_use]
    pub fn front(&self) -> Option<&Piece> {
        self.pieces.front()
    }

    /// Returns an iterator over the upcoming pieces, next first.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Piece> + '_ {
        self.pieces.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::{PieceKind, PieceSeed};

    #[test]
    fn test_refill_appends_a_batch_in_order() {
        let mut generator = PieceGenerator::with_seed(PieceSeed::from_bytes([3; 16]));
        let mut expected = PieceGenerator::with_seed(PieceSeed::from_bytes([3; 16]));
        let mut store = BlockStore::new();
        let mut queue = PieceQueue::new();

        let added = queue.refill(&mut generator, &mut store, Position::new(4, 21));
        assert_eq!(added, PieceGenerator::BATCH_LEN);
        assert_eq!(queue.len(), PieceGenerator::BATCH_LEN);

        for (piece, template) in queue.iter().zip(expected.next_batch()) {
            assert_eq!(piece.kind(), template.kind);
            assert_eq!(piece.color(), template.color);
            assert_eq!(piece.anchor(), Position::new(4, 21));
            assert!(piece.state().is_inactive());
        }
        assert_eq!(store.live_count(), PieceGenerator::BATCH_LEN * 4);
    }

    #[test]
    fn test_aligned_windows_are_fair() {
        let mut generator = PieceGenerator::new();
        let mut store = BlockStore::new();
        let mut queue = PieceQueue::new();
        for _ in 0..3 {
            queue.refill(&mut generator, &mut store, Position::ORIGIN);
        }

        let kinds: Vec<PieceKind> = queue.iter().map(Piece::kind).collect();
        for window in kinds.chunks(PieceKind::LEN) {
            let unique: HashSet<_> = window.iter().collect();
            assert_eq!(unique.len(), PieceKind::LEN);
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut generator = PieceGenerator::new();
        let mut store = BlockStore::new();
        let mut queue = PieceQueue::new();
        queue.refill(&mut generator, &mut store, Position::ORIGIN);

        let first = queue.front().unwrap().id();
        assert_eq!(queue.pop_front().unwrap().id(), first);
        assert_eq!(queue.len(), PieceGenerator::BATCH_LEN - 1);

        queue.clear();
        assert!(queue.is_empty());
        assert!(queue.pop_front().is_none());
    }
}
