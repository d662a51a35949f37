//! Detection and resolution of completed rows.
//!
//! A row is complete when every cell is occupied by an unbaked (`Empty`)
//! block. Resolution bakes those blocks (`Living`) and reports each row's
//! ingredients to the scoring engine. What happens to the row afterwards is
//! decided by [`LineClearPolicy`](super::config::LineClearPolicy).

use tracing::debug;

use crate::{
    EngineError,
    core::{
        block::{BlockState, BlockStore},
        board::{Board, Position},
    },
};

use super::{
    event::{EngineEvent, EventQueue},
    scoring::ColorCounts,
};

/// Rows that satisfied the completion predicate in one pass, bottom to top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedLines {
    rows: Vec<usize>,
}

impl CompletedLines {
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A baked row and the colors it contained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRow {
    pub y: usize,
    pub colors: ColorCounts,
}

fn row_position(x: usize, y: usize) -> Position {
    // Board dimensions are bounded by config validation.
    Position::new(
        i32::try_from(x).unwrap_or(i32::MAX),
        i32::try_from(y).unwrap_or(i32::MAX),
    )
}

/// Scans every row for the completion predicate.
///
/// Fails if the board references a block missing from the store.
pub fn find_completed_lines(
    board: &Board,
    store: &BlockStore,
) -> Result<CompletedLines, EngineError> {
    let mut rows = Vec::new();
    for (y, row) in board.rows().enumerate() {
        let mut complete = true;
        for (x, cell) in row.iter().enumerate() {
            let Some(id) = *cell else {
                complete = false;
                continue;
            };
            let block = store.get(id).ok_or(EngineError::DanglingBlock {
                position: row_position(x, y),
                block: id,
            })?;
            complete &= block.state().is_empty();
        }
        if complete {
            rows.push(y);
        }
    }
    Ok(CompletedLines { rows })
}

/// Bakes every block of the completed rows, emitting
/// [`EngineEvent::BlockActivated`] per block.
pub fn resolve(
    board: &Board,
    store: &mut BlockStore,
    lines: &CompletedLines,
    events: &mut EventQueue,
) -> Result<Vec<ResolvedRow>, EngineError> {
    let mut resolved = Vec::with_capacity(lines.len());
    for &y in lines.rows() {
        let mut colors = ColorCounts::default();
        for (x, cell) in board.row(y).iter().enumerate() {
            let Some(id) = *cell else { continue };
            let Some(block) = store.get(id) else {
                return Err(EngineError::DanglingBlock {
                    position: row_position(x, y),
                    block: id,
                });
            };
            let color = block.color();
            store.set_state(id, BlockState::Living);
            colors.add(color);
            events.push(EngineEvent::BlockActivated(id));
        }
        debug!(row = y, ?colors, "row resolved");
        resolved.push(ResolvedRow { y, colors });
    }
    Ok(resolved)
}

/// Removes the completed rows and their blocks, shifting the rows above down.
pub fn compact(board: &mut Board, store: &mut BlockStore, lines: &CompletedLines) -> usize {
    for &y in lines.rows() {
        for id in board.row(y).iter().flatten() {
            store.remove(*id);
        }
    }
    board.remove_rows(lines.rows())
}
