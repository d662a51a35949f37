use serde::Serialize;

use super::scoring::{Recipe, RowScore};

/// Match statistics.
///
/// Tracks metrics that the score alone doesn't show:
///
/// - **Completed pieces**: Total number of pieces fixed to the board
/// - **Completed lines**: Total number of rows baked
/// - **Line completion distribution**: Resolution passes by number of rows
/// - **Recipes baked**: Units of each recipe across all rows
///
/// # Example
///
/// ```
/// use bakeris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece(2);
///
/// assert_eq!(stats.completed_pieces(), 1);
/// assert_eq!(stats.total_completed_lines(), 2);
/// assert_eq!(stats.line_completed_counter()[2], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    completed_pieces: usize,
    total_completed_lines: usize,
    line_completed_counter: [usize; 5],
    recipes_baked: [u64; Recipe::LEN],
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_completed_lines: 0,
            line_completed_counter: [0; 5],
            recipes_baked: [0; Recipe::LEN],
        }
    }

    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_completed_lines(&self) -> usize {
        self.total_completed_lines
    }

    /// Returns a histogram of resolution passes by number of completed rows.
    ///
    /// Index 0 counts pieces that completed nothing; passes of 4 or more rows
    /// are counted at index 4.
    #[must_use]
    pub const fn line_completed_counter(&self) -> &[usize; 5] {
        &self.line_completed_counter
    }

    #[must_use]
    pub fn recipes_baked(&self, recipe: Recipe) -> u64 {
        self.recipes_baked[recipe as usize]
    }

    /// Records a fixed piece and the number of rows it completed.
    pub fn complete_piece(&mut self, completed_lines: usize) {
        self.completed_pieces += 1;
        self.total_completed_lines += completed_lines;
        let bucket = completed_lines.min(self.line_completed_counter.len() - 1);
        self.line_completed_counter[bucket] += 1;
    }

    /// Records the recipes baked from one row.
    pub fn record_row(&mut self, score: &RowScore) {
        for (total, units) in self.recipes_baked.iter_mut().zip(score.baked) {
            *total += u64::from(units);
        }
    }
}
