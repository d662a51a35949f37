use serde::{Deserialize, Serialize};

use crate::{
    ConfigError,
    core::{board::Position, piece::PieceKind},
    engine::scoring::{LineBonus, RecipeScores},
};

/// What happens to a completed row once it has been scored.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum LineClearPolicy {
    /// Remove the row, drop its blocks and shift every row above it down.
    #[default]
    Compact,
    /// Leave the baked (`Living`) blocks in place. The row stays occupied and
    /// can never complete again.
    MarkInPlace,
}

/// Scoring policy values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Points per recipe unit.
    pub recipes: RecipeScores,
    /// Currency awarded per 100 points scored.
    pub currency_percent: u32,
    /// Extra points per resolution pass.
    pub line_bonus: LineBonus,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            recipes: RecipeScores::default(),
            currency_percent: 10,
            line_bonus: LineBonus::None,
        }
    }
}

/// Immutable engine configuration, passed to [`Game::new`](crate::Game::new).
///
/// Every field has a default, so a partial JSON document is a valid
/// configuration:
///
/// ```
/// use bakeris_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "hold_size": 2 }"#).unwrap();
/// assert_eq!(config.hold_size, 2);
/// assert_eq!(config.board_width, 10);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board_width: usize,
    /// Rows visible to the player ("safe" area).
    pub visible_height: usize,
    /// Hidden rows above the visible area where pieces spawn.
    pub spawn_buffer: usize,
    /// Anchor of newly spawned pieces. Defaults to the middle of the spawn buffer.
    pub spawn_anchor: Option<Position>,
    /// Maximum number of pieces in the hold buffer.
    pub hold_size: usize,
    /// Score at which the match is won.
    pub target_score: u64,
    pub line_clear: LineClearPolicy,
    pub scoring: ScoringConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_width: 10,
            visible_height: 20,
            spawn_buffer: 4,
            spawn_anchor: None,
            hold_size: 1,
            target_score: 1000,
            line_clear: LineClearPolicy::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Upper bound on either board dimension, keeping coordinates well inside `i32`.
const MAX_BOARD_DIMENSION: usize = 1024;

impl EngineConfig {
    /// Total board height, including the spawn buffer.
    #[must_use]
    pub fn board_height(&self) -> usize {
        self.visible_height + self.spawn_buffer
    }

    /// Anchor where new and held pieces (re)appear.
    #[must_use]
    pub fn spawn_anchor(&self) -> Position {
        self.spawn_anchor.unwrap_or_else(|| {
            // Dimensions are bounded by `validate`.
            let x = i32::try_from(self.board_width / 2).unwrap_or(i32::MAX) - 1;
            let y = i32::try_from(self.visible_height).unwrap_or(i32::MAX) + 1;
            Position::new(x, y)
        })
    }

    /// Checks that the configuration describes a playable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = self.board_width;
        let height = self.board_height();
        if width < 4 || width > MAX_BOARD_DIMENSION {
            return Err(ConfigError::InvalidWidth { width });
        }
        if self.visible_height == 0 || height > MAX_BOARD_DIMENSION {
            return Err(ConfigError::InvalidHeight { height });
        }
        if self.hold_size == 0 {
            return Err(ConfigError::ZeroHoldSize);
        }
        if let LineBonus::Table { multipliers, .. } = &self.scoring.line_bonus
            && multipliers.is_empty()
        {
            return Err(ConfigError::EmptyBonusTable);
        }

        // Every piece must fit at the spawn anchor on an empty board.
        let spawn = self.spawn_anchor();
        let fits = |pos: Position| {
            usize::try_from(pos.x).is_ok_and(|x| x < width)
                && usize::try_from(pos.y).is_ok_and(|y| y < height)
        };
        for kind in PieceKind::ALL {
            if !kind.offsets().iter().all(|&offset| fits(offset + spawn)) {
                return Err(ConfigError::SpawnOutOfBounds { anchor: spawn, kind });
            }
        }
        Ok(())
    }
}
