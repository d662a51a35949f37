//! Recipe-based scoring of completed rows.
//!
//! The colors of a completed row are ingredients. They are turned into
//! recipes greedily, most valuable recipe first, and each recipe unit is worth
//! a configurable number of points.

use serde::{Deserialize, Serialize};

use crate::core::block::BlockColor;

/// A recipe, listed in allocation order (highest value first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Recipe {
    /// 1 Dough + 1 Yeast + 1 Syrup.
    ChocoSoraBread = 0,
    /// 1 Dough + 1 Yeast.
    Bread = 1,
    /// 1 Dough + 1 Syrup.
    IcingCookie = 2,
    /// 1 Dough.
    Cookie = 3,
}

impl Recipe {
    pub const LEN: usize = 4;

    /// All recipes in the order they are allocated.
    pub const ALL: [Self; Self::LEN] = [
        Self::ChocoSoraBread,
        Self::Bread,
        Self::IcingCookie,
        Self::Cookie,
    ];

    /// Ingredients consumed by one unit of this recipe.
    #[must_use]
    pub const fn ingredients(self) -> &'static [BlockColor] {
        match self {
            Self::ChocoSoraBread => &[BlockColor::Dough, BlockColor::Yeast, BlockColor::Syrup],
            Self::Bread => &[BlockColor::Dough, BlockColor::Yeast],
            Self::IcingCookie => &[BlockColor::Dough, BlockColor::Syrup],
            Self::Cookie => &[BlockColor::Dough],
        }
    }
}

/// Points per recipe unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeScores {
    pub choco_sora_bread: u64,
    pub bread: u64,
    pub icing_cookie: u64,
    pub cookie: u64,
}

impl Default for RecipeScores {
    fn default() -> Self {
        Self {
            choco_sora_bread: 100,
            bread: 50,
            icing_cookie: 50,
            cookie: 10,
        }
    }
}

impl RecipeScores {
    #[must_use]
    pub fn get(&self, recipe: Recipe) -> u64 {
        match recipe {
            Recipe::ChocoSoraBread => self.choco_sora_bread,
            Recipe::Bread => self.bread,
            Recipe::IcingCookie => self.icing_cookie,
            Recipe::Cookie => self.cookie,
        }
    }
}

/// Number of blocks of each color in a row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCounts([u32; BlockColor::LEN]);

impl ColorCounts {
    #[must_use]
    pub const fn new(dough: u32, yeast: u32, syrup: u32, plain: u32) -> Self {
        Self([dough, yeast, syrup, plain])
    }

    #[must_use]
    pub fn get(&self, color: BlockColor) -> u32 {
        self.0[color as usize]
    }

    pub fn add(&mut self, color: BlockColor) {
        self.0[color as usize] += 1;
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

impl FromIterator<BlockColor> for ColorCounts {
    fn from_iter<T: IntoIterator<Item = BlockColor>>(iter: T) -> Self {
        let mut counts = Self::default();
        for color in iter {
            counts.add(color);
        }
        counts
    }
}

/// Result of scoring one row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowScore {
    pub points: u64,
    /// Units baked per recipe, indexed like [`Recipe::ALL`].
    pub baked: [u32; Recipe::LEN],
}

impl RowScore {
    #[must_use]
    pub fn units(&self, recipe: Recipe) -> u32 {
        self.baked[recipe as usize]
    }
}

/// Allocates the ingredients of a row to recipes, highest value first.
///
/// Leftover Yeast, Syrup and every Plain block are worth nothing.
///
/// # Example
///
/// ```
/// use bakeris_engine::{ColorCounts, Recipe, RecipeScores, score_row};
///
/// // 4 Dough, 3 Yeast, 1 Syrup: 1 Choco-Sora-Bread, 2 Bread, 1 Cookie
/// let score = score_row(ColorCounts::new(4, 3, 1, 2), &RecipeScores::default());
/// assert_eq!(score.points, 100 + 2 * 50 + 10);
/// assert_eq!(score.units(Recipe::Bread), 2);
/// ```
#[must_use]
pub fn score_row(counts: ColorCounts, scores: &RecipeScores) -> RowScore {
    let mut remaining = counts;
    let mut result = RowScore::default();
    for recipe in Recipe::ALL {
        let ingredients = recipe.ingredients();
        let units = ingredients
            .iter()
            .map(|&color| remaining.get(color))
            .min()
            .unwrap_or(0);
        if units == 0 {
            continue;
        }
        for &color in ingredients {
            remaining.0[color as usize] -= units;
        }
        result.baked[recipe as usize] = units;
        result.points = result
            .points
            .saturating_add(u64::from(units).saturating_mul(scores.get(recipe)));
    }
    result
}

/// Extra points awarded per resolution pass, on top of recipe points.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LineBonus {
    #[default]
    None,
    /// `base × multipliers[lines - 1]`; passes clearing more lines than the
    /// table covers use the last multiplier.
    Table { base: u64, multipliers: Vec<u64> },
    /// Flat points per block turned Living.
    PerLivingBlock { points: u64 },
}

impl LineBonus {
    /// The classic 1/3/5/8 multiplier table.
    #[must_use]
    pub fn classic(base: u64) -> Self {
        Self::Table {
            base,
            multipliers: vec![1, 3, 5, 8],
        }
    }

    /// Computes the bonus for a pass that completed `lines` rows, activating
    /// `living_blocks` blocks.
    #[must_use]
    pub fn bonus(&self, lines: usize, living_blocks: usize) -> u64 {
        if lines == 0 {
            return 0;
        }
        match self {
            Self::None => 0,
            Self::Table { base, multipliers } => {
                let multiplier = multipliers
                    .get(lines - 1)
                    .or(multipliers.last())
                    .copied()
                    .unwrap_or(0);
                base.saturating_mul(multiplier)
            }
            Self::PerLivingBlock { points } => points.saturating_mul(living_blocks as u64),
        }
    }
}

/// Running score of a match.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub current: u64,
    pub target: u64,
    pub currency: u64,
}

impl ScoreState {
    #[must_use]
    pub fn new(target: u64) -> Self {
        Self {
            current: 0,
            target,
            currency: 0,
        }
    }

    /// Adds `points` to the score and `currency_percent`% of them to the
    /// currency. Returns the currency awarded.
    pub fn award(&mut self, points: u64, currency_percent: u32) -> u64 {
        let currency = points.saturating_mul(u64::from(currency_percent)) / 100;
        self.current = self.current.saturating_add(points);
        self.currency = self.currency.saturating_add(currency);
        currency
    }

    #[must_use]
    pub fn reached_target(&self) -> bool {
        self.current >= self.target
    }
}
