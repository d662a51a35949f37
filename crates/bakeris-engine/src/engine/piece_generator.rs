use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{block::BlockColor, piece::PieceKind};

/// Kind and color of a piece that has not been materialized yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceTemplate {
    pub kind: PieceKind,
    pub color: BlockColor,
}

/// Generates pieces in color lanes, each lane being a shuffled 7-bag.
///
/// # Lane System
///
/// A batch is built from one lane per color:
///
/// 1. Each lane holds all 7 piece kinds exactly once, in its lane color
/// 2. Each lane is shuffled independently
/// 3. For every kind and every lane, the lane's entry of that kind trades its
///    color with the same-kind entry of another, randomly chosen lane
/// 4. The lanes are concatenated into a batch of 28 pieces
///
/// Step 3 only moves colors between entries of the same kind, so the kind
/// order inside every lane (and thus the 7-bag guarantee) is untouched, while
/// the color of an upcoming piece can no longer be inferred from its position.
///
/// # Example
///
/// ```
/// use bakeris_engine::PieceGenerator;
///
/// let mut generator = PieceGenerator::new();
/// let batch = generator.next_batch();
/// assert_eq!(batch.len(), PieceGenerator::BATCH_LEN);
/// ```
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    batches: u64,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// This is a 128-bit (16-byte) seed used to initialize the random number
/// generator for piece generation. Using the same seed will produce the same
/// sequence of pieces, enabling reproducible matches and command replays.
///
/// Serialized as a 32-character hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

impl PieceSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Parses a seed from 32 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        let _ = write!(&mut hex_str, "{num:032x}");
        hex_str
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `PieceSeed` values using the standard random distribution.
impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Kind order of one lane.
type Lane = [PieceKind; PieceKind::LEN];

impl PieceGenerator {
    /// Number of pieces in a lane.
    pub const LANE_LEN: usize = PieceKind::LEN;
    /// Number of lanes in a batch, one per color.
    pub const LANES: usize = BlockColor::LEN;
    /// Number of pieces in a batch.
    pub const BATCH_LEN: usize = Self::LANE_LEN * Self::LANES;

    /// Creates a generator with a random seed.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            batches: 0,
        }
    }

    /// Returns how many batches have been generated so far.
    #[must_use]
    pub fn batches_generated(&self) -> u64 {
        self.batches
    }

    /// Generates the next batch of [`Self::BATCH_LEN`] pieces.
    pub fn next_batch(&mut self) -> Vec<PieceTemplate> {
        let orders: [Lane; Self::LANES] = std::array::from_fn(|_| {
            let mut kinds = PieceKind::ALL;
            kinds.shuffle(&mut self.rng);
            kinds
        });
        // colors[lane][kind]: every entry starts in its lane's color
        let mut colors: [[BlockColor; PieceKind::LEN]; Self::LANES] =
            std::array::from_fn(|lane| [BlockColor::ALL[lane]; PieceKind::LEN]);

        for kind in PieceKind::ALL {
            for lane in 0..Self::LANES {
                let other = self.pick_other_lane(lane);
                let k = kind as usize;
                let color = colors[lane][k];
                colors[lane][k] = colors[other][k];
                colors[other][k] = color;
            }
        }

        self.batches += 1;
        orders
            .iter()
            .zip(&colors)
            .flat_map(|(order, colors)| {
                order.iter().map(move |&kind| PieceTemplate {
                    kind,
                    color: colors[kind as usize],
                })
            })
            .collect()
    }

    /// Picks a lane index uniformly among the lanes other than `lane`.
    fn pick_other_lane(&mut self, lane: usize) -> usize {
        let other = self.rng.random_range(0..Self::LANES - 1);
        if other >= lane { other + 1 } else { other }
    }
}
