use std::path::PathBuf;

use bakeris_engine::{PieceGenerator, PieceSeed, PieceTemplate};
use rand::Rng as _;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub struct BagArg {
    /// Piece generator seed (32 hex characters). Random when omitted
    #[arg(long, value_parser = util::parse_seed)]
    seed: Option<PieceSeed>,
    /// Number of batches to generate
    #[arg(long, default_value_t = 1)]
    batches: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BagReport {
    seed: PieceSeed,
    batches: Vec<Batch>,
}

#[derive(Debug, Serialize)]
struct Batch {
    /// Compact form, one `<kind><color>` pair per piece (e.g. `TD` for a Dough T).
    sequence: String,
    pieces: Vec<PieceTemplate>,
}

pub fn run(arg: &BagArg) -> anyhow::Result<()> {
    let BagArg {
        seed,
        batches,
        output,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let mut generator = PieceGenerator::with_seed(seed);
    let batches = (0..*batches)
        .map(|_| {
            let pieces = generator.next_batch();
            let sequence = pieces
                .iter()
                .map(|t| format!("{}{}", t.kind.as_char(), t.color.as_char()))
                .collect::<Vec<_>>()
                .join(" ");
            Batch { sequence, pieces }
        })
        .collect();

    Output::save_json(&BagReport { seed, batches }, output.clone())?;
    Ok(())
}
