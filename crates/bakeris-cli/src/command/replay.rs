use std::path::PathBuf;

use anyhow::Context as _;
use bakeris_engine::{Command, EngineEvent, Game, GameSnapshot, PieceSeed, StepOutcome};
use serde::Serialize;
use tracing::{info, warn};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub struct ReplayArg {
    /// Path to the command script (JSON array of commands)
    commands_file: PathBuf,
    /// Engine configuration file (JSON). Defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Piece generator seed (32 hex characters). Overrides the seed of the
    /// script's leading `start_game`
    #[arg(long, value_parser = util::parse_seed)]
    seed: Option<PieceSeed>,
    /// Include every engine event in the report
    #[arg(long)]
    events: bool,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ReplayReport {
    applied: usize,
    rejected: usize,
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    events: Option<Vec<EngineEvent>>,
    snapshot: GameSnapshot,
}

pub fn run(arg: &ReplayArg) -> anyhow::Result<()> {
    let ReplayArg {
        commands_file,
        config,
        seed,
        events: record_events,
        output,
    } = arg;

    let config = util::load_config(config.as_deref())?;
    let script: Vec<Command> = util::read_json_file("command script", commands_file)?;
    let commands = with_start_command(script, *seed);
    info!(commands = commands.len(), "loaded command script");

    let mut game = Game::new(config).context("Failed to create game")?;
    for command in commands {
        game.submit(command);
    }
    let report = replay(&mut game, *record_events);
    Output::save_json(&report, output.clone())?;
    Ok(())
}

/// Makes sure the script opens with `StartGame`, carrying `seed` if one is given.
fn with_start_command(mut commands: Vec<Command>, seed: Option<PieceSeed>) -> Vec<Command> {
    match commands.first_mut() {
        Some(Command::StartGame(script_seed)) => {
            if let Some(seed) = seed {
                if script_seed.is_some_and(|s| s != seed) {
                    warn!(
                        seed = %seed.to_hex(),
                        "--seed overrides the seed of the script's start_game"
                    );
                }
                *script_seed = Some(seed);
            }
        }
        _ => commands.insert(0, Command::StartGame(seed)),
    }
    commands
}

fn replay(game: &mut Game, record_events: bool) -> ReplayReport {
    let mut applied = 0;
    let mut rejected = 0;
    let mut events = Vec::new();
    let mut error = None;
    loop {
        let outcome = game.step();
        if record_events {
            events.extend(game.drain_events());
        }
        match outcome {
            Ok(StepOutcome::Idle) => break,
            Ok(StepOutcome::Applied(_)) => applied += 1,
            Ok(StepOutcome::Rejected(_)) => rejected += 1,
            Err(err) => {
                warn!(%err, "replay stopped by engine error");
                error = Some(err.to_string());
                break;
            }
        }
    }
    info!(applied, rejected, state = ?game.state(), "replay finished");

    ReplayReport {
        applied,
        rejected,
        error,
        events: record_events.then_some(events),
        snapshot: game.snapshot(),
    }
}
