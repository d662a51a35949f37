use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{bag::BagArg, replay::ReplayArg};

mod bag;
mod replay;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run a command script through the engine and print the final state
    Replay(#[clap(flatten)] ReplayArg),
    /// Print generated piece batches
    Bag(#[clap(flatten)] BagArg),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Replay(arg) => replay::run(&arg)?,
        Mode::Bag(arg) => bag::run(&arg)?,
    }
    Ok(())
}
