use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pool_shooter::common::tunables::Tunables;

/// Arcade shooter built around pooled entities.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// RON balance file overriding the built-in tunables.
    #[arg(long, value_name = "PATH")]
    balance: Option<PathBuf>,

    /// Seed for gameplay randomness (spawn jitter, fire rolls, drops).
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let tunables = match args.balance.as_deref().map(Tunables::load).transpose() {
        Ok(tunables) => tunables.unwrap_or_default(),
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    pool_shooter::game::run(tunables, args.seed);
    ExitCode::SUCCESS
}
