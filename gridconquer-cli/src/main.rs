//! Grid Conquer CLI - Command-line interface
//!
//! Commands:
//! - play: Interactive terminal game
//! - simulate: Random self-play statistics

mod play_cmd;
mod render;
mod simulate_cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gridconquer_core::Rules;

#[derive(Parser)]
#[command(name = "gridconquer")]
#[command(about = "Grid Conquer two-player tactics game")]
struct Cli {
    /// Rules JSON file (defaults to the standard game)
    #[arg(long, global = true, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game in the terminal
    Play(play_cmd::PlayArgs),
    /// Play random games and report statistics
    Simulate(simulate_cmd::SimulateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let rules = load_rules(cli.rules.as_deref())?;

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, rules, cli.seed),
        Commands::Simulate(args) => simulate_cmd::run(args, rules, cli.seed),
    }
}

/// Initialize logging; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rules(path: Option<&std::path::Path>) -> Result<Rules> {
    match path {
        Some(path) => {
            let rules = Rules::load(path)
                .with_context(|| format!("Failed to load rules: {}", path.display()))?;
            tracing::info!(path = %path.display(), "loaded rules");
            Ok(rules)
        }
        None => Ok(Rules::default()),
    }
}
