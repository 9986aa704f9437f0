//! Simulate command - random self-play statistics
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: compute_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use gridconquer_core::{GameRunner, Player, Rules};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SimulateArgs {
    /// Number of games to play
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Turn cap per game; capped games count as draws
    #[arg(long, default_value = "200")]
    pub max_turns: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the effective rules to this file
    #[arg(long, value_name = "FILE")]
    pub rules_out: Option<PathBuf>,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    game_number: usize,
    winner: Option<Player>,
    turns: u32,
    actions: usize,
}

/// Aggregated simulation results
#[derive(Clone, Debug, Serialize)]
struct SimulationResults {
    total_games: usize,
    player1_wins: usize,
    player2_wins: usize,
    draws: usize,
    avg_turns: f32,
    games: Vec<GameRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: SimulateArgs, rules: Rules, seed: Option<u64>) -> Result<()> {
    if let Some(path) = &args.rules_out {
        rules
            .save(path)
            .with_context(|| format!("Failed to write rules: {}", path.display()))?;
    }

    tracing::info!(
        "Starting simulation: {} games, max {} turns",
        args.games,
        args.max_turns
    );

    let results = play_games(rules, &args, seed)?;

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_games(rules: Rules, args: &SimulateArgs, seed: Option<u64>) -> Result<SimulationResults> {
    let base_seed = create_rng(seed).gen::<u64>();
    let mut runner = GameRunner::new(rules, args.max_turns, base_seed);
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        let outcome = runner
            .play_random()
            .with_context(|| format!("Game {} failed", game_num + 1))?;

        let record = GameRecord {
            game_number: game_num + 1,
            winner: outcome.winner,
            turns: outcome.turns,
            actions: outcome.actions.len(),
        };
        tracing::info!(
            "Game {}: {} ({} turns)",
            record.game_number,
            describe_winner(record.winner),
            record.turns
        );
        games.push(record);
    }

    Ok(compute_statistics(games))
}

fn report_results(results: &SimulationResults, args: &SimulateArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn compute_statistics(games: Vec<GameRecord>) -> SimulationResults {
    let wins = |player| games.iter().filter(|g| g.winner == Some(player)).count();
    let player1_wins = wins(Player::One);
    let player2_wins = wins(Player::Two);
    let draws = games.iter().filter(|g| g.winner.is_none()).count();

    let total_turns: u32 = games.iter().map(|g| g.turns).sum();
    let avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };

    SimulationResults {
        total_games: games.len(),
        player1_wins,
        player2_wins,
        draws,
        avg_turns,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn describe_winner(winner: Option<Player>) -> String {
    match winner {
        Some(player) => format!("player {player} wins"),
        None => "draw".to_string(),
    }
}

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_text_results(results: &SimulationResults) {
    let total = results.total_games;

    println!("\n=== Simulation Results ===");
    println!("Total games:    {}", total);
    println!(
        "Player 1 wins:  {} ({:.1}%)",
        results.player1_wins,
        percent(results.player1_wins, total)
    );
    println!(
        "Player 2 wins:  {} ({:.1}%)",
        results.player2_wins,
        percent(results.player2_wins, total)
    );
    println!(
        "Draws:          {} ({:.1}%)",
        results.draws,
        percent(results.draws, total)
    );
    println!("Avg turns:      {:.1}", results.avg_turns);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(game_number: usize, winner: Option<Player>, turns: u32) -> GameRecord {
        GameRecord {
            game_number,
            winner,
            turns,
            actions: turns as usize,
        }
    }

    fn args(games: usize) -> SimulateArgs {
        SimulateArgs {
            games,
            max_turns: 150,
            json: false,
            rules_out: None,
        }
    }

    #[test]
    fn test_compute_statistics_empty() {
        let results = compute_statistics(vec![]);
        assert_eq!(results.total_games, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_turns, 0.0);
    }

    #[test]
    fn test_compute_statistics() {
        let results = compute_statistics(vec![
            record(1, Some(Player::One), 10),
            record(2, Some(Player::Two), 20),
            record(3, None, 30),
            record(4, Some(Player::One), 40),
        ]);
        assert_eq!(results.player1_wins, 2);
        assert_eq!(results.player2_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_turns, 25.0);
    }

    #[test]
    fn test_play_games_deterministic() {
        let a = play_games(Rules::default(), &args(3), Some(42)).unwrap();
        let b = play_games(Rules::default(), &args(3), Some(42)).unwrap();
        assert_eq!(a.total_games, 3);
        let turns = |r: &SimulationResults| r.games.iter().map(|g| g.turns).collect::<Vec<_>>();
        assert_eq!(turns(&a), turns(&b));
        assert!(a.games.iter().all(|g| g.turns <= 150));
    }

    #[test]
    fn test_results_serialize() {
        let results = compute_statistics(vec![record(1, Some(Player::Two), 12)]);
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["player2_wins"], 1);
        assert_eq!(json["games"][0]["winner"], "Two");
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }
}
