//! Game runner - drives a game between two policies
//!
//! Placement follows the roster convention, then the policies alternate
//! until a crown falls or the turn cap is reached.

use serde::Serialize;
use tracing::{debug, info};

use crate::actions::ActionRecord;
use crate::error::EngineError;
use crate::game::{Engine, GamePhase, Player};
use crate::policy::{Policy, RandomPolicy};
use crate::ruleset::Rules;

/// Outcome of a single game
#[derive(Clone, Debug, Serialize)]
pub struct GameOutcome {
    /// `None` when the turn cap was hit first
    pub winner: Option<Player>,
    /// Turns completed, passes included
    pub turns: u32,
    /// Applied actions in order
    pub actions: Vec<ActionRecord>,
}

impl GameOutcome {
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    pub fn wins_for(&self, player: Player) -> bool {
        self.winner == Some(player)
    }
}

/// Plays random-vs-random games under fixed rules
pub struct GameRunner {
    rules: Rules,
    max_turns: u32,
    /// Random seed counter
    seed_counter: u64,
}

impl GameRunner {
    pub fn new(rules: Rules, max_turns: u32, seed: u64) -> Self {
        Self {
            rules,
            max_turns,
            seed_counter: seed,
        }
    }

    /// Play one game with freshly seeded random policies on both sides
    pub fn play_random(&mut self) -> Result<GameOutcome, EngineError> {
        let engine = Engine::new(self.rules.clone())?;
        let mut one = RandomPolicy::new(self.next_seed());
        let mut two = RandomPolicy::new(self.next_seed());
        Self::play(engine, &mut one, &mut two, self.max_turns)
    }

    /// Drive `engine` to completion
    ///
    /// An engine still in placement is filled by the policies and started.
    /// A policy with nothing to do passes the turn. When moves leave the turn
    /// open, the runner closes it after the chosen action.
    pub fn play(
        mut engine: Engine,
        p1: &mut dyn Policy,
        p2: &mut dyn Policy,
        max_turns: u32,
    ) -> Result<GameOutcome, EngineError> {
        if engine.phase() == GamePhase::Placement {
            run_placement(&mut engine, p1, p2)?;
            engine.start_game()?;
        }

        let mut actions = Vec::new();
        while !engine.is_over() && engine.turn() < max_turns {
            let player = engine
                .current_player()
                .ok_or(EngineError::WrongPhase(engine.phase()))?;
            let policy: &mut dyn Policy = match player {
                Player::One => &mut *p1,
                Player::Two => &mut *p2,
            };

            let Some(action) = policy.choose_action(&engine, player) else {
                debug!(%player, "no action, passing");
                engine.end_turn()?;
                continue;
            };

            let turn = engine.turn();
            engine.apply_action(action)?;
            actions.push(ActionRecord {
                player,
                turn,
                action,
            });

            if engine.current_player() == Some(player) {
                engine.end_turn()?;
            }
        }

        info!(
            winner = ?engine.winner(),
            turns = engine.turn(),
            actions = actions.len(),
            "game finished"
        );
        Ok(GameOutcome {
            winner: engine.winner(),
            turns: engine.turn(),
            actions,
        })
    }

    /// Get next seed and increment counter
    fn next_seed(&mut self) -> u64 {
        let seed = self.seed_counter;
        self.seed_counter = self.seed_counter.wrapping_add(1);
        seed
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }
}

/// Place every roster slot, asking the owning player's policy for a square
///
/// Stops early if a policy declines; `start_game` then reports the shortfall.
fn run_placement(
    engine: &mut Engine,
    p1: &mut dyn Policy,
    p2: &mut dyn Policy,
) -> Result<(), EngineError> {
    while let Some((player, kind)) = engine.next_placement() {
        let policy: &mut dyn Policy = match player {
            Player::One => &mut *p1,
            Player::Two => &mut *p2,
        };
        let Some(square) = policy.choose_placement(engine, player, kind) else {
            debug!(%player, %kind, policy = policy.name(), "placement declined");
            return Ok(());
        };
        engine.place_unit(kind, square, player)?;
    }
    Ok(())
}
