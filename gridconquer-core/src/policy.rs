//! Policy interface for automated players

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::actions::Action;
use crate::board::Position;
use crate::game::{Engine, Player};
use crate::units::UnitKind;

/// Decision maker for one side of a game
///
/// Policies only read the engine; the runner applies what they choose.
/// Returning `None` from `choose_action` passes the turn.
pub trait Policy {
    fn name(&self) -> &str;

    /// Square for `player`'s next unit of `kind`, or `None` to give up placing
    fn choose_placement(&mut self, engine: &Engine, player: Player, kind: UnitKind)
        -> Option<Position>;

    fn choose_action(&mut self, engine: &Engine, player: Player) -> Option<Action>;
}

/// Picks uniformly among legal choices
pub struct RandomPolicy {
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_placement(
        &mut self,
        engine: &Engine,
        player: Player,
        _kind: UnitKind,
    ) -> Option<Position> {
        engine.valid_placements(player).choose(&mut self.rng).copied()
    }

    fn choose_action(&mut self, engine: &Engine, player: Player) -> Option<Action> {
        engine.legal_actions(player).choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pos, skirmish};

    #[test]
    fn test_random_placement_in_home_rows() {
        let engine = Engine::default();
        let mut policy = RandomPolicy::new(7);
        for _ in 0..20 {
            let square = policy
                .choose_placement(&engine, Player::Two, UnitKind::Wall)
                .unwrap();
            assert!(engine.check_placement(square, Player::Two).is_ok());
        }
    }

    #[test]
    fn test_random_action_is_legal() {
        let engine = skirmish(&[(UnitKind::Soldier, (3, 3))], &[(UnitKind::Soldier, (3, 4))]);
        let legal = engine.legal_actions(Player::One);
        let mut policy = RandomPolicy::new(1);
        for _ in 0..20 {
            let action = policy.choose_action(&engine, Player::One).unwrap();
            assert!(legal.contains(&action));
        }
    }

    #[test]
    fn test_no_choice_when_not_to_move() {
        let engine = skirmish(&[(UnitKind::Soldier, (3, 3))], &[]);
        let mut policy = RandomPolicy::new(1);
        assert_eq!(policy.choose_action(&engine, Player::Two), None);
        assert_eq!(engine.unit_at(pos(3, 3)).map(|u| u.hp()), Some(100));
    }

    #[test]
    fn test_same_seed_same_choices() {
        let engine = skirmish(
            &[(UnitKind::Soldier, (3, 3)), (UnitKind::Healer, (1, 1))],
            &[(UnitKind::Soldier, (3, 4))],
        );
        let mut a = RandomPolicy::new(99);
        let mut b = RandomPolicy::new(99);
        for _ in 0..10 {
            assert_eq!(
                a.choose_action(&engine, Player::One),
                b.choose_action(&engine, Player::One)
            );
        }
    }
}
