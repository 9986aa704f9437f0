//! Structured actions and legal-action enumeration for automated callers

use crate::board::Position;
use crate::error::EngineError;
use crate::game::{Engine, Player};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Move,
    Attack,
    Heal,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Move, ActionKind::Attack, ActionKind::Heal];
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Move => f.write_str("move to"),
            ActionKind::Attack => f.write_str("attack"),
            ActionKind::Heal => f.write_str("heal"),
        }
    }
}

/// One unit performing one action on one square
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Action {
    pub unit: Position,
    pub kind: ActionKind,
    pub target: Position,
}

impl Action {
    pub fn new(unit: Position, kind: ActionKind, target: Position) -> Self {
        Self { unit, kind, target }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.unit, self.kind, self.target)
    }
}

/// An applied action with the player and turn it happened on
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub player: Player,
    pub turn: u32,
    pub action: Action,
}

impl Engine {
    /// Every action `player` could take right now
    ///
    /// Does not touch the selection. Empty unless it is `player`'s turn.
    /// Sorted by unit, then kind, then target.
    pub fn legal_actions(&self, player: Player) -> Vec<Action> {
        if self.current_player() != Some(player) {
            return Vec::new();
        }

        let mut actions = Vec::new();
        for unit in self.units_of(player) {
            let Some(legality) = self.legality_for(unit.position()) else {
                continue;
            };
            for kind in ActionKind::ALL {
                actions.extend(
                    legality
                        .targets(kind)
                        .iter()
                        .map(|&target| Action::new(unit.position(), kind, target)),
                );
            }
        }
        actions
    }

    /// Select `action.unit` and perform the action
    ///
    /// The whole triple is validated before anything changes, so a rejected
    /// action leaves the previous selection in place.
    pub fn apply_action(&mut self, action: Action) -> Result<(), EngineError> {
        let player = self
            .current_player()
            .ok_or(EngineError::WrongPhase(self.phase()))?;
        let unit = self
            .unit_at(action.unit)
            .filter(|u| u.is_alive())
            .ok_or(EngineError::NoUnit(action.unit))?;
        if unit.owner() != player {
            return Err(EngineError::NotOwned {
                position: action.unit,
                player,
            });
        }
        let legal = self
            .legality_for(action.unit)
            .is_some_and(|l| l.contains(action.kind, action.target));
        if !legal {
            return Err(EngineError::IllegalTarget {
                kind: action.kind,
                target: action.target,
            });
        }

        self.select_unit(action.unit)?;
        match action.kind {
            ActionKind::Move => self.move_unit(action.target),
            ActionKind::Attack => self.attack_unit(action.target),
            ActionKind::Heal => self.heal_unit(action.target),
        }
    }
}
