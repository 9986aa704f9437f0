//! Engine error types
//!
//! Every variant is a recoverable rejection: the operation that returned it
//! left the engine untouched.

use crate::actions::ActionKind;
use crate::board::Position;
use crate::game::{GamePhase, Player};
use crate::ruleset::RulesError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("not allowed during {0}")]
    WrongPhase(GamePhase),

    #[error("{0} is off the board")]
    OffBoard(Position),

    #[error("{position} is outside player {player}'s home rows")]
    OutsideHomeRows { position: Position, player: Player },

    #[error("{0} is already occupied")]
    Occupied(Position),

    #[error("player {player} has placed {placed} of {required} units")]
    IncompleteRoster {
        player: Player,
        placed: usize,
        required: usize,
    },

    #[error("no living unit at {0}")]
    NoUnit(Position),

    #[error("unit at {position} does not belong to player {player}")]
    NotOwned { position: Position, player: Player },

    #[error("no unit selected")]
    NoSelection,

    #[error("cannot {kind} {target}")]
    IllegalTarget { kind: ActionKind, target: Position },

    #[error(transparent)]
    Rules(#[from] RulesError),
}
