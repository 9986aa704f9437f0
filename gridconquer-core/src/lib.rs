//! Grid Conquer Core - Rules engine for a two-player grid tactics game
//!
//! This crate provides the authoritative game logic:
//! - Board geometry (square grid, coordinate labels, ray marching)
//! - Unit kinds, stats and per-unit legality
//! - Placement, turn protocol and crown-death win detection
//! - Legal-action enumeration for automated callers
//! - A policy interface with a seeded random policy and a game runner

pub mod board;
pub mod units;
pub mod ruleset;
pub mod game;
pub mod error;
pub mod actions;
pub mod policy;
pub mod runner;

#[cfg(test)]
mod test_support;

// Re-exports for convenient access
pub use board::{Direction, ParsePositionError, Position, BOARD_SIZE};
pub use units::{Unit, UnitKind, UnitStats, HEALER_HEAL_COST, HEAL_AMOUNT, PLACEMENT_ORDER, UNIT_STATS};
pub use ruleset::{Rules, RulesError, HOME_ROWS, MAX_HEAL};
pub use game::{Engine, GamePhase, Legality, Player, Selection};
pub use error::EngineError;
pub use actions::{Action, ActionKind, ActionRecord};
pub use policy::{Policy, RandomPolicy};
pub use runner::{GameOutcome, GameRunner};
