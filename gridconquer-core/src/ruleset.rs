//! Rules - per-game configuration

use crate::board::{BOARD_SIZE, MAX_BOARD_SIZE};
use crate::game::Player;
use crate::units::{UnitKind, HEALER_HEAL_COST, HEAL_AMOUNT, PLACEMENT_ORDER};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;

/// Default depth of each player's placement band
pub const HOME_ROWS: i8 = 3;

/// Upper bound for `heal_amount` and `heal_cost`, twice the largest unit's HP
pub const MAX_HEAL: i32 = 1000;

/// Rule parameters for one engine instance
///
/// The defaults are the standard game. Unit stats are fixed by the stat
/// table and are not configurable here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub board_size: i8,
    pub home_rows: i8,
    /// Units each player places, in the order callers conventionally place them
    pub roster: Vec<UnitKind>,
    pub heal_amount: i32,
    pub heal_cost: i32,
    /// When false a move leaves the turn open until `end_turn`
    pub move_ends_turn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    #[error("board size must be between 1 and 26, got {0}")]
    BoardSize(i8),

    #[error("home rows must be positive and fit twice on a {board_size}x{board_size} board, got {home_rows}")]
    HomeRows { board_size: i8, home_rows: i8 },

    #[error("roster is empty")]
    EmptyRoster,

    #[error("roster has no crown, the game could never be won")]
    NoCrown,

    #[error("roster of {roster} units does not fit in {cells} home squares")]
    RosterTooLarge { roster: usize, cells: usize },

    #[error("heal amount and cost must be between 0 and 1000, got {heal_amount} and {heal_cost}")]
    HealOutOfRange { heal_amount: i32, heal_cost: i32 },
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            board_size: BOARD_SIZE,
            home_rows: HOME_ROWS,
            roster: PLACEMENT_ORDER.to_vec(),
            heal_amount: HEAL_AMOUNT,
            heal_cost: HEALER_HEAL_COST,
            move_ends_turn: true,
        }
    }
}

impl Rules {
    /// Check that the rules describe a playable game
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(1..=MAX_BOARD_SIZE).contains(&self.board_size) {
            return Err(RulesError::BoardSize(self.board_size));
        }
        if self.home_rows <= 0 || self.home_rows as i16 * 2 > self.board_size as i16 {
            return Err(RulesError::HomeRows {
                board_size: self.board_size,
                home_rows: self.home_rows,
            });
        }
        if self.roster.is_empty() {
            return Err(RulesError::EmptyRoster);
        }
        if !self.roster.contains(&UnitKind::Crown) {
            return Err(RulesError::NoCrown);
        }
        let cells = self.home_rows as usize * self.board_size as usize;
        if self.roster.len() > cells {
            return Err(RulesError::RosterTooLarge {
                roster: self.roster.len(),
                cells,
            });
        }
        let heal_range = 0..=MAX_HEAL;
        if !heal_range.contains(&self.heal_amount) || !heal_range.contains(&self.heal_cost) {
            return Err(RulesError::HealOutOfRange {
                heal_amount: self.heal_amount,
                heal_cost: self.heal_cost,
            });
        }
        Ok(())
    }

    /// Rows a player may place into
    ///
    /// Player 1 owns the top band `[0, home_rows)`, player 2 the bottom band
    /// `[board_size - home_rows, board_size)`.
    pub fn home_rows(&self, player: Player) -> Range<i8> {
        match player {
            Player::One => 0..self.home_rows,
            Player::Two => (self.board_size - self.home_rows)..self.board_size,
        }
    }

    /// The kind conventionally placed as a player's nth unit
    pub fn kind_for_slot(&self, placed: usize) -> Option<UnitKind> {
        self.roster.get(placed).copied()
    }

    pub fn roster_size(&self) -> usize {
        self.roster.len()
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {}", path.display()))?;
        let rules: Rules = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rules file: {}", path.display()))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
