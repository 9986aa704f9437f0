//! Unit kinds, their stat table, and per-unit geometry and health bookkeeping

use crate::board::{ray, Direction, Position, ALL_DIRECTIONS, DIAGONAL, ORTHOGONAL};
use crate::game::Player;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// CONSTANTS
// ============================================================================

/// HP a heal gives its target
pub const HEAL_AMOUNT: i32 = 30;

/// HP a healer pays for each heal
pub const HEALER_HEAL_COST: i32 = 30;

/// Conventional placement order; the nth unit a player places is `PLACEMENT_ORDER[n]`
pub const PLACEMENT_ORDER: [UnitKind; 5] = [
    UnitKind::Soldier,
    UnitKind::Knight,
    UnitKind::Healer,
    UnitKind::Wall,
    UnitKind::Crown,
];

// ============================================================================
// UNIT KINDS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    Soldier,
    Knight,
    Healer,
    Wall,
    Crown,
}

/// Immutable base stats for a unit kind
#[derive(Clone, Debug)]
pub struct UnitStats {
    pub kind: UnitKind,
    pub name: &'static str,
    pub max_hp: i32,
    pub attack: i32,
    pub attack_range: u8,
    pub move_range: u8,
    pub symbol: &'static str,
    /// Fallback for terminals without emoji
    pub letter: char,
}

impl UnitStats {
    #[allow(clippy::too_many_arguments)]
    const fn new(
        kind: UnitKind,
        name: &'static str,
        max_hp: i32,
        attack: i32,
        attack_range: u8,
        move_range: u8,
        symbol: &'static str,
        letter: char,
    ) -> Self {
        Self {
            kind,
            name,
            max_hp,
            attack,
            attack_range,
            move_range,
            symbol,
            letter,
        }
    }
}

/// Stat table, indexed by `UnitKind as usize`
pub static UNIT_STATS: [UnitStats; 5] = [
    UnitStats::new(UnitKind::Soldier, "Soldier", 100, 50, 1, 1, "🪖", 'S'),
    UnitStats::new(UnitKind::Knight, "Knight", 150, 50, 1, 1, "🛡️", 'K'),
    UnitStats::new(UnitKind::Healer, "Healer", 170, 50, 1, 1, "🧙", 'H'),
    UnitStats::new(UnitKind::Wall, "Wall", 200, 0, 0, 0, "🧱", 'W'),
    UnitStats::new(UnitKind::Crown, "Crown", 500, 0, 0, 0, "👑", 'C'),
];

impl UnitKind {
    pub const ALL: [UnitKind; 5] = PLACEMENT_ORDER;

    pub fn stats(self) -> &'static UnitStats {
        &UNIT_STATS[self as usize]
    }

    /// Walls and crowns never move or act
    pub fn is_immobile(self) -> bool {
        matches!(self, UnitKind::Wall | UnitKind::Crown)
    }

    pub fn can_attack(self) -> bool {
        matches!(self, UnitKind::Soldier | UnitKind::Knight)
    }

    pub fn can_heal(self) -> bool {
        self == UnitKind::Healer
    }

    /// Movement (and attack) pattern
    pub fn directions(self) -> &'static [Direction] {
        match self {
            UnitKind::Soldier => &ORTHOGONAL,
            UnitKind::Knight => &DIAGONAL,
            UnitKind::Healer => &ALL_DIRECTIONS,
            UnitKind::Wall | UnitKind::Crown => &[],
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stats().name)
    }
}

// ============================================================================
// UNIT
// ============================================================================

/// One placed piece
///
/// `hp > 0` is the source of truth; `alive` is a cache recomputed by every
/// health mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Unit {
    kind: UnitKind,
    owner: Player,
    position: Position,
    hp: i32,
    max_hp: i32,
    alive: bool,
}

impl Unit {
    /// Create a unit at full health
    pub fn new(kind: UnitKind, owner: Player, position: Position) -> Self {
        let max_hp = kind.stats().max_hp;
        Self {
            kind,
            owner,
            position,
            hp: max_hp,
            max_hp,
            alive: true,
        }
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn owner(&self) -> Player {
        self.owner
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn symbol(&self) -> &'static str {
        self.kind.stats().symbol
    }

    pub fn attack_power(&self) -> i32 {
        self.kind.stats().attack
    }

    // ========================================================================
    // LEGALITY QUERIES
    // ========================================================================

    /// Empty squares reachable by ray-marching up to the move range
    ///
    /// Any occupied square (friend or foe) ends the ray and is not a target.
    pub fn valid_move_targets(
        &self,
        board_size: i8,
        occupied: &FxHashSet<Position>,
    ) -> BTreeSet<Position> {
        if !self.alive || self.kind.is_immobile() {
            return BTreeSet::new();
        }

        let range = self.kind.stats().move_range;
        move_ray_targets(self.position, self.kind.directions(), range, board_size, occupied)
    }

    /// The first occupied square on each ray within attack range, when it holds an enemy
    ///
    /// `occupied` decides where each ray stops; `enemies` decides whether the
    /// blocker can be hit. A friendly blocker shields everything behind it.
    pub fn valid_attack_targets(
        &self,
        board_size: i8,
        occupied: &FxHashSet<Position>,
        enemies: &FxHashSet<Position>,
    ) -> BTreeSet<Position> {
        if !self.alive || !self.kind.can_attack() {
            return BTreeSet::new();
        }

        let range = self.kind.stats().attack_range;
        attack_ray_targets(
            self.position,
            self.kind.directions(),
            range,
            board_size,
            occupied,
            enemies,
        )
    }

    /// Adjacent squares (all 8 directions, range fixed at 1) holding a friendly unit
    ///
    /// Full-health allies are included.
    pub fn valid_heal_targets(
        &self,
        board_size: i8,
        friendly: &FxHashSet<Position>,
    ) -> BTreeSet<Position> {
        if !self.alive || !self.kind.can_heal() {
            return BTreeSet::new();
        }

        ALL_DIRECTIONS
            .iter()
            .map(|&(dx, dy)| self.position.offset(dx, dy))
            .filter(|pos| pos.in_bounds(board_size) && friendly.contains(pos))
            .collect()
    }

    // ========================================================================
    // MUTATORS
    // ========================================================================

    /// Overwrite the position; the engine owns legality and the board key
    pub fn apply_move(&mut self, new_position: Position) {
        self.position = new_position;
    }

    /// Add `delta` HP, clamped to `[0, max_hp]`, and recompute `alive`
    pub fn apply_health_delta(&mut self, delta: i32) {
        self.hp = self.hp.saturating_add(delta).clamp(0, self.max_hp);
        self.alive = self.hp > 0;
    }

    pub fn apply_damage(&mut self, amount: i32) {
        self.apply_health_delta(-amount);
    }

    /// Healers pay `amount` from their own HP; every other kind gains it
    pub fn apply_heal_effect(&mut self, amount: i32) {
        if self.kind.can_heal() {
            self.apply_health_delta(-amount);
        } else {
            self.apply_health_delta(amount);
        }
    }
}

// ============================================================================
// RAY LEGALITY
// ============================================================================

/// Empty cells along each ray from `from`, up to `range` steps
///
/// A ray ends before the first occupied cell.
pub fn move_ray_targets(
    from: Position,
    directions: &[Direction],
    range: u8,
    board_size: i8,
    occupied: &FxHashSet<Position>,
) -> BTreeSet<Position> {
    directions
        .iter()
        .flat_map(move |&dir| {
            ray(from, dir, range, board_size).take_while(move |pos| !occupied.contains(pos))
        })
        .collect()
}

/// The first occupied cell of each ray within `range`, kept only when it is an enemy
pub fn attack_ray_targets(
    from: Position,
    directions: &[Direction],
    range: u8,
    board_size: i8,
    occupied: &FxHashSet<Position>,
    enemies: &FxHashSet<Position>,
) -> BTreeSet<Position> {
    directions
        .iter()
        .filter_map(|&dir| {
            ray(from, dir, range, board_size)
                .find(|pos| occupied.contains(pos) || enemies.contains(pos))
                .filter(|pos| enemies.contains(pos))
        })
        .collect()
}
