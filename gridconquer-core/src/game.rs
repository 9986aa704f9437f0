//! Game engine: placement, turn protocol and win detection

use crate::actions::ActionKind;
use crate::board::Position;
use crate::error::EngineError;
use crate::ruleset::{Rules, RulesError};
use crate::units::{Unit, UnitKind};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info};

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// The turn phase in which this player acts
    pub fn turn_phase(self) -> GamePhase {
        match self {
            Player::One => GamePhase::Player1Turn,
            Player::Two => GamePhase::Player2Turn,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    Placement,
    Player1Turn,
    Player2Turn,
    GameOver,
}

impl GamePhase {
    /// The player whose turn it is, if any
    pub fn active_player(self) -> Option<Player> {
        match self {
            GamePhase::Player1Turn => Some(Player::One),
            GamePhase::Player2Turn => Some(Player::Two),
            GamePhase::Placement | GamePhase::GameOver => None,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GamePhase::Placement => f.write_str("placement"),
            GamePhase::Player1Turn => f.write_str("player 1's turn"),
            GamePhase::Player2Turn => f.write_str("player 2's turn"),
            GamePhase::GameOver => f.write_str("game over"),
        }
    }
}

/// Squares a unit may currently move to, attack or heal
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Legality {
    pub moves: BTreeSet<Position>,
    pub attacks: BTreeSet<Position>,
    pub heals: BTreeSet<Position>,
}

impl Legality {
    pub fn targets(&self, kind: ActionKind) -> &BTreeSet<Position> {
        match kind {
            ActionKind::Move => &self.moves,
            ActionKind::Attack => &self.attacks,
            ActionKind::Heal => &self.heals,
        }
    }

    pub fn contains(&self, kind: ActionKind, target: Position) -> bool {
        self.targets(kind).contains(&target)
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.attacks.is_empty() && self.heals.is_empty()
    }
}

/// The selected unit and its cached legality sets
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub unit: Position,
    pub legality: Legality,
}

// ============================================================================
// ENGINE
// ============================================================================

/// Authoritative game state (clone to branch)
///
/// The engine is the only mutator of the board. Every operation either
/// applies completely and returns `Ok`, or returns an `EngineError` having
/// changed nothing.
#[derive(Clone, Debug)]
pub struct Engine {
    rules: Rules,

    /// Board: position -> unit (sparse representation)
    board: FxHashMap<Position, Unit>,

    phase: GamePhase,

    /// Turn context, cleared whenever the turn changes
    selection: Option<Selection>,

    winner: Option<Player>,

    /// Completed turns since `start_game`
    turn: u32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_rules(Rules::default())
    }
}

impl Engine {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    pub fn new(rules: Rules) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self::with_rules(rules))
    }

    /// Start mid-game from an arranged position with `to_move` acting first
    ///
    /// Units start at full health and may stand anywhere on the board; home
    /// rows and roster counts are not checked. Win detection runs at once, so
    /// a side without a crown has already lost.
    pub fn from_position(
        rules: Rules,
        units: &[(UnitKind, Player, Position)],
        to_move: Player,
    ) -> Result<Self, EngineError> {
        let mut engine = Self::new(rules)?;
        for &(kind, owner, position) in units {
            if !position.in_bounds(engine.rules.board_size) {
                return Err(EngineError::OffBoard(position));
            }
            if engine.board.contains_key(&position) {
                return Err(EngineError::Occupied(position));
            }
            engine.board.insert(position, Unit::new(kind, owner, position));
        }
        engine.phase = to_move.turn_phase();
        engine.check_game_over();
        Ok(engine)
    }

    fn with_rules(rules: Rules) -> Self {
        Self {
            rules,
            board: FxHashMap::default(),
            phase: GamePhase::Placement,
            selection: None,
            winner: None,
            turn: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board_size(&self) -> i8 {
        self.rules.board_size
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn current_player(&self) -> Option<Player> {
        self.phase.active_player()
    }

    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        self.selection.as_ref().and_then(|s| self.board.get(&s.unit))
    }

    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        self.board.get(&position)
    }

    /// All units on the board, in row-major position order
    pub fn all_units(&self) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.board.values().collect();
        units.sort_by_key(|u| u.position());
        units
    }

    pub fn units_of(&self, player: Player) -> Vec<&Unit> {
        let mut units = self.all_units();
        units.retain(|u| u.owner() == player);
        units
    }

    pub fn placed_count(&self, player: Player) -> usize {
        self.board.values().filter(|u| u.owner() == player).count()
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Rows a player may place into
    pub fn home_rows(&self, player: Player) -> std::ops::Range<i8> {
        self.rules.home_rows(player)
    }

    /// Check whether `player` may place a unit at `position` right now
    pub fn check_placement(&self, position: Position, player: Player) -> Result<(), EngineError> {
        if self.phase != GamePhase::Placement {
            return Err(EngineError::WrongPhase(self.phase));
        }
        if !position.in_bounds(self.rules.board_size) {
            return Err(EngineError::OffBoard(position));
        }
        if !self.home_rows(player).contains(&position.y) {
            return Err(EngineError::OutsideHomeRows { position, player });
        }
        if self.board.contains_key(&position) {
            return Err(EngineError::Occupied(position));
        }
        Ok(())
    }

    /// Empty home-row squares, in row-major order
    pub fn valid_placements(&self, player: Player) -> Vec<Position> {
        let size = self.rules.board_size;
        self.home_rows(player)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .filter(|&pos| self.check_placement(pos, player).is_ok())
            .collect()
    }

    /// The placement the roster convention expects next
    ///
    /// Players alternate starting with player 1, each walking the roster in
    /// order. Advisory only: `place_unit` accepts any kind.
    pub fn next_placement(&self) -> Option<(Player, UnitKind)> {
        if self.phase != GamePhase::Placement {
            return None;
        }

        let one = self.placed_count(Player::One);
        let two = self.placed_count(Player::Two);
        let (player, placed) = if one <= two {
            (Player::One, one)
        } else {
            (Player::Two, two)
        };
        self.rules.kind_for_slot(placed).map(|kind| (player, kind))
    }

    pub fn place_unit(
        &mut self,
        kind: UnitKind,
        position: Position,
        player: Player,
    ) -> Result<(), EngineError> {
        self.check_placement(position, player)?;

        self.board.insert(position, Unit::new(kind, player, position));
        debug!(%kind, %position, %player, "unit placed");
        Ok(())
    }

    /// Leave placement once both players have placed a full roster
    pub fn start_game(&mut self) -> Result<(), EngineError> {
        if self.phase != GamePhase::Placement {
            return Err(EngineError::WrongPhase(self.phase));
        }

        let required = self.rules.roster_size();
        for player in Player::ALL {
            let placed = self.placed_count(player);
            if placed != required {
                return Err(EngineError::IncompleteRoster {
                    player,
                    placed,
                    required,
                });
            }
        }

        self.phase = GamePhase::Player1Turn;
        info!(units = self.board.len(), "game started");
        Ok(())
    }

    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Legality sets for the living unit at `position`, without selecting it
    ///
    /// Enemies and friends are judged from that unit's owner's point of view.
    pub fn legality_for(&self, position: Position) -> Option<Legality> {
        let unit = self.board.get(&position).filter(|u| u.is_alive())?;
        let owner = unit.owner();
        let size = self.rules.board_size;

        let occupied: FxHashSet<Position> = self.board.keys().copied().collect();
        let (friendly, enemies): (FxHashSet<Position>, FxHashSet<Position>) = self
            .board
            .iter()
            .filter(|(_, u)| u.is_alive())
            .map(|(&pos, u)| (pos, u.owner()))
            .fold(Default::default(), |(mut friendly, mut enemies), (pos, o)| {
                if o == owner {
                    friendly.insert(pos);
                } else {
                    enemies.insert(pos);
                }
                (friendly, enemies)
            });

        Some(Legality {
            moves: unit.valid_move_targets(size, &occupied),
            attacks: unit.valid_attack_targets(size, &occupied, &enemies),
            heals: unit.valid_heal_targets(size, &friendly),
        })
    }

    // ========================================================================
    // TURN PROTOCOL
    // ========================================================================

    fn require_turn(&self) -> Result<Player, EngineError> {
        self.phase
            .active_player()
            .ok_or(EngineError::WrongPhase(self.phase))
    }

    /// Select one of the active player's living units
    ///
    /// On failure the previous selection is kept.
    pub fn select_unit(&mut self, position: Position) -> Result<&Selection, EngineError> {
        let player = self.require_turn()?;

        let unit = self
            .board
            .get(&position)
            .filter(|u| u.is_alive())
            .ok_or(EngineError::NoUnit(position))?;
        if unit.owner() != player {
            return Err(EngineError::NotOwned { position, player });
        }

        let legality = self.legality_for(position).ok_or(EngineError::NoUnit(position))?;
        debug!(%position, %player, "unit selected");
        Ok(&*self.selection.insert(Selection {
            unit: position,
            legality,
        }))
    }

    /// Deselect without ending the turn
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn move_unit(&mut self, target: Position) -> Result<(), EngineError> {
        let from = self.selected_for(ActionKind::Move, target)?;

        let mut unit = self.board.remove(&from).ok_or(EngineError::NoUnit(from))?;
        unit.apply_move(target);
        self.board.insert(target, unit);
        debug!(%from, to = %target, "unit moved");

        if self.rules.move_ends_turn {
            self.finish_turn();
        } else {
            self.selection = self.legality_for(target).map(|legality| Selection {
                unit: target,
                legality,
            });
        }
        Ok(())
    }

    pub fn attack_unit(&mut self, target: Position) -> Result<(), EngineError> {
        let attacker = self.selected_for(ActionKind::Attack, target)?;

        let damage = self
            .board
            .get(&attacker)
            .map(Unit::attack_power)
            .ok_or(EngineError::NoUnit(attacker))?;
        let victim = self
            .board
            .get_mut(&target)
            .ok_or(EngineError::NoUnit(target))?;
        victim.apply_damage(damage);
        debug!(%attacker, %target, damage, hp = victim.hp(), "unit attacked");

        self.sweep_dead();
        self.finish_turn();
        Ok(())
    }

    /// Heal an adjacent ally; the healer pays the heal cost from its own HP
    pub fn heal_unit(&mut self, target: Position) -> Result<(), EngineError> {
        let healer = self.selected_for(ActionKind::Heal, target)?;
        if !self.board.contains_key(&healer) {
            return Err(EngineError::NoUnit(healer));
        }

        let (amount, cost) = (self.rules.heal_amount, self.rules.heal_cost);
        let patient = self
            .board
            .get_mut(&target)
            .ok_or(EngineError::NoUnit(target))?;
        patient.apply_heal_effect(amount);
        let healer_unit = self
            .board
            .get_mut(&healer)
            .ok_or(EngineError::NoUnit(healer))?;
        healer_unit.apply_heal_effect(cost);
        debug!(%healer, %target, healer_hp = healer_unit.hp(), "unit healed");

        self.sweep_dead();
        self.finish_turn();
        Ok(())
    }

    /// Pass the turn to the other player
    pub fn end_turn(&mut self) -> Result<(), EngineError> {
        self.require_turn()?;
        self.finish_turn();
        Ok(())
    }

    /// Selected unit's position, provided `target` is in the requested legality set
    fn selected_for(&self, kind: ActionKind, target: Position) -> Result<Position, EngineError> {
        self.require_turn()?;
        let selection = self.selection.as_ref().ok_or(EngineError::NoSelection)?;
        if !selection.legality.targets(kind).contains(&target) {
            return Err(EngineError::IllegalTarget { kind, target });
        }
        Ok(selection.unit)
    }

    /// Remove every dead unit from the board
    fn sweep_dead(&mut self) {
        let dead: Vec<Position> = self
            .board
            .iter()
            .filter(|(_, u)| !u.is_alive())
            .map(|(&pos, _)| pos)
            .collect();

        for pos in dead {
            if let Some(unit) = self.board.remove(&pos) {
                info!(kind = %unit.kind(), owner = %unit.owner(), position = %pos, "unit destroyed");
            }
        }
    }

    fn finish_turn(&mut self) {
        self.selection = None;
        self.turn += 1;
        self.phase = match self.phase {
            GamePhase::Player1Turn => GamePhase::Player2Turn,
            _ => GamePhase::Player1Turn,
        };
        self.check_game_over();
    }

    // ========================================================================
    // WIN DETECTION
    // ========================================================================

    fn has_living_crown(&self, player: Player) -> bool {
        self.board
            .values()
            .any(|u| u.owner() == player && u.kind() == UnitKind::Crown && u.is_alive())
    }

    /// Player 1's crown is checked first, so losing both crowns at once hands the win to player 2
    fn check_game_over(&mut self) {
        let winner = if !self.has_living_crown(Player::One) {
            Some(Player::Two)
        } else if !self.has_living_crown(Player::Two) {
            Some(Player::One)
        } else {
            None
        };

        if let Some(winner) = winner {
            self.phase = GamePhase::GameOver;
            self.winner = Some(winner);
            self.selection = None;
            info!(%winner, turns = self.turn, "game over");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{placed_game, pos, skirmish, skirmish_with};

    #[test]
    fn test_standard_setup_starts() {
        let mut engine = placed_game();
        assert_eq!(engine.phase(), GamePhase::Placement);
        assert_eq!(engine.next_placement(), None);
        assert_eq!(
            engine.unit_at(pos(4, 0)).map(|u| u.kind()),
            Some(UnitKind::Crown)
        );

        engine.start_game().unwrap();
        assert_eq!(engine.phase(), GamePhase::Player1Turn);
        assert_eq!(engine.current_player(), Some(Player::One));
    }

    #[test]
    fn test_start_requires_full_rosters() {
        let mut engine = Engine::default();
        engine.place_unit(UnitKind::Soldier, pos(0, 0), Player::One).unwrap();
        assert_eq!(
            engine.start_game(),
            Err(EngineError::IncompleteRoster {
                player: Player::One,
                placed: 1,
                required: 5
            })
        );
        assert_eq!(engine.phase(), GamePhase::Placement);
    }

    #[test]
    fn test_start_rejects_overfull_roster() {
        let mut engine = placed_game();
        engine.place_unit(UnitKind::Soldier, pos(0, 1), Player::One).unwrap();
        assert!(matches!(
            engine.start_game(),
            Err(EngineError::IncompleteRoster { placed: 6, .. })
        ));
    }

    #[test]
    fn test_placement_rejections() {
        let mut engine = Engine::default();
        assert_eq!(
            engine.place_unit(UnitKind::Soldier, pos(0, 3), Player::One),
            Err(EngineError::OutsideHomeRows {
                position: pos(0, 3),
                player: Player::One
            })
        );
        assert!(engine.place_unit(UnitKind::Soldier, pos(0, 4), Player::Two).is_err());
        assert_eq!(
            engine.place_unit(UnitKind::Soldier, pos(8, 0), Player::One),
            Err(EngineError::OffBoard(pos(8, 0)))
        );

        engine.place_unit(UnitKind::Soldier, pos(0, 0), Player::One).unwrap();
        assert_eq!(
            engine.place_unit(UnitKind::Knight, pos(0, 0), Player::One),
            Err(EngineError::Occupied(pos(0, 0)))
        );
        assert_eq!(engine.placed_count(Player::One), 1);
    }

    #[test]
    fn test_no_placement_after_start() {
        let mut engine = placed_game();
        engine.start_game().unwrap();
        assert_eq!(
            engine.place_unit(UnitKind::Soldier, pos(5, 1), Player::One),
            Err(EngineError::WrongPhase(GamePhase::Player1Turn))
        );
        assert!(engine.start_game().is_err());
    }

    #[test]
    fn test_next_placement_alternates() {
        let mut engine = Engine::default();
        assert_eq!(engine.next_placement(), Some((Player::One, UnitKind::Soldier)));
        engine.place_unit(UnitKind::Soldier, pos(0, 0), Player::One).unwrap();
        assert_eq!(engine.next_placement(), Some((Player::Two, UnitKind::Soldier)));
        engine.place_unit(UnitKind::Soldier, pos(0, 7), Player::Two).unwrap();
        assert_eq!(engine.next_placement(), Some((Player::One, UnitKind::Knight)));
    }

    #[test]
    fn test_valid_placements() {
        let mut engine = Engine::default();
        assert_eq!(engine.valid_placements(Player::Two).len(), 24);
        engine.place_unit(UnitKind::Wall, pos(3, 6), Player::Two).unwrap();
        let cells = engine.valid_placements(Player::Two);
        assert_eq!(cells.len(), 23);
        assert!(cells.iter().all(|p| (5..8).contains(&p.y)));
        assert!(!cells.contains(&pos(3, 6)));
    }

    #[test]
    fn test_select_rules() {
        let mut engine = skirmish(&[(UnitKind::Soldier, (3, 3))], &[(UnitKind::Soldier, (3, 4))]);
        assert_eq!(engine.select_unit(pos(5, 5)), Err(EngineError::NoUnit(pos(5, 5))));
        assert_eq!(
            engine.select_unit(pos(3, 4)),
            Err(EngineError::NotOwned {
                position: pos(3, 4),
                player: Player::One
            })
        );
        assert!(engine.selection().is_none());

        let selection = engine.select_unit(pos(3, 3)).unwrap();
        assert_eq!(selection.unit, pos(3, 3));
        assert_eq!(engine.selected_unit().map(|u| u.kind()), Some(UnitKind::Soldier));
    }

    #[test]
    fn test_soldier_in_corner_moves() {
        let mut engine = skirmish(&[(UnitKind::Soldier, (0, 0))], &[]);
        let selection = engine.select_unit(pos(0, 0)).unwrap();
        let expected: BTreeSet<_> = [pos(1, 0), pos(0, 1)].into_iter().collect();
        assert_eq!(selection.legality.moves, expected);
        assert!(selection.legality.attacks.is_empty());
    }

    #[test]
    fn test_knight_attack_scenario() {
        let mut engine = skirmish(&[(UnitKind::Knight, (3, 3))], &[(UnitKind::Soldier, (4, 4))]);
        let selection = engine.select_unit(pos(3, 3)).unwrap();
        let expected: BTreeSet<_> = [pos(4, 4)].into_iter().collect();
        assert_eq!(selection.legality.attacks, expected);
        assert!(!selection.legality.moves.contains(&pos(4, 4)));
    }

    #[test]
    fn test_actions_require_selection() {
        let mut engine = skirmish(&[(UnitKind::Soldier, (3, 3))], &[(UnitKind::Soldier, (3, 4))]);
        assert_eq!(engine.move_unit(pos(2, 3)), Err(EngineError::NoSelection));
        assert_eq!(engine.attack_unit(pos(3, 4)), Err(EngineError::NoSelection));

        engine.select_unit(pos(3, 3)).unwrap();
        assert_eq!(
            engine.move_unit(pos(3, 4)),
            Err(EngineError::IllegalTarget {
                kind: ActionKind::Move,
                target: pos(3, 4)
            })
        );
        assert!(engine.heal_unit(pos(3, 4)).is_err());
        assert_eq!(engine.phase(), GamePhase::Player1Turn);
        assert!(engine.selection().is_some());
    }

    #[test]
    fn test_move_ends_turn_by_default() {
        let mut engine = skirmish(&[(UnitKind::Soldier, (3, 3))], &[(UnitKind::Soldier, (5, 5))]);
        engine.select_unit(pos(3, 3)).unwrap();
        engine.move_unit(pos(3, 2)).unwrap();

        assert!(engine.unit_at(pos(3, 3)).is_none());
        assert_eq!(engine.unit_at(pos(3, 2)).map(|u| u.position()), Some(pos(3, 2)));
        assert_eq!(engine.phase(), GamePhase::Player2Turn);
        assert!(engine.selection().is_none());
        assert_eq!(engine.turn(), 1);
    }

    #[test]
    fn test_move_keeps_turn_open_when_configured() {
        let rules = Rules { move_ends_turn: false, ..Default::default() };
        let mut engine = skirmish_with(rules, &[(UnitKind::Soldier, (3, 2))], &[(UnitKind::Soldier, (3, 4))]);
        engine.select_unit(pos(3, 2)).unwrap();
        engine.move_unit(pos(3, 3)).unwrap();

        assert_eq!(engine.phase(), GamePhase::Player1Turn);
        let selection = engine.selection().unwrap();
        assert_eq!(selection.unit, pos(3, 3));
        assert!(selection.legality.attacks.contains(&pos(3, 4)));

        engine.attack_unit(pos(3, 4)).unwrap();
        assert_eq!(engine.phase(), GamePhase::Player2Turn);
    }

    #[test]
    fn test_wall_destroyed_after_four_attacks() {
        let mut engine = skirmish(&[(UnitKind::Soldier, (3, 3))], &[(UnitKind::Wall, (3, 4))]);
        for round in 1..=4 {
            engine.select_unit(pos(3, 3)).unwrap();
            engine.attack_unit(pos(3, 4)).unwrap();
            if round < 4 {
                assert_eq!(engine.unit_at(pos(3, 4)).map(|u| u.hp()), Some(200 - 50 * round));
                engine.end_turn().unwrap();
            }
        }
        assert!(engine.unit_at(pos(3, 4)).is_none());
        assert!(!engine.is_over());
    }

    #[test]
    fn test_heal_full_health_ally() {
        let mut engine = skirmish(&[(UnitKind::Healer, (2, 2)), (UnitKind::Knight, (2, 3))], &[]);
        let selection = engine.select_unit(pos(2, 2)).unwrap();
        assert!(selection.legality.heals.contains(&pos(2, 3)));

        engine.heal_unit(pos(2, 3)).unwrap();
        assert_eq!(engine.unit_at(pos(2, 3)).map(|u| u.hp()), Some(150));
        let healer = engine.unit_at(pos(2, 2)).unwrap();
        assert_eq!(healer.hp(), 140);
        assert!(healer.is_alive());
        assert_eq!(engine.phase(), GamePhase::Player2Turn);
    }

    #[test]
    fn test_healer_dies_from_healing() {
        let rules = Rules { heal_cost: 170, ..Default::default() };
        let mut engine = skirmish_with(rules, &[(UnitKind::Healer, (2, 2)), (UnitKind::Soldier, (2, 3))], &[]);
        engine.select_unit(pos(2, 2)).unwrap();
        engine.heal_unit(pos(2, 3)).unwrap();

        assert!(engine.unit_at(pos(2, 2)).is_none());
        assert!(engine.unit_at(pos(2, 3)).is_some());
        assert_eq!(engine.phase(), GamePhase::Player2Turn);
    }

    #[test]
    fn test_healer_target_pays_as_well() {
        let rules = Rules { heal_amount: 170, ..Default::default() };
        let mut engine = skirmish_with(rules, &[(UnitKind::Healer, (2, 2)), (UnitKind::Healer, (2, 3))], &[]);
        engine.select_unit(pos(2, 2)).unwrap();
        engine.heal_unit(pos(2, 3)).unwrap();

        // A healer on the receiving end loses HP too; dead units never stay on the board
        assert!(engine.unit_at(pos(2, 3)).is_none());
        assert_eq!(engine.unit_at(pos(2, 2)).map(|u| u.hp()), Some(140));
    }

    #[test]
    fn test_oversized_heal_rejected_by_rules() {
        let rules = Rules { heal_amount: i32::MAX, ..Default::default() };
        assert!(matches!(
            Engine::new(rules),
            Err(RulesError::HealOutOfRange { .. })
        ));
    }

    #[test]
    fn test_largest_heal_only_adds_hp() {
        let rules = Rules { heal_amount: crate::ruleset::MAX_HEAL, ..Default::default() };
        let mut engine = skirmish_with(rules, &[(UnitKind::Healer, (2, 2)), (UnitKind::Knight, (2, 3))], &[]);
        engine.select_unit(pos(2, 2)).unwrap();
        engine.heal_unit(pos(2, 3)).unwrap();

        let knight = engine.unit_at(pos(2, 3)).unwrap();
        assert!(knight.is_alive());
        assert_eq!(knight.hp(), 150);
    }

    #[test]
    fn test_crown_kill_ends_game() {
        let mut engine = skirmish(
            &[(UnitKind::Soldier, (3, 3))],
            &[(UnitKind::Crown, (3, 4))],
        );
        for _ in 0..10 {
            engine.select_unit(pos(3, 3)).unwrap();
            engine.attack_unit(pos(3, 4)).unwrap();
            if engine.is_over() {
                break;
            }
            engine.end_turn().unwrap();
        }

        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.winner(), Some(Player::One));
        assert_eq!(engine.turn(), 19);
        assert!(engine.end_turn().is_err());
        assert!(engine.select_unit(pos(3, 3)).is_err());
        assert!(engine.legal_actions(Player::One).is_empty());
    }

    #[test]
    fn test_missing_crowns_favour_player_two() {
        let units = [(UnitKind::Soldier, Player::One, pos(0, 0)), (UnitKind::Soldier, Player::Two, pos(0, 7))];
        let engine = Engine::from_position(Rules::default(), &units, Player::One).unwrap();
        assert!(engine.is_over());
        assert_eq!(engine.winner(), Some(Player::Two));
    }

    #[test]
    fn test_end_turn_alternates() {
        let mut engine = placed_game();
        assert_eq!(engine.end_turn(), Err(EngineError::WrongPhase(GamePhase::Placement)));
        engine.start_game().unwrap();
        engine.select_unit(pos(0, 0)).unwrap();
        engine.end_turn().unwrap();
        assert_eq!(engine.current_player(), Some(Player::Two));
        assert!(engine.selection().is_none());
        engine.end_turn().unwrap();
        assert_eq!(engine.current_player(), Some(Player::One));
    }

    #[test]
    fn test_from_position_rejects_overlap() {
        let units = [
            (UnitKind::Crown, Player::One, pos(0, 0)),
            (UnitKind::Crown, Player::Two, pos(0, 0)),
        ];
        assert_eq!(
            Engine::from_position(Rules::default(), &units, Player::One).unwrap_err(),
            EngineError::Occupied(pos(0, 0))
        );
    }
}
