//! Shared fixtures for unit tests

use crate::board::Position;
use crate::game::{Engine, Player};
use crate::ruleset::Rules;
use crate::units::UnitKind;

pub fn pos(x: i8, y: i8) -> Position {
    Position::new(x, y)
}

/// Crown squares used when a fixture does not place its own crowns
const PLAYER_ONE_CROWN: Position = Position::new(7, 0);
const PLAYER_TWO_CROWN: Position = Position::new(7, 7);

/// Arranged position, player 1 to move, default rules
///
/// Each side gets a crown in its far corner unless the list already has one.
pub fn skirmish(one: &[(UnitKind, (i8, i8))], two: &[(UnitKind, (i8, i8))]) -> Engine {
    skirmish_with(Rules::default(), one, two)
}

pub fn skirmish_with(
    rules: Rules,
    one: &[(UnitKind, (i8, i8))],
    two: &[(UnitKind, (i8, i8))],
) -> Engine {
    let mut units = Vec::new();
    for (player, side, crown) in [
        (Player::One, one, PLAYER_ONE_CROWN),
        (Player::Two, two, PLAYER_TWO_CROWN),
    ] {
        units.extend(side.iter().map(|&(kind, p)| (kind, player, Position::from(p))));
        if !side.iter().any(|(kind, _)| *kind == UnitKind::Crown) {
            units.push((UnitKind::Crown, player, crown));
        }
    }
    Engine::from_position(rules, &units, Player::One).unwrap()
}

/// Both rosters placed along each player's back row, game not yet started
///
/// Player 1 fills row 0 left to right, player 2 fills row 7.
pub fn placed_game() -> Engine {
    let mut engine = Engine::default();
    while let Some((player, kind)) = engine.next_placement() {
        let x = engine.placed_count(player) as i8;
        let y = match player {
            Player::One => 0,
            Player::Two => 7,
        };
        engine.place_unit(kind, pos(x, y), player).unwrap();
    }
    engine
}
