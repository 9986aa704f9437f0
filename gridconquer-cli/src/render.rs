//! Terminal rendering of boards and units

use std::collections::BTreeSet;
use std::fmt::Write;

use gridconquer_core::{Engine, Player, Position, Unit};

const RESET: &str = "\x1b[0m";

/// How cells are drawn
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderStyle {
    /// One-letter symbols instead of emoji
    pub ascii: bool,
    /// ANSI colour per player
    pub color: bool,
}

fn player_color(player: Player) -> &'static str {
    match player {
        Player::One => "\x1b[34m",
        Player::Two => "\x1b[31m",
    }
}

/// Column letter for the x coordinate
fn column_label(x: i8) -> char {
    char::from(b'A' + x as u8)
}

fn cell(unit: Option<&Unit>, style: RenderStyle) -> String {
    let Some(unit) = unit else {
        return if style.ascii { ".".into() } else { "·".into() };
    };

    let glyph = if style.ascii {
        let letter = unit.kind().stats().letter;
        // Lower case marks player 2 when colour is unavailable
        match unit.owner() {
            Player::One => letter.to_string(),
            Player::Two => letter.to_ascii_lowercase().to_string(),
        }
    } else {
        unit.symbol().to_string()
    };

    if style.color {
        format!("{}{}{}", player_color(unit.owner()), glyph, RESET)
    } else {
        glyph
    }
}

/// The labelled board, one line per row, row 1 at the top
pub fn render_board(engine: &Engine, style: RenderStyle) -> String {
    let size = engine.board_size();
    let mut out = String::new();

    out.push_str("   ");
    for x in 0..size {
        let _ = write!(out, " {} ", column_label(x));
    }
    out.push('\n');

    for y in 0..size {
        let _ = write!(out, "{:>2} ", y + 1);
        for x in 0..size {
            let _ = write!(out, " {} ", cell(engine.unit_at(Position::new(x, y)), style));
        }
        out.push('\n');
    }
    out
}

/// Short description of a unit for the selection prompt
pub fn unit_info(unit: &Unit) -> String {
    let kind = unit.kind();
    let mut out = format!(
        "{} {} (player {}) at {}\nHP: {}/{}",
        unit.symbol(),
        kind,
        unit.owner(),
        unit.position(),
        unit.hp(),
        unit.max_hp()
    );
    if kind.can_heal() {
        out.push_str("\nCan heal adjacent friendly units");
    } else if kind.can_attack() {
        out.push_str("\nCan attack enemy units in range");
    }
    out
}

/// Comma separated labels, in board order
pub fn format_targets(targets: &BTreeSet<Position>) -> String {
    targets
        .iter()
        .map(Position::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
