//! Square board geometry with (x, y) coordinates
//!
//! Row index `y` grows downward from the top of a printed board. Labels use a
//! column letter (`A + x`) followed by a 1-based row number (`y + 1`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default board dimension
pub const BOARD_SIZE: i8 = 8;

/// Largest board whose columns can still be labelled with a single letter
pub const MAX_BOARD_SIZE: i8 = 26;

/// Board coordinates
///
/// Ordering is row-major (y first, then x), which gives legality sets and
/// unit listings a stable reading order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub y: i8,
    pub x: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Check if this position is on a board of the given size
    pub fn in_bounds(&self, board_size: i8) -> bool {
        (0..board_size).contains(&self.x) && (0..board_size).contains(&self.y)
    }

    /// Position shifted by a direction vector
    pub fn offset(&self, dx: i8, dy: i8) -> Position {
        Position::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl From<(i8, i8)> for Position {
    fn from((x, y): (i8, i8)) -> Self {
        Position::new(x, y)
    }
}

/// Direction vectors (dx, dy)
pub type Direction = (i8, i8);

/// Down, right, up, left
pub const ORTHOGONAL: [Direction; 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub const DIAGONAL: [Direction; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Orthogonal directions followed by diagonal ones
pub const ALL_DIRECTIONS: [Direction; 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Ray-march from `from` along `direction`
///
/// Yields at most `max_steps` cells, stopping early at the board edge. The
/// starting cell is never yielded. Occupancy is left to the caller.
pub fn ray(
    from: Position,
    direction: Direction,
    max_steps: u8,
    board_size: i8,
) -> impl Iterator<Item = Position> {
    let (dx, dy) = direction;
    (1..=max_steps as i8)
        .map(move |step| from.offset(dx * step, dy * step))
        .take_while(move |pos| pos.in_bounds(board_size))
}

/// All cells of a board, in row-major order
pub fn all_positions(board_size: i8) -> impl Iterator<Item = Position> {
    (0..board_size).flat_map(move |y| (0..board_size).map(move |x| Position::new(x, y)))
}

// ============================================================================
// COORDINATE LABELS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParsePositionError {
    #[error("expected a label like A1, got {0:?}")]
    Malformed(String),

    #[error("row must be 1 or greater in {0:?}")]
    ZeroRow(String),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..MAX_BOARD_SIZE).contains(&self.x) && self.y >= 0 {
            write!(f, "{}{}", (b'A' + self.x as u8) as char, self.y as i32 + 1)
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    /// Parse a label such as `a1`, `H8` or `B10`
    ///
    /// Bounds are not checked here; off-board positions are rejected by the
    /// engine's legality checks like any other illegal target.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_uppercase();
        let malformed = || ParsePositionError::Malformed(s.to_string());

        let mut chars = label.chars();
        let column = chars.next().filter(char::is_ascii_uppercase).ok_or_else(malformed)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }

        let row: i8 = digits.parse().map_err(|_| malformed())?;
        if row == 0 {
            return Err(ParsePositionError::ZeroRow(s.to_string()));
        }

        Ok(Position::new((column as u8 - b'A') as i8, row - 1))
    }
}
