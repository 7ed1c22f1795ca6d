//! Board representation and move rules for 987.
//!
//! A [`Board`] is an immutable square grid of [`Cell`]s. Every transform
//! (`shift`, `with_random_tile`, ...) returns a new board. Randomness is always
//! passed in explicitly, so a seeded `StdRng` makes a whole game reproducible.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

mod fib;
mod line;
mod state;

pub use fib::{fibonacci, tile_value, VALUE_TABLE, VALUE_TABLE_LEN};
pub use line::{combine, pad};
pub use state::{Board, Cell};

/// Tile level. 0 is reserved for empty cells.
pub type Rank = u8;
/// Identity key carried by a cell so renderers can track a tile across moves.
pub type TileKey = u32;
/// Score accumulated by merges.
pub type Score = u64;

/// Board dimension used by default.
pub const DEFAULT_SIZE: usize = 4;
/// Identity keys are drawn uniformly from `0..=MAX_TILE_KEY`.
pub const MAX_TILE_KEY: TileKey = 1_000_000;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order used by search and terminal detection.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// How this direction maps onto a leftward line combine: `(reversed, transposed)`.
    ///
    /// Lines are rows for Left/Right and columns for Up/Down; Right/Down lines
    /// are reversed before and after combining.
    #[inline]
    pub const fn orientation(self) -> (bool, bool) {
        match self {
            Direction::Up => (false, true),
            Direction::Down => (true, true),
            Direction::Left => (false, false),
            Direction::Right => (true, false),
        }
    }

    #[inline]
    pub const fn to_u8(self) -> u8 {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    #[inline]
    pub const fn from_u8(v: u8) -> Option<Direction> {
        match v {
            0 => Some(Direction::Up),
            1 => Some(Direction::Down),
            2 => Some(Direction::Left),
            3 => Some(Direction::Right),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction: {0:?}")]
pub struct ParseDirectionError(pub String);

/// Parses key names (`ArrowUp`), words (`up`) and WASD letters, case-insensitively.
///
/// ```
/// use ai_987::engine::Direction;
/// assert_eq!("ArrowLeft".parse::<Direction>(), Ok(Direction::Left));
/// assert_eq!("d".parse::<Direction>(), Ok(Direction::Right));
/// assert!("sideways".parse::<Direction>().is_err());
/// ```
impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arrowup" | "up" | "u" | "w" => Ok(Direction::Up),
            "arrowdown" | "down" | "s" => Ok(Direction::Down),
            "arrowleft" | "left" | "l" | "a" => Ok(Direction::Left),
            "arrowright" | "right" | "r" | "d" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Errors raised while building boards or lines from raw parts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("line of {len} cells does not fit a board of size {size}")]
    LineOverflow { len: usize, size: usize },
    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },
    #[error("row {row} has {len} cells, expected {size}")]
    RaggedRow { row: usize, len: usize, size: usize },
}

/// Draw a fresh identity key.
#[inline]
pub fn random_key<R: Rng + ?Sized>(rng: &mut R) -> TileKey {
    rng.gen_range(0..=MAX_TILE_KEY)
}

/// Empty board of the default size with one spawned tile, ready for play.
pub fn new_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    Board::empty(rng).with_random_tile(rng)
}

/// Slide/merge `board` toward `direction`. `None` if no rank changes.
pub fn shift<R: Rng + ?Sized>(board: &Board, direction: Direction, rng: &mut R) -> Option<(Board, Score)> {
    board.shift(direction, rng)
}

/// True if no direction changes the board's ranks.
pub fn is_game_over(board: &Board) -> bool {
    board.is_game_over()
}
