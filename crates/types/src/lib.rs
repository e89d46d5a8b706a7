//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental value types used throughout the engine.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (grid engine, move search, front ends).
//!
//! # Coordinates
//!
//! The playfield uses a bottom-up coordinate system:
//!
//! - **x**: column, `0` is the leftmost column
//! - **y**: row, `0` is the floor row, rows grow upward
//!
//! A column with no occupied cell has relief [`EMPTY_RELIEF`].
//!
//! # Examples
//!
//! ```
//! use tetris_ai_types::{Coord, Direction, ShapeKind, DEFAULT_HEIGHT, DEFAULT_WIDTH};
//!
//! let kind = ShapeKind::from_str("t").unwrap();
//! assert_eq!(kind, ShapeKind::T);
//!
//! let c = Coord::new(3, 4).step(Direction::Bot, 2);
//! assert_eq!(c, Coord::new(3, 2));
//!
//! assert_eq!(DEFAULT_WIDTH, 10);
//! assert_eq!(DEFAULT_HEIGHT, 20);
//! ```

/// Default playfield width in cells
pub const DEFAULT_WIDTH: usize = 10;

/// Default playfield height in cells
pub const DEFAULT_HEIGHT: usize = 20;

/// Number of cells in every tetromino
pub const CELLS_PER_SHAPE: usize = 4;

/// Upper bound on distinct rotation states of a shape
pub const MAX_ROTATIONS: usize = 4;

/// Relief value of a column with no occupied cell
pub const EMPTY_RELIEF: i32 = -1;

/// Depth of the well required for a tetris (four lines at once)
pub const TETRIS_DEPTH: i32 = 4;

/// Minimum depth of a single-column notch counted as a crevice
pub const CREVICE_DEPTH: i32 = 3;

/// Default number of pieces the shape stream can look ahead
pub const DEFAULT_LOOKAHEAD: usize = 5;

/// The seven tetromino kinds, in shape-table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl ShapeKind {
    /// All kinds, in shape-table order
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::T,
        ShapeKind::Z,
    ];

    /// Parse shape kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_ai_types::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::from_str("i"), Some(ShapeKind::I));
    /// assert_eq!(ShapeKind::from_str("O"), Some(ShapeKind::O));
    /// assert_eq!(ShapeKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(ShapeKind::I),
            "j" => Some(ShapeKind::J),
            "l" => Some(ShapeKind::L),
            "o" => Some(ShapeKind::O),
            "s" => Some(ShapeKind::S),
            "t" => Some(ShapeKind::T),
            "z" => Some(ShapeKind::Z),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::I => "i",
            ShapeKind::J => "j",
            ShapeKind::L => "l",
            ShapeKind::O => "o",
            ShapeKind::S => "s",
            ShapeKind::T => "t",
            ShapeKind::Z => "z",
        }
    }

    /// Position of this kind in the shape table
    pub fn index(&self) -> usize {
        match self {
            ShapeKind::I => 0,
            ShapeKind::J => 1,
            ShapeKind::L => 2,
            ShapeKind::O => 3,
            ShapeKind::S => 4,
            ShapeKind::T => 5,
            ShapeKind::Z => 6,
        }
    }

    /// Inverse of [`ShapeKind::index`]
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// The four directions a shape can face or move in
///
/// - **Bot**: toward row 0 (the floor)
/// - **Left**: toward column 0
/// - **Top**: toward the spawn area
/// - **Right**: toward the last column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Bot,
    Left,
    Top,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Bot,
        Direction::Left,
        Direction::Top,
        Direction::Right,
    ];

    /// Slot of this direction in per-direction tables
    pub fn index(&self) -> usize {
        match self {
            Direction::Bot => 0,
            Direction::Left => 1,
            Direction::Top => 2,
            Direction::Right => 3,
        }
    }

    /// Opposite direction
    ///
    /// # Examples
    ///
    /// ```
    /// use tetris_ai_types::Direction;
    ///
    /// assert_eq!(Direction::Bot.opposite(), Direction::Top);
    /// assert_eq!(Direction::Left.opposite(), Direction::Right);
    /// ```
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Bot => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Top => Direction::Bot,
            Direction::Right => Direction::Left,
        }
    }

    /// True for `Bot` and `Top`
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::Bot | Direction::Top)
    }

    /// Unit step `(dx, dy)` in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Bot => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Top => (0, 1),
            Direction::Right => (1, 0),
        }
    }

    /// Parse direction from string
    ///
    /// Accepts full names or single letters (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bot" | "b" | "down" => Some(Direction::Bot),
            "left" | "l" => Some(Direction::Left),
            "top" | "t" | "up" => Some(Direction::Top),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Bot => "bot",
            Direction::Left => "left",
            Direction::Top => "top",
            Direction::Right => "right",
        }
    }
}

/// A cell coordinate on the playfield
///
/// Blocks may sit partially or fully out of range while the search probes
/// positions, so both axes are signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Sentinel returned by geometry queries that cannot be answered
    pub const INVALID: Coord = Coord {
        x: i32::MIN,
        y: i32::MIN,
    };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Coordinate `amount` steps away in `dir`
    pub fn step(self, dir: Direction, amount: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(amount)),
            y: self.y.saturating_add(dy.saturating_mul(amount)),
        }
    }

    /// Component-wise sum
    pub fn offset_by(self, other: Coord) -> Self {
        Self {
            x: self.x.saturating_add(other.x),
            y: self.y.saturating_add(other.y),
        }
    }
}

/// A placement chosen by the move search
///
/// `col` is the block's left edge (its offset x) and `rot` the rotation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub rot: usize,
    pub col: i32,
}

impl Move {
    pub fn new(rot: usize, col: i32) -> Self {
        Self { rot, col }
    }
}
