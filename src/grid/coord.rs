//! Grid coordinates and facing directions.
//!
//! Coordinates are signed so that neighbour arithmetic never underflows;
//! bounds are checked by the grid, not by `Coord` itself. `GridGeometry`
//! maps between discrete cells and the continuous presentation space.

use serde::{Deserialize, Serialize};

/// A discrete grid coordinate. Row 0 is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub const fn new(row: i32, col: i32) -> Self {
        Coord { row, col }
    }

    /// Returns the neighbouring coordinate one cell in `dir`.
    pub const fn step(self, dir: Direction) -> Coord {
        let (dr, dc) = dir.delta();
        Coord {
            row: self.row + dr,
            col: self.col + dc,
        }
    }

    /// Chebyshev distance: 1 for all eight neighbours.
    pub fn chebyshev(self, other: Coord) -> i32 {
        (self.row - other.row).abs().max((self.col - other.col).abs())
    }

    /// Returns the direction from `self` to an orthogonally adjacent `other`.
    pub fn direction_to(self, other: Coord) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.step(*d) == other)
    }

    /// All coordinates of the 3x3 block centred on `self`, including `self`.
    /// Bounds are not checked.
    pub fn block(self) -> impl Iterator<Item = Coord> {
        (-1..=1).flat_map(move |dr| {
            (-1..=1).map(move |dc| Coord::new(self.row + dr, self.col + dc))
        })
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The axis a drag gesture is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A four-connected facing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns the (row, col) offset of one step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// The direction 90 degrees counter-clockwise.
    pub const fn turn_left(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// The direction 90 degrees clockwise.
    pub const fn turn_right(self) -> Direction {
        self.turn_left().opposite()
    }

    pub const fn axis(self) -> Axis {
        match self {
            Direction::Up | Direction::Down => Axis::Vertical,
            Direction::Left | Direction::Right => Axis::Horizontal,
        }
    }

    /// Index into per-direction tables.
    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// Returns the arrow glyph used by the sketch notation.
    pub const fn arrow(self) -> char {
        match self {
            Direction::Up => '^',
            Direction::Down => 'v',
            Direction::Left => '<',
            Direction::Right => '>',
        }
    }

    /// Parses a direction from its arrow glyph.
    pub fn from_arrow(c: char) -> Option<Direction> {
        match c {
            '^' => Some(Direction::Up),
            'v' => Some(Direction::Down),
            '<' => Some(Direction::Left),
            '>' => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Placement of the grid in presentation space.
///
/// Cell (0, 0) has its top-left corner at `(origin_x, origin_y)`; x grows to
/// the right (columns) and y grows downwards (rows).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridGeometry {
    pub origin_x: f32,
    pub origin_y: f32,
    pub cell_size: f32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        GridGeometry {
            origin_x: 0.0,
            origin_y: 0.0,
            cell_size: 64.0,
        }
    }
}

impl GridGeometry {
    /// Returns the cell containing the presentation-space point `(x, y)`.
    /// The result may lie outside the grid.
    pub fn cell_of(&self, x: f32, y: f32) -> Coord {
        let col = ((x - self.origin_x) / self.cell_size).floor() as i32;
        let row = ((y - self.origin_y) / self.cell_size).floor() as i32;
        Coord::new(row, col)
    }

    /// Returns the presentation-space centre of `coord`.
    pub fn center_of(&self, coord: Coord) -> (f32, f32) {
        let x = self.origin_x + (coord.col as f32 + 0.5) * self.cell_size;
        let y = self.origin_y + (coord.row as f32 + 0.5) * self.cell_size;
        (x, y)
    }
}
