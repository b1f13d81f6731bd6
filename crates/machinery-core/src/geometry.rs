//! Integer cell geometry: positions, rotation steps and cardinal directions.
//!
//! The grid uses a y-up convention: [`Direction::Up`] increases `y`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Neg, Sub};

// ---------------------------------------------------------------------------
// GridPosition
// ---------------------------------------------------------------------------

/// A cell position (or a cell offset) on the 2D grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const ORIGIN: GridPosition = GridPosition { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// This position shifted by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &GridPosition) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }

    /// The four edge-adjacent positions, in [`Direction::all`] order.
    pub fn neighbors_4(self) -> [GridPosition; 4] {
        Direction::all().map(|dir| self.step(dir))
    }

    /// The adjacent position in `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        self.offset(dx, dy)
    }
}

impl Add for GridPosition {
    type Output = GridPosition;

    fn add(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for GridPosition {
    type Output = GridPosition;

    fn sub(self, rhs: GridPosition) -> GridPosition {
        GridPosition::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for GridPosition {
    type Output = GridPosition;

    fn neg(self) -> GridPosition {
        GridPosition::new(-self.x, -self.y)
    }
}

impl From<(i32, i32)> for GridPosition {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl std::fmt::Display for GridPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Rotation applied to a component footprint, in 90-degree steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    /// No rotation.
    #[default]
    None,
    /// One quarter turn.
    Cw90,
    /// Half turn.
    Cw180,
    /// Three quarter turns.
    Cw270,
}

impl Rotation {
    /// All four rotation values.
    pub fn all() -> [Rotation; 4] {
        [
            Rotation::None,
            Rotation::Cw90,
            Rotation::Cw180,
            Rotation::Cw270,
        ]
    }

    /// Build a rotation from a step count. Steps wrap modulo 4, so
    /// `from_steps(4) == Rotation::None`.
    pub fn from_steps(steps: u8) -> Self {
        match steps % 4 {
            0 => Rotation::None,
            1 => Rotation::Cw90,
            2 => Rotation::Cw180,
            _ => Rotation::Cw270,
        }
    }

    /// Number of quarter turns, 0..=3.
    pub fn steps(self) -> u8 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 1,
            Rotation::Cw180 => 2,
            Rotation::Cw270 => 3,
        }
    }

    /// Rotate one more step.
    pub fn rotate_cw(self) -> Self {
        Self::from_steps(self.steps() + 1)
    }

    /// Rotate one step back.
    pub fn rotate_ccw(self) -> Self {
        Self::from_steps(self.steps() + 3)
    }

    /// Composition of two rotations.
    pub fn then(self, other: Rotation) -> Self {
        Self::from_steps(self.steps() + other.steps())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Cardinal directions on a y-up grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions in neighbor-expansion order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }

    /// Offset for this direction.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_position_manhattan_distance() {
        let a = GridPosition::new(0, 0);
        let b = GridPosition::new(3, 4);
        assert_eq!(a.manhattan_distance(&b), 7);

        let c = GridPosition::new(-2, 5);
        let d = GridPosition::new(3, -1);
        assert_eq!(c.manhattan_distance(&d), 11);
        assert_eq!(a.manhattan_distance(&a), 0);
    }

    #[test]
    fn grid_position_arithmetic() {
        let a = GridPosition::new(2, 3);
        let b = GridPosition::new(-1, 4);
        assert_eq!(a + b, GridPosition::new(1, 7));
        assert_eq!(a - b, GridPosition::new(3, -1));
        assert_eq!(-a, GridPosition::new(-2, -3));
    }

    #[test]
    fn neighbors_follow_up_down_left_right() {
        let n = GridPosition::new(5, 5).neighbors_4();
        assert_eq!(
            n,
            [
                GridPosition::new(5, 6),
                GridPosition::new(5, 4),
                GridPosition::new(4, 5),
                GridPosition::new(6, 5),
            ]
        );
    }

    #[test]
    fn rotation_steps_wrap() {
        assert_eq!(Rotation::from_steps(4), Rotation::None);
        assert_eq!(Rotation::from_steps(7), Rotation::Cw270);
        for r in Rotation::all() {
            assert_eq!(Rotation::from_steps(r.steps()), r);
        }
    }

    #[test]
    fn rotation_cw_and_ccw_are_inverse() {
        for r in Rotation::all() {
            assert_eq!(r.rotate_cw().rotate_ccw(), r);
            assert_eq!(r.rotate_cw().rotate_cw().rotate_cw().rotate_cw(), r);
        }
    }

    #[test]
    fn rotation_composition() {
        assert_eq!(Rotation::Cw90.then(Rotation::Cw270), Rotation::None);
        assert_eq!(Rotation::Cw180.then(Rotation::Cw180), Rotation::None);
        assert_eq!(Rotation::Cw90.then(Rotation::Cw90), Rotation::Cw180);
    }
}
