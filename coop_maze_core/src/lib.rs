use serde::{Deserialize, Serialize};

pub mod clock;
pub mod config;
pub mod generator;
pub mod map;
pub mod maze;
pub mod round;
pub mod scores;
pub mod session;
pub mod solver;
pub mod tile;

/// Represents a 2D grid coordinate as `(col, row)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub col: usize,
    pub row: usize,
}

impl Coordinate {
    pub const fn new(col: usize, row: usize) -> Self {
        Coordinate { col, row }
    }

    /// Returns the neighbouring coordinate one cell away in `direction`.
    ///
    /// Returns `None` when the step would go below column or row zero. Steps past
    /// the far edge are still produced; bounds are the grid's business.
    pub fn step(self, direction: Direction) -> Option<Coordinate> {
        let (dc, dr) = direction.offset();
        Some(Coordinate {
            col: self.col.checked_add_signed(dc)?,
            row: self.row.checked_add_signed(dr)?,
        })
    }

    /// Returns the Manhattan distance between two coordinates.
    pub fn manhattan(self, other: Coordinate) -> usize {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }
}

/// One of the two cooperating movement roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    A,
    B,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::A, Role::B];

    /// Slot of this role in fixed two-element role tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Role::A => 0,
            Role::B => 1,
        }
    }
}

/// A single-cell movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    /// Returns the `(dcol, drow)` offset of this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Difficulty tier of a round; each tier has a fixed maze size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    /// Returns the `(width, height)` of mazes generated for this tier.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            DifficultyTier::Easy => config::EASY_SIZE,
            DifficultyTier::Medium => config::MEDIUM_SIZE,
            DifficultyTier::Hard => config::HARD_SIZE,
        }
    }

    /// Returns the following tier. `Hard` is the ceiling and maps to itself.
    pub fn next(self) -> DifficultyTier {
        match self {
            DifficultyTier::Easy => DifficultyTier::Medium,
            DifficultyTier::Medium | DifficultyTier::Hard => DifficultyTier::Hard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_underflow_is_none() {
        let origin = Coordinate::new(0, 0);
        assert_eq!(origin.step(Direction::Up), None);
        assert_eq!(origin.step(Direction::Left), None);
        assert_eq!(origin.step(Direction::Right), Some(Coordinate::new(1, 0)));
        assert_eq!(origin.step(Direction::Down), Some(Coordinate::new(0, 1)));
    }

    #[test]
    fn manhattan_is_symmetric() {
        let a = Coordinate::new(1, 1);
        let b = Coordinate::new(4, 3);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(b.manhattan(a), 5);
    }

    #[test]
    fn tier_progression_stops_at_hard() {
        let tier = DifficultyTier::Easy.next().next();
        assert_eq!(tier, DifficultyTier::Hard);
        assert_eq!(tier.next(), DifficultyTier::Hard);
    }

    #[test]
    fn tier_dimensions() {
        assert_eq!(DifficultyTier::Easy.dimensions(), (10, 10));
        assert_eq!(DifficultyTier::Medium.dimensions(), (15, 15));
        assert_eq!(DifficultyTier::Hard.dimensions(), (25, 25));
    }
}
