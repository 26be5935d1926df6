//! Fixed gameplay constants.

use crate::Coordinate;

pub const EASY_SIZE: (usize, usize) = (10, 10);
pub const MEDIUM_SIZE: (usize, usize) = (15, 15);
pub const HARD_SIZE: (usize, usize) = (25, 25);

/// Smallest width or height the generator will build.
pub const MIN_DIMENSION: usize = 5;

/// Shared spawn cell for both roles.
pub const START: Coordinate = Coordinate::new(1, 1);

/// Per-round time limit, identical for every tier.
pub const ROUND_TIME_LIMIT_MS: u64 = 60_000;

/// Share of all cells, in percent, targeted for role-restricted walls.
pub const ROLE_WALL_DENSITY_PERCENT: usize = 8;

/// A role wall must be strictly farther than this from the start and the goal.
pub const ROLE_WALL_MIN_DISTANCE: usize = 3;

/// Sampling attempts allowed per targeted role wall.
pub const ROLE_WALL_ATTEMPT_FACTOR: usize = 20;

pub const SCOREBOARD_LIMIT: usize = 10;

/// Expected interval between timer ticks driven by the front-end.
pub const TICK_INTERVAL_MS: u64 = 100;
