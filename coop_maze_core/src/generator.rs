//! Randomized depth-first maze carving.
//!
//! Mazes are carved with a two-cell stride from the shared start, so corridors
//! are separated by single-cell walls and the result has no cycles. Two passes
//! follow the carve: the goal and its surroundings are opened up so the goal is
//! always reachable, and a share of the leftover walls is turned into walls
//! that only one role can cross.

use rand::Rng;
use tracing::{debug, warn};

use crate::{
    Coordinate, DifficultyTier, Role,
    config::{
        MIN_DIMENSION, ROLE_WALL_ATTEMPT_FACTOR, ROLE_WALL_DENSITY_PERCENT,
        ROLE_WALL_MIN_DISTANCE, START,
    },
    map::Grid,
    maze::Maze,
    solver::shortest_path,
    tile::TileVariant,
};

/// Generates a maze sized for `tier`.
pub fn generate_for_tier<R: Rng + ?Sized>(tier: DifficultyTier, rng: &mut R) -> Maze {
    let (width, height) = tier.dimensions();
    generate(width, height, rng)
}

/// Generates a maze of `width` x `height` cells.
///
/// Odd dimensions give every carved cell a one-cell wall lattice. Dimensions
/// below [`MIN_DIMENSION`] are raised to it so start and goal never coincide.
pub fn generate<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Maze {
    let width = width.max(MIN_DIMENSION);
    let height = height.max(MIN_DIMENSION);

    let mut tiles = Grid::filled(width, height, TileVariant::Wall);
    let carved = carve(&mut tiles, START, rng);

    let goal = Coordinate::new(width - 2, height - 2);
    open_goal(&mut tiles, goal);
    tiles[goal] = TileVariant::Goal;

    let role_walls = place_role_walls(&mut tiles, START, goal, rng);

    let maze = Maze::new(tiles, START, goal);
    debug!(
        width,
        height,
        carved,
        role_walls,
        path_a = shortest_path(&maze, START, goal, Role::A).map(|p| p.len()),
        path_b = shortest_path(&maze, START, goal, Role::B).map(|p| p.len()),
        "Maze generated"
    );
    maze
}

/// Returns the cells two steps from `at` that are inside the border and
/// still solid, paired with the wall between.
fn carve_candidates(tiles: &Grid<TileVariant>, at: Coordinate) -> Vec<(Coordinate, Coordinate)> {
    let (width, height) = (tiles.width(), tiles.height());
    let offsets: [(isize, isize); 4] = [(0, -2), (0, 2), (-2, 0), (2, 0)];

    offsets
        .iter()
        .filter_map(|&(dc, dr)| {
            let target = Coordinate {
                col: at.col.checked_add_signed(dc)?,
                row: at.row.checked_add_signed(dr)?,
            };
            let interior = target.col >= 1
                && target.row >= 1
                && target.col + 1 < width
                && target.row + 1 < height;
            if !interior || tiles[target] != TileVariant::Wall {
                return None;
            }
            let between = Coordinate {
                col: at.col.checked_add_signed(dc / 2)?,
                row: at.row.checked_add_signed(dr / 2)?,
            };
            Some((between, target))
        })
        .collect()
}

/// Carves corridors from `start` with an explicit backtracking stack and
/// returns the number of floor cells created.
///
/// Every carve consumes an unvisited cell, so work is bounded by the grid area.
fn carve<R: Rng + ?Sized>(tiles: &mut Grid<TileVariant>, start: Coordinate, rng: &mut R) -> usize {
    tiles[start] = TileVariant::Floor;
    let mut carved = 1;
    let mut stack = vec![start];

    while let Some(&current) = stack.last() {
        let candidates = carve_candidates(tiles, current);
        if candidates.is_empty() {
            stack.pop();
            continue;
        }
        let (between, target) = candidates[rng.random_range(0..candidates.len())];
        tiles[between] = TileVariant::Floor;
        tiles[target] = TileVariant::Floor;
        carved += 2;
        stack.push(target);
    }

    carved
}

/// Clears the goal and every wall in its 3x3 neighbourhood, clipped to the
/// interior, so the carve cannot leave the goal boxed in.
fn open_goal(tiles: &mut Grid<TileVariant>, goal: Coordinate) {
    let (width, height) = (tiles.width(), tiles.height());
    tiles[goal] = TileVariant::Floor;

    let cols = goal.col.saturating_sub(1).max(1)..=(goal.col + 1).min(width - 2);
    for col in cols {
        let rows = goal.row.saturating_sub(1).max(1)..=(goal.row + 1).min(height - 2);
        for row in rows {
            let at = Coordinate { col, row };
            if tiles[at] == TileVariant::Wall {
                tiles[at] = TileVariant::Floor;
            }
        }
    }
}

/// Converts sampled interior walls into role walls and returns how many were
/// placed. Sampling is capped, so fewer than the target may be placed.
fn place_role_walls<R: Rng + ?Sized>(
    tiles: &mut Grid<TileVariant>,
    start: Coordinate,
    goal: Coordinate,
    rng: &mut R,
) -> usize {
    let (width, height) = (tiles.width(), tiles.height());
    let target = width * height * ROLE_WALL_DENSITY_PERCENT / 100;
    let max_attempts = target * ROLE_WALL_ATTEMPT_FACTOR;

    let mut placed = 0;
    let mut attempts = 0;
    while placed < target && attempts < max_attempts {
        attempts += 1;
        let at = Coordinate {
            col: rng.random_range(1..width - 1),
            row: rng.random_range(1..height - 1),
        };
        if tiles[at] != TileVariant::Wall
            || at.manhattan(start) <= ROLE_WALL_MIN_DISTANCE
            || at.manhattan(goal) <= ROLE_WALL_MIN_DISTANCE
        {
            continue;
        }
        let role = if rng.random_bool(0.5) { Role::A } else { Role::B };
        tiles[at] = TileVariant::role_wall(role);
        placed += 1;
    }

    if placed < target {
        warn!(placed, target, attempts, "Role wall sampling exhausted");
    }
    placed
}
