use std::collections::VecDeque;

use crate::{
    Coordinate, Direction, Role,
    map::Grid,
    maze::Maze,
    tile::can_occupy,
};

/// Gets the in-bounds neighbours of `at` that `role` can occupy.
fn passable_neighbors(maze: &Maze, at: Coordinate, role: Role) -> Vec<Coordinate> {
    Direction::ALL
        .iter()
        .filter_map(|&d| at.step(d))
        .filter(|&n| maze.tile(n).is_some_and(|tile| can_occupy(tile, role)))
        .collect()
}

/// Breadth-first search for a shortest path from `from` to `to` that only
/// visits tiles `role` can occupy.
///
/// The returned path includes both endpoints. Returns `None` if `to` cannot be
/// reached or either endpoint is outside the maze.
pub fn shortest_path(
    maze: &Maze,
    from: Coordinate,
    to: Coordinate,
    role: Role,
) -> Option<Vec<Coordinate>> {
    let tiles = maze.tiles();
    if !tiles.contains(from) || !tiles.contains(to) {
        return None;
    }

    let mut came_from: Grid<Option<Coordinate>> = Grid::filled(tiles.width(), tiles.height(), None);
    let mut frontier = VecDeque::new();
    came_from[from] = Some(from);
    frontier.push_back(from);

    while let Some(current) = frontier.pop_front() {
        if current == to {
            break;
        }
        for next in passable_neighbors(maze, current, role) {
            if came_from[next].is_none() {
                came_from[next] = Some(current);
                frontier.push_back(next);
            }
        }
    }

    came_from[to]?;

    // Reconstruct path
    let mut path = vec![to];
    let mut current = to;
    while current != from {
        current = came_from[current]?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

/// Converts a move between two adjacent coordinates into a direction.
pub fn direction_between(src: Coordinate, dst: Coordinate) -> Option<Direction> {
    Direction::ALL.into_iter().find(|&d| src.step(d) == Some(dst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::parse_maze;

    #[test]
    fn path_respects_role_walls() {
        let maze = parse_maze(
            "
            #######
            #S.a.G#
            #.###b#
            #.....#
            #######
            ",
        )
        .unwrap();

        let a = shortest_path(&maze, maze.start(), maze.goal(), Role::A).unwrap();
        assert_eq!(a.len(), 5);
        assert_eq!(a.first(), Some(&maze.start()));
        assert_eq!(a.last(), Some(&maze.goal()));

        let b = shortest_path(&maze, maze.start(), maze.goal(), Role::B).unwrap();
        assert!(b.contains(&Coordinate::new(5, 2)));
        assert!(!b.contains(&Coordinate::new(3, 1)));
        assert_eq!(b.len(), 9);
    }

    #[test]
    fn unreachable_goal() {
        let maze = parse_maze(
            "
            #####
            #S#G#
            #####
            ",
        )
        .unwrap();
        assert_eq!(shortest_path(&maze, maze.start(), maze.goal(), Role::A), None);
        assert_eq!(
            shortest_path(&maze, maze.start(), Coordinate::new(9, 9), Role::A),
            None
        );
    }

    #[test]
    fn consecutive_steps_are_adjacent() {
        let maze = parse_maze(
            "
            #####
            #S..#
            #.#.#
            #..G#
            #####
            ",
        )
        .unwrap();
        let path = shortest_path(&maze, maze.start(), maze.goal(), Role::B).unwrap();
        for pair in path.windows(2) {
            assert!(direction_between(pair[0], pair[1]).is_some());
        }
        assert_eq!(path.len(), 5);
    }
}
