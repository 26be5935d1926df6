use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Coordinate, DifficultyTier, Role, clock::RoundTimer, generator::generate_for_tier,
    maze::Maze, tile::can_occupy,
};

/// Position and goal status of one role within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleState {
    pub position: Coordinate,
    pub reached_goal: bool,
}

/// Immutable record of a finished (or abandoned) round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub tier: DifficultyTier,
    pub elapsed_millis: u64,
    pub completed: bool,
}

/// One playthrough of a single maze: the maze, both roles, and the timer.
///
/// All time reads take an explicit `now` in milliseconds so the round itself
/// stays deterministic.
#[derive(Debug, Clone)]
pub struct RoundLifecycle {
    tier: DifficultyTier,
    maze: Maze,
    roles: [Option<RoleState>; 2],
    timer: RoundTimer,
}

impl RoundLifecycle {
    /// Generates a maze for `tier`, places both roles on the shared start and
    /// starts the timer at `now`.
    pub fn start<R: Rng + ?Sized>(tier: DifficultyTier, rng: &mut R, now: u64) -> Self {
        let maze = generate_for_tier(tier, rng);
        Self::with_maze(tier, maze, &Role::ALL, now)
    }

    /// Starts a round on an existing maze, tracking only the listed roles.
    pub fn with_maze(tier: DifficultyTier, maze: Maze, roles: &[Role], now: u64) -> Self {
        let mut slots = [None; 2];
        for &role in roles {
            slots[role.index()] = Some(RoleState {
                position: maze.start(),
                reached_goal: false,
            });
        }
        RoundLifecycle {
            tier,
            maze,
            roles: slots,
            timer: RoundTimer::start(now),
        }
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// Returns the state of `role`, or `None` if the role is not tracked.
    pub fn role_state(&self, role: Role) -> Option<RoleState> {
        self.roles[role.index()]
    }

    /// Moves `role` onto `target` if it is inside the maze and passable for
    /// that role. Rejected moves return `false` and change nothing.
    pub fn attempt_move(&mut self, role: Role, target: Coordinate) -> bool {
        let Some(tile) = self.maze.tile(target) else {
            return false;
        };
        if !can_occupy(tile, role) {
            return false;
        }
        let goal = self.maze.goal();
        let Some(state) = self.roles[role.index()].as_mut() else {
            return false;
        };

        state.position = target;
        if target == goal && !state.reached_goal {
            state.reached_goal = true;
            debug!(?role, "Role reached goal");
        }
        true
    }

    /// True when at least one role is tracked and every tracked role has
    /// reached the goal.
    pub fn is_complete(&self) -> bool {
        let mut tracked = self.roles.iter().flatten().peekable();
        tracked.peek().is_some() && tracked.all(|s| s.reached_goal)
    }

    /// Freezes the round timer at `now`.
    pub fn stop(&mut self, now: u64) {
        self.timer.stop(now);
    }

    pub fn elapsed_millis(&self, now: u64) -> u64 {
        self.timer.elapsed(now)
    }

    pub fn outcome(&self, now: u64) -> RoundOutcome {
        RoundOutcome {
            tier: self.tier,
            elapsed_millis: self.elapsed_millis(now),
            completed: self.is_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::parse_maze;

    fn fixture() -> Maze {
        parse_maze(
            "
            ######
            #Sab.#
            #.#..#
            #...G#
            ######
            ",
        )
        .unwrap()
    }

    fn round(roles: &[Role]) -> RoundLifecycle {
        RoundLifecycle::with_maze(DifficultyTier::Easy, fixture(), roles, 0)
    }

    #[test]
    fn both_roles_spawn_on_start() {
        let round = round(&Role::ALL);
        for role in Role::ALL {
            assert_eq!(
                round.role_state(role),
                Some(RoleState {
                    position: Coordinate::new(1, 1),
                    reached_goal: false
                })
            );
        }
    }

    #[test]
    fn moves_follow_passability() {
        let mut round = round(&Role::ALL);
        // Plain wall
        assert!(!round.attempt_move(Role::A, Coordinate::new(0, 1)));
        // Foreign role wall
        assert!(!round.attempt_move(Role::B, Coordinate::new(2, 1)));
        assert!(!round.attempt_move(Role::A, Coordinate::new(3, 1)));
        // Own role wall
        assert!(round.attempt_move(Role::A, Coordinate::new(2, 1)));
        assert!(round.attempt_move(Role::B, Coordinate::new(3, 1)));
        // Floor and goal
        assert!(round.attempt_move(Role::B, Coordinate::new(4, 2)));
        assert!(round.attempt_move(Role::B, Coordinate::new(4, 3)));
        assert_eq!(round.role_state(Role::B).unwrap().position, Coordinate::new(4, 3));
    }

    #[test]
    fn out_of_bounds_move_is_rejected() {
        let mut round = round(&Role::ALL);
        let before = round.role_state(Role::A);
        let width = round.maze().width();
        assert!(!round.attempt_move(Role::A, Coordinate::new(width, 1)));
        assert!(!round.attempt_move(Role::A, Coordinate::new(1, round.maze().height())));
        assert_eq!(round.role_state(Role::A), before);
    }

    #[test]
    fn completion_needs_every_tracked_role() {
        let mut round = round(&Role::ALL);
        let goal = round.maze().goal();
        assert!(!round.is_complete());

        assert!(round.attempt_move(Role::A, goal));
        assert!(round.role_state(Role::A).unwrap().reached_goal);
        assert!(!round.is_complete());

        assert!(round.attempt_move(Role::B, goal));
        assert!(round.is_complete());

        // Leaving the goal keeps the flag.
        assert!(round.attempt_move(Role::A, Coordinate::new(3, 3)));
        assert!(round.is_complete());
    }

    #[test]
    fn untracked_roles() {
        let mut empty = round(&[]);
        assert!(!empty.is_complete());
        assert!(!empty.attempt_move(Role::A, Coordinate::new(1, 2)));

        let mut solo = round(&[Role::B]);
        assert_eq!(solo.role_state(Role::A), None);
        assert!(solo.attempt_move(Role::B, solo.maze().goal()));
        assert!(solo.is_complete());
    }

    #[test]
    fn outcome_uses_frozen_time() {
        let mut round = RoundLifecycle::with_maze(DifficultyTier::Medium, fixture(), &Role::ALL, 500);
        assert_eq!(round.elapsed_millis(1_500), 1_000);
        round.stop(2_500);
        assert_eq!(
            round.outcome(10_000),
            RoundOutcome {
                tier: DifficultyTier::Medium,
                elapsed_millis: 2_000,
                completed: false
            }
        );
    }
}
