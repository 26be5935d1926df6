//! Multi-round game session.
//!
//! A [`GameSession`] walks a team through the three difficulty tiers. It owns
//! the current [`RoundLifecycle`], accumulates the time of completed rounds and
//! reports a won game to the injected [`ScoreStore`]. Every operation is a
//! synchronous call; commands that are not valid in the current
//! [`SessionState`] are ignored and return `false`.

use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    DifficultyTier, Direction, Role,
    clock::Clock,
    config::{ROUND_TIME_LIMIT_MS, SCOREBOARD_LIMIT},
    round::{RoundLifecycle, RoundOutcome},
    scores::{ScoreEntry, ScoreStore},
};

/// What the front-end may currently do. Only `Playing` accepts movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Menu,
    Playing,
    RoundComplete,
    GameOver,
    Scoreboard,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Seed for maze generation. `None` seeds from the operating system.
    pub seed: Option<u64>,
}

pub struct GameSession {
    state: SessionState,
    tier: DifficultyTier,
    team: Option<String>,
    round: Option<RoundLifecycle>,
    history: Vec<RoundOutcome>,
    total_elapsed_millis: u64,
    result: Option<GameResult>,
    scoreboard: Vec<ScoreEntry>,
    rng: StdRng,
    clock: Box<dyn Clock>,
    scores: Box<dyn ScoreStore>,
}

impl GameSession {
    pub fn new(config: SessionConfig, clock: Box<dyn Clock>, scores: Box<dyn ScoreStore>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        GameSession {
            state: SessionState::Menu,
            tier: DifficultyTier::Easy,
            team: None,
            round: None,
            history: Vec::new(),
            total_elapsed_millis: 0,
            result: None,
            scoreboard: Vec::new(),
            rng,
            clock,
            scores,
        }
    }

    /// Starts a new game at `Easy` for `team`. Valid from `Menu` and `GameOver`.
    pub fn start_game(&mut self, team: &str) -> bool {
        if !matches!(self.state, SessionState::Menu | SessionState::GameOver) {
            return false;
        }
        self.team = Some(team.to_string());
        self.tier = DifficultyTier::Easy;
        self.history.clear();
        self.total_elapsed_millis = 0;
        self.result = None;
        self.begin_round();
        info!(team, "Game started");
        true
    }

    /// Advances one tier (staying at `Hard`) and starts the next round.
    /// Valid from `RoundComplete`.
    pub fn start_next_round(&mut self) -> bool {
        if self.state != SessionState::RoundComplete {
            return false;
        }
        self.tier = self.tier.next();
        self.begin_round();
        true
    }

    fn begin_round(&mut self) {
        let now = self.clock.now_millis();
        self.round = Some(RoundLifecycle::start(self.tier, &mut self.rng, now));
        self.state = SessionState::Playing;
        info!(tier = ?self.tier, "Round started");
    }

    /// Moves `role` one cell in `direction`. Returns whether the move was
    /// accepted; input outside `Playing` is ignored.
    ///
    /// The time limit is checked first, so a move arriving after expiry ends
    /// the round instead of being applied.
    pub fn handle_input(&mut self, role: Role, direction: Direction) -> bool {
        if self.state != SessionState::Playing || self.tick() {
            return false;
        }
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        let Some(current) = round.role_state(role).map(|s| s.position) else {
            return false;
        };
        let Some(target) = current.step(direction) else {
            return false;
        };

        let accepted = round.attempt_move(role, target);
        if accepted && round.is_complete() {
            self.complete_round();
        }
        accepted
    }

    /// Periodic timer check. Ends the round as lost once the time limit is
    /// reached. Returns `true` only on the call that performed that
    /// transition; repeated calls are harmless.
    pub fn tick(&mut self) -> bool {
        if self.state != SessionState::Playing {
            return false;
        }
        let now = self.clock.now_millis();
        let Some(round) = self.round.as_mut() else {
            return false;
        };
        if round.is_complete() || round.elapsed_millis(now) < ROUND_TIME_LIMIT_MS {
            return false;
        }

        round.stop(now);
        let outcome = round.outcome(now);
        self.history.push(outcome);
        self.state = SessionState::GameOver;
        self.result = Some(GameResult::Lost);
        info!(tier = ?outcome.tier, elapsed = outcome.elapsed_millis, "Round timed out");
        true
    }

    fn complete_round(&mut self) {
        let now = self.clock.now_millis();
        let Some(round) = self.round.as_mut() else {
            return;
        };
        round.stop(now);
        let outcome = round.outcome(now);
        self.history.push(outcome);
        self.total_elapsed_millis += outcome.elapsed_millis;
        info!(
            tier = ?outcome.tier,
            elapsed = outcome.elapsed_millis,
            total = self.total_elapsed_millis,
            "Round completed"
        );

        if outcome.tier == DifficultyTier::Hard {
            self.state = SessionState::GameOver;
            self.result = Some(GameResult::Won);
            self.record_win();
        } else {
            self.state = SessionState::RoundComplete;
        }
    }

    fn record_win(&mut self) {
        let Some(team) = self.team.as_deref() else {
            return;
        };
        info!(team, total = self.total_elapsed_millis, "Game won");
        if let Err(e) = self.scores.save(team, self.total_elapsed_millis) {
            warn!(error = %e, team, "Failed to save score");
        }
    }

    /// Abandons whatever is in progress and returns to `Menu`. The active
    /// round, if any, is dropped without recording an outcome.
    pub fn stop_game(&mut self) {
        if let Some(mut round) = self.round.take() {
            round.stop(self.clock.now_millis());
            debug!(tier = ?round.tier(), "Active round discarded");
        }
        if self.state != SessionState::Menu {
            info!(from = ?self.state, "Game stopped");
        }
        self.state = SessionState::Menu;
    }

    /// Shows the best times. Valid from `Menu`; a failing store yields an
    /// empty board.
    pub fn request_scoreboard(&mut self) -> bool {
        if self.state != SessionState::Menu {
            return false;
        }
        self.scoreboard = self.scores.top_scores(SCOREBOARD_LIMIT).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load scoreboard");
            Vec::new()
        });
        self.state = SessionState::Scoreboard;
        true
    }

    /// Leaves the scoreboard for `Menu`.
    pub fn back(&mut self) -> bool {
        if self.state != SessionState::Scoreboard {
            return false;
        }
        self.state = SessionState::Menu;
        true
    }

    /// Whether a team of this name already has a saved score. Store failures
    /// count as "not taken".
    pub fn team_name_taken(&self, team: &str) -> bool {
        self.scores.name_exists(team).unwrap_or_else(|e| {
            warn!(error = %e, team, "Failed to check team name");
            false
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    pub fn round(&self) -> Option<&RoundLifecycle> {
        self.round.as_ref()
    }

    pub fn history(&self) -> &[RoundOutcome] {
        &self.history
    }

    /// Sum of the elapsed times of completed rounds.
    pub fn total_elapsed_millis(&self) -> u64 {
        self.total_elapsed_millis
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn scoreboard(&self) -> &[ScoreEntry] {
        &self.scoreboard
    }

    /// Elapsed time of the current round, frozen once the round has ended.
    pub fn elapsed_millis(&self) -> u64 {
        self.round
            .as_ref()
            .map_or(0, |r| r.elapsed_millis(self.clock.now_millis()))
    }

    pub fn remaining_millis(&self) -> u64 {
        ROUND_TIME_LIMIT_MS.saturating_sub(self.elapsed_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, scores::InMemoryScoreStore};

    fn session() -> (GameSession, ManualClock) {
        let clock = ManualClock::new(0);
        let session = GameSession::new(
            SessionConfig { seed: Some(11) },
            Box::new(clock.clone()),
            Box::new(InMemoryScoreStore::new()),
        );
        (session, clock)
    }

    #[test]
    fn starts_in_menu_and_ignores_input() {
        let (mut session, _) = session();
        assert_eq!(session.state(), SessionState::Menu);
        assert!(!session.handle_input(Role::A, Direction::Right));
        assert!(!session.start_next_round());
        assert!(!session.back());
        assert!(session.round().is_none());
    }

    #[test]
    fn start_game_enters_easy_round() {
        let (mut session, _) = session();
        assert!(session.start_game("owls"));
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.tier(), DifficultyTier::Easy);
        assert_eq!(session.team(), Some("owls"));
        let maze = session.round().unwrap().maze();
        assert_eq!((maze.width(), maze.height()), (10, 10));
        // Not while playing.
        assert!(!session.start_game("cats"));
        assert!(!session.request_scoreboard());
    }

    #[test]
    fn tick_is_idempotent() {
        let (mut session, clock) = session();
        session.start_game("owls");
        clock.set(ROUND_TIME_LIMIT_MS - 1);
        assert!(!session.tick());
        assert_eq!(session.remaining_millis(), 1);

        clock.set(ROUND_TIME_LIMIT_MS);
        assert!(session.tick());
        assert!(!session.tick());
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.result(), Some(GameResult::Lost));
        assert_eq!(
            session.history(),
            &[RoundOutcome {
                tier: DifficultyTier::Easy,
                elapsed_millis: ROUND_TIME_LIMIT_MS,
                completed: false
            }]
        );
        assert_eq!(session.total_elapsed_millis(), 0);

        clock.advance(5_000);
        assert_eq!(session.elapsed_millis(), ROUND_TIME_LIMIT_MS);
    }

    #[test]
    fn late_move_times_out_instead() {
        let (mut session, clock) = session();
        session.start_game("owls");
        clock.set(ROUND_TIME_LIMIT_MS + 10);
        assert!(!session.handle_input(Role::A, Direction::Right));
        assert!(!session.handle_input(Role::A, Direction::Down));
        assert_eq!(session.state(), SessionState::GameOver);
        assert_eq!(session.total_elapsed_millis(), 0);
    }

    #[test]
    fn stop_game_discards_round() {
        let (mut session, _) = session();
        session.start_game("owls");
        session.stop_game();
        assert_eq!(session.state(), SessionState::Menu);
        assert!(session.round().is_none());
        assert!(session.history().is_empty());
        assert_eq!(session.elapsed_millis(), 0);
        // Stopping from the menu is a no-op transition.
        session.stop_game();
        assert_eq!(session.state(), SessionState::Menu);
    }

    #[test]
    fn scoreboard_round_trip() {
        let (mut session, _) = session();
        assert!(session.request_scoreboard());
        assert_eq!(session.state(), SessionState::Scoreboard);
        assert!(session.scoreboard().is_empty());
        assert!(!session.handle_input(Role::B, Direction::Down));
        assert!(session.back());
        assert_eq!(session.state(), SessionState::Menu);
    }
}
