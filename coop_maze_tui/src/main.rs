use anyhow::{Context, Result};
use clap::Parser;
use coop_maze_core::{
    Coordinate, Direction as Move, Role,
    clock::SystemClock,
    config::{ROUND_TIME_LIMIT_MS, TICK_INTERVAL_MS},
    scores::JsonFileScoreStore,
    session::{GameResult, GameSession, SessionConfig, SessionState},
    solver::shortest_path,
    tile::TileVariant,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, Event, KeyCode, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about = "Two-player cooperative maze race", long_about = None)]
struct Args {
    /// Team name recorded on the scoreboard
    #[arg(short, long, default_value = "Team")]
    team: String,

    /// Seed for maze generation; omit for a random game
    #[arg(short, long)]
    seed: Option<u64>,

    /// Scoreboard file
    #[arg(long, value_name = "FILE", default_value = "scores.json")]
    scores: PathBuf,

    /// Log file; verbosity is read from RUST_LOG
    #[arg(long, value_name = "FILE", default_value = "coop_maze.log")]
    log_file: PathBuf,
}

struct App {
    /// The game state machine.
    session: GameSession,
    team: String,
    /// Draw each role's shortest path to the goal.
    show_hint: bool,
    notice: Option<String>,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(args: &Args) -> Self {
        let session = GameSession::new(
            SessionConfig { seed: args.seed },
            Box::new(SystemClock::new()),
            Box::new(JsonFileScoreStore::new(&args.scores)),
        );
        let notice = session
            .team_name_taken(&args.team)
            .then(|| format!("'{}' is already on the scoreboard", args.team));

        App {
            session,
            team: args.team.clone(),
            show_hint: false,
            notice,
            should_quit: false,
        }
    }

    /// Periodic timer check.
    fn tick(&mut self) {
        self.session.tick();
    }

    fn on_key(&mut self, code: KeyCode) {
        let state = self.session.state();
        match normalize(code) {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => match state {
                SessionState::Menu => self.should_quit = true,
                SessionState::Scoreboard => {
                    self.session.back();
                }
                _ => self.session.stop_game(),
            },
            KeyCode::Enter => match state {
                SessionState::Menu | SessionState::GameOver => {
                    self.notice = None;
                    self.session.start_game(&self.team);
                }
                SessionState::RoundComplete => {
                    self.session.start_next_round();
                }
                _ => {}
            },
            KeyCode::Tab => {
                self.session.request_scoreboard();
            }
            KeyCode::Char('h') => self.show_hint = !self.show_hint,
            code => {
                if let Some((role, direction)) = movement(code) {
                    self.session.handle_input(role, direction);
                }
            }
        }
    }
}

/// Letter keys act the same with Shift or Caps Lock held.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        code => code,
    }
}

/// W/A/S/D steer role A, the arrow keys steer role B. Expects a normalized
/// key code.
fn movement(code: KeyCode) -> Option<(Role, Move)> {
    match code {
        KeyCode::Char('w') => Some((Role::A, Move::Up)),
        KeyCode::Char('s') => Some((Role::A, Move::Down)),
        KeyCode::Char('a') => Some((Role::A, Move::Left)),
        KeyCode::Char('d') => Some((Role::A, Move::Right)),
        KeyCode::Up => Some((Role::B, Move::Up)),
        KeyCode::Down => Some((Role::B, Move::Down)),
        KeyCode::Left => Some((Role::B, Move::Left)),
        KeyCode::Right => Some((Role::B, Move::Right)),
        _ => None,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;
    info!(team = %args.team, seed = ?args.seed, scores = %args.scores.display(), "Starting");

    let mut terminal = setup_terminal()?;
    let mut app = App::new(&args);
    let res = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;

    res
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(TICK_INTERVAL_MS);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick();
            last_tick = Instant::now();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn seconds(millis: u64) -> String {
    format!("{}.{}s", millis / 1000, (millis % 1000) / 100)
}

fn ui(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // map or menu
            Constraint::Length(3), // status
            Constraint::Length(1), // help
        ])
        .split(frame.area());

    match app.session.state() {
        SessionState::Menu => render_menu(frame, layout[0], app),
        SessionState::Scoreboard => render_scoreboard(frame, layout[0], app),
        _ => render_map(frame, layout[0], app),
    }
    render_status(frame, layout[1], app);

    let help = match app.session.state() {
        SessionState::Menu => "Enter: start  Tab: scoreboard  q/Esc: quit",
        SessionState::Playing => "A: W/A/S/D  B: arrows  h: hint  Esc: stop  q: quit",
        SessionState::RoundComplete => "Enter: next round  Esc: menu  q: quit",
        SessionState::GameOver => "Enter: play again  Esc: menu  q: quit",
        SessionState::Scoreboard => "Esc: back  q: quit",
    };
    frame.render_widget(
        Paragraph::new(help).alignment(Alignment::Center),
        layout[2],
    );
}

fn render_menu(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from("Co-op Maze".bold()),
        Line::from(""),
        Line::from(format!("Team: {}", app.team)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Player A", Style::default().fg(Color::Red)),
            Span::raw(" walks through red walls, "),
            Span::styled("player B", Style::default().fg(Color::Blue)),
            Span::raw(" through blue ones."),
        ]),
        Line::from(format!(
            "Bring both to the goal within {} per round.",
            seconds(ROUND_TIME_LIMIT_MS)
        )),
    ];
    if let Some(notice) = &app.notice {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        )));
    }

    let menu = Paragraph::new(lines)
        .block(Block::default().title("Menu").borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(menu, area);
}

fn render_scoreboard(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .session
        .scoreboard()
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            ListItem::new(format!(
                "{:>2}. {:<20} {}",
                rank + 1,
                entry.team_name,
                seconds(entry.total_time_millis)
            ))
        })
        .collect();

    let list = if items.is_empty() {
        List::new(vec![ListItem::new("No scores yet")])
    } else {
        List::new(items)
    };
    frame.render_widget(
        list.block(Block::default().borders(Borders::ALL).title("Scoreboard")),
        area,
    );
}

/// Renders the maze with both roles and, optionally, their paths to the goal.
fn render_map(frame: &mut Frame, area: Rect, app: &App) {
    let Some(round) = app.session.round() else {
        return;
    };
    let maze = round.maze();
    let pos_a = round.role_state(Role::A).map(|s| s.position);
    let pos_b = round.role_state(Role::B).map(|s| s.position);

    let hints: Vec<Coordinate> = if app.show_hint {
        [(Role::A, pos_a), (Role::B, pos_b)]
            .into_iter()
            .filter_map(|(role, pos)| shortest_path(maze, pos?, maze.goal(), role))
            .flatten()
            .collect()
    } else {
        Vec::new()
    };

    let mut lines: Vec<Line> = Vec::with_capacity(maze.height());
    for row in 0..maze.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(maze.width() * 2);
        for col in 0..maze.width() {
            let at = Coordinate { col, row };
            let span = match (pos_a == Some(at), pos_b == Some(at)) {
                (true, true) => Span::styled("**", Style::default().fg(Color::Magenta).bold()),
                (true, false) => Span::styled("A ", Style::default().fg(Color::Red).bold()),
                (false, true) => Span::styled("B ", Style::default().fg(Color::Blue).bold()),
                (false, false) => match maze.tile(at).unwrap_or(TileVariant::Wall) {
                    TileVariant::Wall => Span::styled("██", Style::default().fg(Color::DarkGray)),
                    TileVariant::RoleWallA => Span::styled("▓▓", Style::default().fg(Color::Red)),
                    TileVariant::RoleWallB => Span::styled("▓▓", Style::default().fg(Color::Blue)),
                    TileVariant::Goal => Span::styled("GG", Style::default().fg(Color::Green).bold()),
                    TileVariant::Floor if hints.contains(&at) => {
                        Span::styled("· ", Style::default().fg(Color::Yellow))
                    }
                    TileVariant::Floor => Span::raw("  "),
                },
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let title = format!("{:?} maze", round.tier());
    let map = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(map, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let session = &app.session;
    let goal_mark = |role| {
        session
            .round()
            .and_then(|r| r.role_state(role))
            .map_or("-", |s| if s.reached_goal { "at goal" } else { "searching" })
    };

    let message = match (session.state(), session.result()) {
        (SessionState::RoundComplete, _) => format!(
            "Round cleared in {}! Total so far {}.",
            seconds(session.history().last().map_or(0, |o| o.elapsed_millis)),
            seconds(session.total_elapsed_millis())
        ),
        (SessionState::GameOver, Some(GameResult::Won)) => format!(
            "You escaped every maze! Total time {}.",
            seconds(session.total_elapsed_millis())
        ),
        (SessionState::GameOver, _) => "Time's up. Game over.".to_string(),
        (SessionState::Playing, _) => format!(
            "Time left {}  |  A: {}  B: {}",
            seconds(session.remaining_millis()),
            goal_mark(Role::A),
            goal_mark(Role::B)
        ),
        _ => String::new(),
    };

    let status = Paragraph::new(message).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} | {:?}", app.team, session.tier())),
    );
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_letters_match_lowercase() {
        assert_eq!(movement(normalize(KeyCode::Char('W'))), Some((Role::A, Move::Up)));
        assert_eq!(movement(normalize(KeyCode::Char('A'))), Some((Role::A, Move::Left)));
        assert_eq!(movement(normalize(KeyCode::Char('S'))), Some((Role::A, Move::Down)));
        assert_eq!(movement(normalize(KeyCode::Char('D'))), Some((Role::A, Move::Right)));
        assert_eq!(normalize(KeyCode::Char('Q')), KeyCode::Char('q'));
        assert_eq!(normalize(KeyCode::Char('H')), KeyCode::Char('h'));
    }

    #[test]
    fn non_letter_keys_pass_through() {
        assert_eq!(normalize(KeyCode::Up), KeyCode::Up);
        assert_eq!(movement(normalize(KeyCode::Left)), Some((Role::B, Move::Left)));
        assert_eq!(movement(normalize(KeyCode::Char('x'))), None);
    }
}
