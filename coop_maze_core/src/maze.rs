use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Coordinate, map::Grid, tile::TileVariant};

/// Errors produced while reading a maze from its text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeParseError {
    #[error("maze text is empty")]
    Empty,
    #[error("inconsistent width at row {row}: expected {expected}, found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown maze symbol '{symbol}' at ({col}, {row})")]
    UnknownSymbol { symbol: char, col: usize, row: usize },
    #[error("expected exactly one start 'S', found {0}")]
    StartCount(usize),
    #[error("expected exactly one goal 'G', found {0}")]
    GoalCount(usize),
    #[error("border cell ({col}, {row}) is not a wall")]
    OpenBorder { col: usize, row: usize },
}

/// A populated maze: the tile grid plus the shared start and the goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maze {
    tiles: Grid<TileVariant>,
    start: Coordinate,
    goal: Coordinate,
}

impl Maze {
    pub(crate) fn new(tiles: Grid<TileVariant>, start: Coordinate, goal: Coordinate) -> Self {
        Maze { tiles, start, goal }
    }

    pub fn tiles(&self) -> &Grid<TileVariant> {
        &self.tiles
    }

    pub fn start(&self) -> Coordinate {
        self.start
    }

    pub fn goal(&self) -> Coordinate {
        self.goal
    }

    pub fn width(&self) -> usize {
        self.tiles.width()
    }

    pub fn height(&self) -> usize {
        self.tiles.height()
    }

    /// Returns the tile at `at`, or `None` outside the grid.
    pub fn tile(&self, at: Coordinate) -> Option<TileVariant> {
        self.tiles.get(at).copied()
    }

    /// Counts the cells holding `variant`.
    pub fn count(&self, variant: TileVariant) -> usize {
        self.tiles.iter().filter(|&&t| t == variant).count()
    }
}

fn symbol(tile: TileVariant) -> char {
    match tile {
        TileVariant::Floor => '.',
        TileVariant::Wall => '#',
        TileVariant::RoleWallA => 'a',
        TileVariant::RoleWallB => 'b',
        TileVariant::Goal => 'G',
    }
}

/// Renders one line per row. The start cell is drawn as `S`.
impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height() {
            for col in 0..self.width() {
                let at = Coordinate { col, row };
                let c = if at == self.start {
                    'S'
                } else {
                    symbol(self.tiles[at])
                };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Reads a maze from rows of symbols: `#` wall, `.` floor, `a`/`b` role walls,
/// `G` goal and `S` start (a floor cell). Surrounding whitespace on each row is
/// ignored. The border must be solid wall and exactly one start and one goal
/// must be present.
pub fn parse_maze(text: &str) -> Result<Maze, MazeParseError> {
    let lines: Vec<&str> = text
        .trim()
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(MazeParseError::Empty);
    }

    let height = lines.len();
    let width = lines[0].chars().count();
    for (row, line) in lines.iter().enumerate() {
        let found = line.chars().count();
        if found != width {
            return Err(MazeParseError::RaggedRow {
                row,
                expected: width,
                found,
            });
        }
    }

    let mut tiles = Grid::filled(width, height, TileVariant::Wall);
    let mut starts = Vec::new();
    let mut goals = Vec::new();

    for (row, line) in lines.iter().enumerate() {
        for (col, c) in line.chars().enumerate() {
            let at = Coordinate { col, row };
            let tile = match c {
                '#' => TileVariant::Wall,
                '.' => TileVariant::Floor,
                'a' => TileVariant::RoleWallA,
                'b' => TileVariant::RoleWallB,
                'G' => {
                    goals.push(at);
                    TileVariant::Goal
                }
                'S' => {
                    starts.push(at);
                    TileVariant::Floor
                }
                symbol => return Err(MazeParseError::UnknownSymbol { symbol, col, row }),
            };
            if tiles.is_border(at) && tile != TileVariant::Wall {
                return Err(MazeParseError::OpenBorder { col, row });
            }
            tiles[at] = tile;
        }
    }

    let start = match starts.as_slice() {
        [s] => *s,
        other => return Err(MazeParseError::StartCount(other.len())),
    };
    let goal = match goals.as_slice() {
        [g] => *g,
        other => return Err(MazeParseError::GoalCount(other.len())),
    };

    Ok(Maze::new(tiles, start, goal))
}
