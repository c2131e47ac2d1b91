use serde::Serialize;

use crate::error::ReversiError;

pub const BOARD_SIZE: usize = 8;
pub const NUM_SQUARES: usize = BOARD_SIZE * BOARD_SIZE;

/// One of the two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Black,
    White,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }
}

/// Content of a single board square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    /// Wire encoding used by `Board::to_array`: 0=empty, 1=black, 2=white.
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Black => 1,
            Self::White => 2,
        }
    }
}

impl From<Side> for Cell {
    fn from(side: Side) -> Self {
        match side {
            Side::Black => Self::Black,
            Side::White => Self::White,
        }
    }
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn try_new(row: u8, col: u8) -> Result<Self, ReversiError> {
        if row as usize >= BOARD_SIZE || col as usize >= BOARD_SIZE {
            return Err(ReversiError::OutOfRange { row, col });
        }
        Ok(Self { row, col })
    }

    pub(crate) fn from_index(idx: usize) -> Self {
        debug_assert!(idx < NUM_SQUARES);
        Self {
            row: (idx / BOARD_SIZE) as u8,
            col: (idx % BOARD_SIZE) as u8,
        }
    }

    pub fn index(self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    pub fn is_corner(self) -> bool {
        let last = (BOARD_SIZE - 1) as u8;
        (self.row == 0 || self.row == last) && (self.col == 0 || self.col == last)
    }

    pub fn is_edge(self) -> bool {
        let last = (BOARD_SIZE - 1) as u8;
        self.row == 0 || self.row == last || self.col == 0 || self.col == last
    }
}

/// The most recently applied move, kept for placement/flip animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastMove {
    pub side: Side,
    pub position: Position,
    pub flipped: Vec<Position>,
}

/// Where the session controller currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    AwaitingHumanMove,
    ComputerThinking,
    /// A move or pass has been applied and the next turn is not evaluated yet.
    /// Transient: every session call returns in one of the other phases.
    TurnResolved,
    GameOver,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    /// `None` on a draw.
    pub winner: Option<Side>,
    pub black_count: u8,
    pub white_count: u8,
}

impl GameResult {
    pub fn from_counts(black_count: u8, white_count: u8) -> Self {
        let winner = if black_count > white_count {
            Some(Side::Black)
        } else if white_count > black_count {
            Some(Side::White)
        } else {
            None
        };
        Self {
            winner,
            black_count,
            white_count,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Notifications queued by the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameEvent {
    MoveApplied {
        side: Side,
        position: Position,
        flipped: Vec<Position>,
    },
    Passed {
        side: Side,
    },
    TurnChanged {
        side: Side,
    },
    GameOver(GameResult),
    Restarted {
        human: Side,
        computer: Side,
    },
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Row-major cells, 0=empty, 1=black, 2=white.
    pub board: Vec<u8>,
    pub current_player: Side,
    pub human_side: Side,
    pub computer_side: Side,
    pub black_count: u8,
    pub white_count: u8,
    pub legal_moves: Vec<Position>,
    pub phase: Phase,
    pub is_game_over: bool,
    /// Contract:
    /// - `true` when the previous action was a pass.
    /// - `false` when the previous action was a normal move.
    pub is_pass: bool,
    /// `None` after a restart and after a pass.
    pub last_move: Option<LastMove>,
    pub result: Option<GameResult>,
    pub show_hints: bool,
}
