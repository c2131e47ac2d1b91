pub mod ai;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod types;
pub mod wasm;

pub use board::{Board, Move};
pub use config::{Difficulty, GameConfig};
pub use error::ReversiError;
pub use game::{ComputerDecision, ComputerTurn, GameSession};
pub use types::{Cell, GameEvent, GameResult, GameState, Phase, Position, Side};
