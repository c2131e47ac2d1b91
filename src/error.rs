use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReversiError {
    #[error("row/col out of range: ({row}, {col})")]
    OutOfRange { row: u8, col: u8 },

    #[error("unknown difficulty: {0:?} (expected easy, medium or hard)")]
    UnknownDifficulty(String),

    #[error("invalid game config: {0}")]
    InvalidConfig(String),

    #[error("it is not the computer's turn")]
    NotComputerTurn,

    #[error("decision belongs to an earlier game (generation {decided}, current {current})")]
    StaleDecision { decided: u64, current: u64 },

    #[error("computer selected an illegal move: ({row}, {col})")]
    IllegalMove { row: u8, col: u8 },
}
