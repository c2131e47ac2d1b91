use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ReversiError;

pub const MIN_SEARCH_DEPTH: u8 = 2;
pub const MAX_SEARCH_DEPTH: u8 = 5;
pub const DEFAULT_SEARCH_DEPTH: u8 = 3;

/// Decision procedure used for the computer side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Uniformly random legal move.
    Easy,
    /// Greedy one-ply heuristic.
    #[default]
    Medium,
    /// Minimax with alpha-beta pruning.
    Hard,
}

impl Difficulty {
    /// Like `from_str`, but unrecognized tiers fall back to `Hard`.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_else(|err: ReversiError| {
            log::warn!("{err}; falling back to hard");
            Self::Hard
        })
    }
}

impl FromStr for Difficulty {
    type Err = ReversiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ReversiError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        };
        f.write_str(name)
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Settings the presentation layer can change between turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub difficulty: Difficulty,
    /// Raw value from the host; see [`GameConfig::effective_depth`].
    pub search_depth: u8,
    /// Presentation-only flag, never read by the engine.
    pub show_hints: bool,
}

impl GameConfig {
    /// Search depth clamped to `MIN_SEARCH_DEPTH..=MAX_SEARCH_DEPTH`.
    pub fn effective_depth(&self) -> u8 {
        self.search_depth.clamp(MIN_SEARCH_DEPTH, MAX_SEARCH_DEPTH)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            search_depth: DEFAULT_SEARCH_DEPTH,
            show_hints: true,
        }
    }
}
