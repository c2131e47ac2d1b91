use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use web_time::Instant;

use crate::ai::search::{MAX_SCORE, MIN_SCORE, Searcher};
use crate::board::{Board, Move};
use crate::config::{Difficulty, GameConfig};
use crate::types::Side;

const GREEDY_FLIP_WEIGHT: i32 = 2;
const GREEDY_EDGE_BONUS: i32 = 6;
const GREEDY_CORNER_BONUS: i32 = 80;
const GREEDY_REPLY_PENALTY: i32 = 3;

/// Chooses the computer's move among the current candidates.
pub trait MoveSelector: Send {
    /// Returns `None` only when `candidates` is empty.
    fn select_move(
        &mut self,
        board: &Board,
        side: Side,
        candidates: &[Move],
        config: &GameConfig,
    ) -> Option<Move>;
}

/// Dispatches on [`Difficulty`]: random, greedy or minimax.
#[derive(Debug, Clone)]
pub struct TieredSelector {
    rng: StdRng,
}

impl TieredSelector {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for TieredSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSelector for TieredSelector {
    fn select_move(
        &mut self,
        board: &Board,
        side: Side,
        candidates: &[Move],
        config: &GameConfig,
    ) -> Option<Move> {
        match config.difficulty {
            Difficulty::Easy => candidates.choose(&mut self.rng).copied(),
            Difficulty::Medium => pick_greedy(board, side, candidates),
            Difficulty::Hard => pick_minimax(board, side, candidates, config.effective_depth()),
        }
    }
}

/// One-ply heuristic: flips, edge and corner bonuses, minus the replies left
/// to the opponent. First candidate wins ties.
pub fn pick_greedy(board: &Board, side: Side, candidates: &[Move]) -> Option<Move> {
    let mut best: Option<(Move, i32)> = None;

    for mv in candidates {
        let score = greedy_score(board, side, mv);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((*mv, score));
        }
    }

    best.map(|(mv, _)| mv)
}

pub fn greedy_score(board: &Board, side: Side, mv: &Move) -> i32 {
    let mut next = *board;
    next.apply(mv, side);
    let replies = next.legal_mask(side.opponent()).count_ones() as i32;

    let mut score = mv.flip_count() as i32 * GREEDY_FLIP_WEIGHT;
    if mv.is_edge() {
        score += GREEDY_EDGE_BONUS;
    }
    if mv.is_corner() {
        score += GREEDY_CORNER_BONUS;
    }
    score - replies * GREEDY_REPLY_PENALTY
}

/// Scores every candidate with a minimax search of `depth` plies that starts
/// with the opponent minimizing. First candidate wins ties.
pub fn pick_minimax(board: &Board, side: Side, candidates: &[Move], depth: u8) -> Option<Move> {
    let started = Instant::now();
    let mut searcher = Searcher::new(side);
    let mut best: Option<(Move, i32)> = None;

    for mv in candidates {
        let mut next = *board;
        next.apply(mv, side);
        let score = searcher.search(&next, depth, side.opponent(), false, MIN_SCORE, MAX_SCORE);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((*mv, score));
        }
    }

    if let Some((mv, score)) = best {
        log::debug!(
            "minimax depth {depth}: {:?} scored {score} after {} nodes in {:?}",
            mv.position(),
            searcher.nodes(),
            started.elapsed()
        );
    }

    best.map(|(mv, _)| mv)
}
