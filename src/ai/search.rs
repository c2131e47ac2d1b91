use crate::ai::evaluate::evaluate;
use crate::board::Board;
use crate::types::Side;

pub const MIN_SCORE: i32 = i32::MIN;
pub const MAX_SCORE: i32 = i32::MAX;

/// Depth-limited minimax with alpha-beta pruning.
///
/// Leaves are always scored from `ai_side`'s point of view, whichever side is
/// to move at that ply; maximizing plies belong to the AI and minimizing plies
/// to its opponent.
pub struct Searcher {
    ai_side: Side,
    nodes: u64,
}

impl Searcher {
    pub fn new(ai_side: Side) -> Self {
        Self { ai_side, nodes: 0 }
    }

    pub fn ai_side(&self) -> Side {
        self.ai_side
    }

    /// Number of positions visited since construction.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Scores `board` with `side` to move and `depth` plies remaining.
    /// A forced pass consumes one ply without placing a disc.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u8,
        side: Side,
        maximizing: bool,
        alpha: i32,
        beta: i32,
    ) -> i32 {
        self.nodes += 1;

        if depth == 0 {
            return evaluate(board, self.ai_side);
        }

        let moves = board.legal_moves(side);
        if moves.is_empty() {
            if !board.has_legal_move(side.opponent()) {
                return evaluate(board, self.ai_side);
            }
            return self.search(board, depth - 1, side.opponent(), !maximizing, alpha, beta);
        }

        let mut alpha = alpha;
        let mut beta = beta;

        if maximizing {
            let mut best = MIN_SCORE;
            for mv in &moves {
                let mut next = *board;
                next.apply(mv, side);
                let score = self.search(&next, depth - 1, side.opponent(), false, alpha, beta);
                best = best.max(score);
                alpha = alpha.max(score);
                if alpha >= beta {
                    break;
                }
            }
            best
        } else {
            let mut best = MAX_SCORE;
            for mv in &moves {
                let mut next = *board;
                next.apply(mv, side);
                let score = self.search(&next, depth - 1, side.opponent(), true, alpha, beta);
                best = best.min(score);
                beta = beta.min(score);
                if alpha >= beta {
                    break;
                }
            }
            best
        }
    }
}
