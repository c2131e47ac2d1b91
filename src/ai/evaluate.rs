use crate::board::Board;
use crate::types::{BOARD_SIZE, Side};

const MOBILITY_WEIGHT: i32 = 4;
const DISC_WEIGHT: i32 = 2;

// Corners are stable; the squares touching them hand the corner away.
#[rustfmt::skip]
const POSITIONAL_WEIGHTS: [[i32; BOARD_SIZE]; BOARD_SIZE] = [
    [120, -20, 20,  5,  5, 20, -20, 120],
    [-20, -40, -5, -5, -5, -5, -40, -20],
    [ 20,  -5, 15,  3,  3, 15,  -5,  20],
    [  5,  -5,  3,  3,  3,  3,  -5,   5],
    [  5,  -5,  3,  3,  3,  3,  -5,   5],
    [ 20,  -5, 15,  3,  3, 15,  -5,  20],
    [-20, -40, -5, -5, -5, -5, -40, -20],
    [120, -20, 20,  5,  5, 20, -20, 120],
];

/// Static score of `board`, higher is better for `side`.
///
/// Combines the positional table, the mobility difference (x4) and the disc
/// difference (x2).
pub fn evaluate(board: &Board, side: Side) -> i32 {
    let opponent = side.opponent();

    let positional = positional_sum(board, side) - positional_sum(board, opponent);
    let mobility = board.legal_mask(side).count_ones() as i32
        - board.legal_mask(opponent).count_ones() as i32;
    let disc_diff = board.disc_count(side) as i32 - board.disc_count(opponent) as i32;

    positional + mobility * MOBILITY_WEIGHT + disc_diff * DISC_WEIGHT
}

fn positional_sum(board: &Board, side: Side) -> i32 {
    board
        .discs(side)
        .map(|pos| POSITIONAL_WEIGHTS[pos.row as usize][pos.col as usize])
        .sum()
}
