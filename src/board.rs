use crate::types::{BOARD_SIZE, Cell, NUM_SQUARES, Position, Side};

const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// A legal placement together with the discs it captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    position: Position,
    flips: u64,
}

impl Move {
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn row(&self) -> u8 {
        self.position.row
    }

    pub fn col(&self) -> u8 {
        self.position.col
    }

    pub fn flip_mask(&self) -> u64 {
        self.flips
    }

    pub fn flip_count(&self) -> u32 {
        self.flips.count_ones()
    }

    /// Captured squares in row-major order.
    pub fn flipped(&self) -> Vec<Position> {
        bitmask_to_positions(self.flips)
    }

    pub fn is_corner(&self) -> bool {
        self.position.is_corner()
    }

    pub fn is_edge(&self) -> bool {
        self.position.is_edge()
    }
}

/// Reversi board state represented by two bitboards.
///
/// `Board` is `Copy`; search code clones by value and never touches the
/// caller's board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    black: u64,
    white: u64,
}

impl Board {
    /// Creates the initial board:
    /// d4=white, e4=black, d5=black, e5=white.
    pub fn new() -> Self {
        Self {
            black: bit(28) | bit(35),
            white: bit(27) | bit(36),
        }
    }

    /// Builds a board from raw occupancy masks (bit index = `row * 8 + col`).
    /// White bits that collide with black bits are dropped.
    pub fn from_bitboards(black: u64, white: u64) -> Self {
        Self {
            black,
            white: white & !black,
        }
    }

    pub fn cell(&self, pos: Position) -> Cell {
        let square = bit(pos.index());
        if (self.black & square) != 0 {
            Cell::Black
        } else if (self.white & square) != 0 {
            Cell::White
        } else {
            Cell::Empty
        }
    }

    /// Flip mask for a hypothetical placement of `side` at `pos`.
    /// Zero when the square is occupied or nothing would be captured.
    pub fn flips_for(&self, pos: Position, side: Side) -> u64 {
        let (me, opp) = self.split(side);
        collect_flips(pos.index(), me, opp)
    }

    /// Returns the legal move mask for the given side.
    pub fn legal_mask(&self, side: Side) -> u64 {
        let (me, opp) = self.split(side);
        let occupied = me | opp;
        let mut legal = 0u64;

        for pos in 0..NUM_SQUARES {
            let move_bit = bit(pos);
            if (occupied & move_bit) != 0 {
                continue;
            }
            if collect_flips(pos, me, opp) != 0 {
                legal |= move_bit;
            }
        }

        legal
    }

    /// Legal moves for `side` in row-major order, each with its flip set.
    pub fn legal_moves(&self, side: Side) -> Vec<Move> {
        let (me, opp) = self.split(side);
        let occupied = me | opp;

        (0..NUM_SQUARES)
            .filter(|&pos| (occupied & bit(pos)) == 0)
            .filter_map(|pos| {
                let flips = collect_flips(pos, me, opp);
                (flips != 0).then(|| Move {
                    position: Position::from_index(pos),
                    flips,
                })
            })
            .collect()
    }

    pub fn has_legal_move(&self, side: Side) -> bool {
        self.legal_mask(side) != 0
    }

    /// Places `side` on the move's square and converts its flip set.
    /// The move is trusted; obtain it from `legal_moves` for this board.
    pub fn apply(&mut self, mv: &Move, side: Side) {
        let move_bit = bit(mv.position.index());
        match side {
            Side::Black => {
                self.black |= move_bit | mv.flips;
                self.white &= !(move_bit | mv.flips);
            }
            Side::White => {
                self.white |= move_bit | mv.flips;
                self.black &= !(move_bit | mv.flips);
            }
        }
    }

    /// Returns `(black_count, white_count)`.
    pub fn count(&self) -> (u8, u8) {
        (self.black.count_ones() as u8, self.white.count_ones() as u8)
    }

    pub fn disc_count(&self, side: Side) -> u8 {
        let (me, _) = self.split(side);
        me.count_ones() as u8
    }

    /// Returns the number of empty squares.
    pub fn empty_count(&self) -> u8 {
        let (black_count, white_count) = self.count();
        NUM_SQUARES as u8 - black_count - white_count
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Iterates the squares owned by `side` in row-major order.
    pub fn discs(&self, side: Side) -> impl Iterator<Item = Position> {
        let (me, _) = self.split(side);
        BitIter(me).map(Position::from_index)
    }

    /// Converts board to `[u8; 64]` where 0=empty, 1=black, 2=white.
    pub fn to_array(&self) -> [u8; NUM_SQUARES] {
        let mut board = [0u8; NUM_SQUARES];
        for (pos, cell) in board.iter_mut().enumerate() {
            *cell = self.cell(Position::from_index(pos)).code();
        }
        board
    }

    fn split(&self, side: Side) -> (u64, u64) {
        match side {
            Side::Black => (self.black, self.white),
            Side::White => (self.white, self.black),
        }
    }

    /// Parses an 8-line diagram of `B`, `W` and `.`.
    #[cfg(test)]
    pub(crate) fn from_diagram(rows: [&str; BOARD_SIZE]) -> Self {
        let mut black = 0u64;
        let mut white = 0u64;
        for (row, line) in rows.iter().enumerate() {
            assert_eq!(line.len(), BOARD_SIZE, "row {row} must have 8 cells");
            for (col, ch) in line.chars().enumerate() {
                let square = bit(row * BOARD_SIZE + col);
                match ch {
                    'B' => black |= square,
                    'W' => white |= square,
                    '.' => {}
                    other => panic!("unexpected cell {other:?}"),
                }
            }
        }
        Self::from_bitboards(black, white)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_flips(pos: usize, me: u64, opp: u64) -> u64 {
    if pos >= NUM_SQUARES {
        return 0;
    }

    let move_bit = bit(pos);
    if ((me | opp) & move_bit) != 0 {
        return 0;
    }

    let (row, col) = pos_to_row_col(pos);
    let mut flips = 0u64;

    for (dr, dc) in DIRECTIONS {
        let mut r = row + dr;
        let mut c = col + dc;
        let mut line = 0u64;

        while in_bounds(r, c) {
            let square = bit((r as usize) * BOARD_SIZE + c as usize);
            if (opp & square) != 0 {
                line |= square;
            } else {
                // A run only counts when it ends on our own disc.
                if (me & square) != 0 {
                    flips |= line;
                }
                break;
            }

            r += dr;
            c += dc;
        }
    }

    flips
}

pub(crate) fn bitmask_to_positions(mask: u64) -> Vec<Position> {
    BitIter(mask).map(Position::from_index).collect()
}

struct BitIter(u64);

impl Iterator for BitIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let idx = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(idx)
    }
}

fn bit(pos: usize) -> u64 {
    if pos < NUM_SQUARES { 1u64 << pos } else { 0 }
}

fn pos_to_row_col(pos: usize) -> (i32, i32) {
    ((pos / BOARD_SIZE) as i32, (pos % BOARD_SIZE) as i32)
}

fn in_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}
