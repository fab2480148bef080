//! Step-piece tables: king, knight and the two pawn tables.

use crate::Bitboard;
use chess_core::{Color, Square};

const KING_STEPS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

const KNIGHT_STEPS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Collects every on-board destination of `steps` from `sq`.
///
/// [`Square::offset`] rejects anything that would leave the board, so a
/// knight on the h-file never "wraps" onto the a-file.
fn step_targets(sq: Square, steps: &[(i8, i8)]) -> Bitboard {
    steps
        .iter()
        .filter_map(|&(drow, dcol)| sq.offset(drow, dcol))
        .collect()
}

pub(super) fn king_table() -> [Bitboard; 64] {
    std::array::from_fn(|i| step_targets(square(i), &KING_STEPS))
}

pub(super) fn knight_table() -> [Bitboard; 64] {
    std::array::from_fn(|i| step_targets(square(i), &KNIGHT_STEPS))
}

/// Diagonal capture squares, indexed `[color][square]`.
pub(super) fn pawn_capture_table() -> [[Bitboard; 64]; 2] {
    Color::BOTH.map(|color| {
        let fwd = color.forward();
        std::array::from_fn(|i| step_targets(square(i), &[(fwd, -1), (fwd, 1)]))
    })
}

/// Forward squares, indexed `[color][square]`: one step, plus a second step
/// from the pawn's starting row. Whether the first step is empty is a
/// property of the live board, so it is checked at lookup time.
pub(super) fn pawn_push_table() -> [[Bitboard; 64]; 2] {
    Color::BOTH.map(|color| {
        let fwd = color.forward();
        std::array::from_fn(|i| {
            let sq = square(i);
            let mut targets = step_targets(sq, &[(fwd, 0)]);
            if sq.row() == color.pawn_row() {
                targets |= step_targets(sq, &[(2 * fwd, 0)]);
            }
            targets
        })
    })
}

#[inline]
fn square(index: usize) -> Square {
    // SAFETY: table builders only pass indices below 64
    unsafe { Square::from_index_unchecked(index as u8) }
}
