//! Static evaluation.
//!
//! Material plus piece-square tables, with the king table and slider
//! mobility weighting chosen by [`GamePhase`].

use chess_core::{Color, Piece, PieceKind, Square};
use chess_engine::{pseudo_moves, Game};

/// Piece values in centipawns
pub const PAWN_VALUE: i32 = 100;
pub const KNIGHT_VALUE: i32 = 320;
pub const BISHOP_VALUE: i32 = 330;
pub const ROOK_VALUE: i32 = 500;
pub const QUEEN_VALUE: i32 = 900;

/// Non-pawn material (both sides, kings excluded) at or below which the
/// position counts as an endgame.
const ENDGAME_MATERIAL: i32 = 2 * (ROOK_VALUE + BISHOP_VALUE);

/// Moves after which the opening is over regardless of material.
const OPENING_MOVES: u32 = 10;

/// Material value of a piece kind. The king has none.
pub const fn piece_value(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => PAWN_VALUE,
        PieceKind::Knight => KNIGHT_VALUE,
        PieceKind::Bishop => BISHOP_VALUE,
        PieceKind::Rook => ROOK_VALUE,
        PieceKind::Queen => QUEEN_VALUE,
        PieceKind::King => 0,
    }
}

// Piece-square tables from White's point of view, rank 8 first.

#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
    -50,-40,-30,-30,-30,-30,-40,-50,
    -40,-20,  0,  0,  0,  0,-20,-40,
    -30,  0, 10, 15, 15, 10,  0,-30,
    -30,  5, 15, 20, 20, 15,  5,-30,
    -30,  0, 15, 20, 20, 15,  0,-30,
    -30,  5, 10, 15, 15, 10,  5,-30,
    -40,-20,  0,  5,  5,  0,-20,-40,
    -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
    -20,-10,-10,-10,-10,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5, 10, 10,  5,  0,-10,
    -10,  5,  5, 10, 10,  5,  5,-10,
    -10,  0, 10, 10, 10, 10,  0,-10,
    -10, 10, 10, 10, 10, 10, 10,-10,
    -10,  5,  0,  0,  0,  0,  5,-10,
    -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
    -20,-10,-10, -5, -5,-10,-10,-20,
    -10,  0,  0,  0,  0,  0,  0,-10,
    -10,  0,  5,  5,  5,  5,  0,-10,
     -5,  0,  5,  5,  5,  5,  0, -5,
      0,  0,  5,  5,  5,  5,  0, -5,
    -10,  5,  5,  5,  5,  5,  0,-10,
    -10,  0,  5,  0,  0,  0,  0,-10,
    -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_MIDDLEGAME_PST: [i32; 64] = [
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -30,-40,-40,-50,-50,-40,-40,-30,
    -20,-30,-30,-40,-40,-30,-30,-20,
    -10,-20,-20,-20,-20,-20,-20,-10,
     20, 20,  0,  0,  0,  0, 20, 20,
     20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_ENDGAME_PST: [i32; 64] = [
    -50,-40,-30,-20,-20,-30,-40,-50,
    -30,-20,-10,  0,  0,-10,-20,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 30, 40, 40, 30,-10,-30,
    -30,-10, 20, 30, 30, 20,-10,-30,
    -30,-30,  0,  0,  0,  0,-30,-30,
    -50,-30,-30,-30,-30,-30,-30,-50,
];

/// Coarse stage of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

impl GamePhase {
    /// Classifies a position by non-pawn material and move number.
    pub fn of(game: &Game) -> Self {
        let material: i32 = game
            .board()
            .pieces()
            .iter()
            .filter(|p| p.kind != PieceKind::Pawn)
            .map(|p| piece_value(p.kind))
            .sum();

        if material <= ENDGAME_MATERIAL {
            GamePhase::Endgame
        } else if game.fullmove_number() <= OPENING_MOVES {
            GamePhase::Opening
        } else {
            GamePhase::Middlegame
        }
    }

    /// Centipawns per reachable square for rooks, bishops and queens.
    pub const fn mobility_weight(self) -> i32 {
        match self {
            GamePhase::Opening => 1,
            GamePhase::Middlegame => 2,
            GamePhase::Endgame => 3,
        }
    }
}

/// Index into a rank-8-first table for a piece of `color` on `sq`.
#[inline]
fn table_index(color: Color, sq: Square) -> usize {
    match color {
        Color::White => (sq.index() ^ 56) as usize,
        Color::Black => sq.index() as usize,
    }
}

fn positional(piece: &Piece, phase: GamePhase) -> i32 {
    let idx = table_index(piece.color, piece.square);
    match piece.kind {
        PieceKind::Pawn => PAWN_PST[idx],
        PieceKind::Knight => KNIGHT_PST[idx],
        PieceKind::Bishop => BISHOP_PST[idx],
        PieceKind::Rook => ROOK_PST[idx],
        PieceKind::Queen => QUEEN_PST[idx],
        PieceKind::King => match phase {
            GamePhase::Endgame => KING_ENDGAME_PST[idx],
            _ => KING_MIDDLEGAME_PST[idx],
        },
    }
}

/// Evaluate the position from the side to move's perspective
pub fn evaluate(game: &Game) -> i32 {
    let board = game.board();
    let phase = GamePhase::of(game);
    let all = board.all();

    let score: i32 = board
        .pieces()
        .iter()
        .map(|piece| {
            let mut value = piece_value(piece.kind) + positional(piece, phase);
            if piece.kind.is_slider() {
                let same = board.occupied_by(piece.color);
                value += phase.mobility_weight() * pseudo_moves(piece, all, same).count() as i32;
            }
            piece.color.sign() * value
        })
        .sum();

    game.side_to_move().sign() * score
}
