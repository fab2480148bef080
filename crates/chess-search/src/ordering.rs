//! Static move ordering.
//!
//! Good moves first means earlier cutoffs. The table move leads, then
//! captures by victim value (cheaper attacker first among equals), then
//! promotions; moving a piece out from under attack earns a bonus on top.

use crate::eval::piece_value;
use chess_core::{Move, PieceKind};
use chess_engine::{threatened_squares, Bitboard, Game, SpecialMove};
use std::cmp::Reverse;

const TT_MOVE: i32 = 1_000_000;
const CAPTURE: i32 = 10_000;
const PROMOTION: i32 = 5_000;

/// Heuristic score of `mv`; higher is searched earlier.
pub fn score_move(game: &Game, mv: Move, threatened: Bitboard) -> i32 {
    let Some(piece) = game.piece_at(mv.from()) else {
        return 0;
    };
    let mut score = 0;

    let victim = match game.piece_at(mv.to()) {
        Some(victim) => Some(victim.kind),
        None => match game.special().classify(&piece, mv.to()) {
            Some(SpecialMove::EnPassant { .. }) => Some(PieceKind::Pawn),
            _ => None,
        },
    };
    if let Some(victim) = victim {
        score += CAPTURE + 10 * piece_value(victim) - piece_value(piece.kind) / 10;
    }

    if let Some(kind) = mv.promotion() {
        score += PROMOTION + piece_value(kind);
    }

    if threatened.contains(piece.square) {
        score += piece_value(piece.kind);
    }
    score
}

/// Sorts `moves` best-first. `tt_move`, if present among them, goes first.
pub fn order_moves(game: &Game, moves: &mut [Move], tt_move: Option<Move>) {
    let board = game.board();
    let threatened = threatened_squares(board, game.side_to_move().opposite(), board.all());
    moves.sort_by_cached_key(|&mv| {
        let score = if Some(mv) == tt_move {
            TT_MOVE
        } else {
            score_move(game, mv, threatened)
        };
        Reverse(score)
    });
}
