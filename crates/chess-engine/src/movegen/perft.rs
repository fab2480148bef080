//! Perft: exhaustive leaf counts of the legal move tree.
//!
//! Counts are compared against published values to validate move
//! generation end to end, including the legal filter and special moves.
//!
//! There is no unmake. Each branch clones the parent [`Game`] and applies
//! the move with [`Game::make_move`], so the parent is never mutated and
//! rights, en passant target and threat lines are recomputed per child.
//! `make_move` leaves [`Game::result`] alone, so draw rules never prune the
//! tree; only positions without legal moves end a branch, which is the
//! convention published perft figures follow.

use crate::Game;
use chess_core::Move;

/// Number of leaf positions `depth` plies below `game`.
///
/// The last ply is counted from the move list without playing it out.
pub fn perft(game: &Game, depth: u32) -> u64 {
    match depth {
        0 => 1,
        1 => game.legal_move_list().len() as u64,
        _ => game
            .legal_move_list()
            .as_slice()
            .iter()
            .map(|&mv| perft(&play(game, mv), depth - 1))
            .sum(),
    }
}

/// Per-root-move leaf counts, sorted by UCI text.
///
/// The counts sum to `perft(game, depth)`; comparing them against a
/// reference engine's divide output narrows a wrong total to one branch.
/// At depth 0 or 1 every root move counts as a single leaf.
pub fn perft_divide(game: &Game, depth: u32) -> Vec<(String, u64)> {
    let below = depth.saturating_sub(1);
    let mut results: Vec<(String, u64)> = game
        .legal_move_list()
        .as_slice()
        .iter()
        .map(|&mv| (mv.to_uci(), perft(&play(game, mv), below)))
        .collect();
    results.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    results
}

fn play(game: &Game, mv: Move) -> Game {
    let mut child = game.clone();
    child.make_move(mv);
    child
}
