//! Move outcomes and game results.

use chess_core::Color;
use std::fmt;

/// What happened when a move was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// The move was illegal; nothing changed.
    NotExecuted,
    Normal,
    /// The side now to move is in check and has a reply.
    Check,
    Draw,
    Checkmate,
}

impl MoveStatus {
    /// Returns true if the move was applied.
    pub const fn is_executed(self) -> bool {
        !matches!(self, MoveStatus::NotExecuted)
    }
}

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    /// White delivered mate.
    WhiteWins,
    /// Black delivered mate.
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

impl GameResult {
    /// The result when `loser` is checkmated.
    pub const fn mated(loser: Color) -> Self {
        match loser {
            Color::White => GameResult::BlackWins,
            Color::Black => GameResult::WhiteWins,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::WhiteWins => write!(f, "1-0"),
            GameResult::BlackWins => write!(f, "0-1"),
            GameResult::Draw(_) => write!(f, "1/2-1/2"),
        }
    }
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawReason {
    /// No legal moves but not in check.
    Stalemate,
    /// The mover repeated the same from/to step for the third time.
    Repetition,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
    /// Only kings, or kings and a single minor piece, remain.
    InsufficientMaterial,
}
