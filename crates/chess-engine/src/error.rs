//! Errors surfaced when a position is handed to the engine.

use chess_core::{Color, FenError, Square};
use thiserror::Error;

/// A position the engine refuses to play from.
///
/// The engine never repairs its input: anything listed here is reported
/// back to the caller at ingestion time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("two pieces placed on {0}")]
    DuplicateSquare(Square),

    #[error("{0} has no king")]
    MissingKing(Color),

    #[error("{0} has more than one king")]
    ExtraKing(Color),

    #[error("pawn on back rank at {0}")]
    PawnOnBackRank(Square),

    #[error("{0} is in check but it is not their move")]
    OpponentInCheck(Color),

    #[error("castling right without king and rook on their home squares: {0}")]
    InvalidCastling(String),

    #[error("en passant target {0} does not follow a double pawn step")]
    InvalidEnPassant(Square),
}
