//! Core types for chess.
//!
//! This crate provides the vocabulary shared by the engine and its callers:
//! - [`Square`] for board coordinates (0-63, row-major from a1)
//! - [`Color`], [`PieceKind`] and the [`Piece`] record
//! - [`Move`] for move requests
//! - [`PositionSetup`], the structured position handed to the engine, and
//!   [`FenParser`], the notation collaborator that produces it

mod color;
mod fen;
mod mov;
mod piece;
mod setup;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::Move;
pub use piece::{Piece, PieceKind};
pub use setup::{CastlingSetup, PositionSetup};
pub use square::Square;
