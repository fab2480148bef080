//! Bitboard chess move generation and game state.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square set with efficient operations
//! - [`tables`] - process-wide attack and threat-line lookup tables
//! - [`Board`] - piece arena with derived occupancy bitboards
//! - [`Game`] - legal move queries, move application and game status
//! - Perft for validating the generator
//!
//! # Architecture
//!
//! Move legality is computed per piece: pseudo-legal targets come from the
//! lookup tables, castling and en passant targets are added from the
//! [`SpecialState`], and the union is narrowed by the check and pin lines
//! aimed at the mover's king ([`ThreatLines`]).
//!
//! # Example
//!
//! ```
//! use chess_core::Square;
//! use chess_engine::{Game, MoveStatus};
//!
//! let mut game = Game::new();
//! println!("Legal moves from starting position: {}", game.legal_move_list().len());
//!
//! let e2 = Square::from_algebraic("e2").unwrap();
//! let e4 = Square::from_algebraic("e4").unwrap();
//! assert_eq!(game.execute_move(e2, e4, None), MoveStatus::Normal);
//! println!("Position after 1.e4: {}", game.to_fen());
//! ```

mod bitboard;
mod board;
mod error;
mod game;
pub mod legal;
pub mod movegen;
pub mod special;
mod status;
pub mod tables;
mod zobrist;

pub use bitboard::Bitboard;
pub use board::Board;
pub use error::PositionError;
pub use game::Game;
pub use legal::ThreatLines;
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{is_king_attacked, pseudo_moves, threatened_squares, MoveList};
pub use special::{CastleSide, CastlingRights, SpecialMove, SpecialState};
pub use status::{DrawReason, GameResult, MoveStatus};
pub use tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
pub use zobrist::{ZobristKeys, ZOBRIST};
