//! Zobrist hashing for position identification.
//!
//! A position hashes to the XOR of one key per (kind, color, square) piece,
//! a side-to-move key when Black is to move, one key per castling right
//! still held and one key for the en passant file when a target is set.
//! Equal positions always hash equally; the transposition table relies on
//! nothing more.

use crate::board::Board;
use crate::special::{CastleSide, SpecialState};
use chess_core::{Color, PieceKind, Square};

/// Zobrist hash keys.
///
/// Generated using a fixed seed for reproducibility.
pub struct ZobristKeys {
    /// Keys for pieces: [kind][color][square]
    pub pieces: [[[u64; 64]; 2]; 6],
    /// Key for black to move (XOR when black to move).
    pub black_to_move: u64,
    /// Keys for castling rights, in flag order.
    pub castling: [u64; 4],
    /// Keys for en passant file.
    pub en_passant: [u64; 8],
}

impl ZobristKeys {
    /// Initializes Zobrist keys using a simple PRNG.
    pub const fn new() -> Self {
        // xorshift64, usable in const context
        const fn next_random(state: u64) -> u64 {
            let mut x = state;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            x
        }

        let mut state = 0x9E3779B97F4A7C15u64;
        let mut pieces = [[[0u64; 64]; 2]; 6];
        let mut castling = [0u64; 4];
        let mut en_passant = [0u64; 8];

        let mut kind = 0;
        while kind < 6 {
            let mut color = 0;
            while color < 2 {
                let mut square = 0;
                while square < 64 {
                    state = next_random(state);
                    pieces[kind][color][square] = state;
                    square += 1;
                }
                color += 1;
            }
            kind += 1;
        }

        state = next_random(state);
        let black_to_move = state;

        let mut i = 0;
        while i < 4 {
            state = next_random(state);
            castling[i] = state;
            i += 1;
        }

        let mut i = 0;
        while i < 8 {
            state = next_random(state);
            en_passant[i] = state;
            i += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    /// Returns the key for a piece on a square.
    #[inline]
    pub const fn piece_key(&self, kind: PieceKind, color: Color, square: Square) -> u64 {
        self.pieces[kind.index()][color.index()][square.index() as usize]
    }

    /// Hashes a full position from scratch.
    pub fn hash(&self, board: &Board, special: &SpecialState) -> u64 {
        let mut hash = board
            .pieces()
            .iter()
            .fold(0, |h, p| h ^ self.piece_key(p.kind, p.color, p.square));

        if board.side_to_move() == Color::Black {
            hash ^= self.black_to_move;
        }

        let mut slot = 0;
        for color in Color::BOTH {
            for side in CastleSide::ALL {
                if special.castling.has(color, side) {
                    hash ^= self.castling[slot];
                }
                slot += 1;
            }
        }

        if let Some(target) = special.en_passant {
            hash ^= self.en_passant[target.col() as usize];
        }
        hash
    }
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

/// Global Zobrist keys (initialized at compile time).
pub static ZOBRIST: ZobristKeys = ZobristKeys::new();
