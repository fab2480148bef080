//! Structured position input and output.
//!
//! The engine never reads notation itself. It consumes a [`PositionSetup`],
//! which carries the six FEN-equivalent fields, and produces one when a front
//! end wants to display or log the current position.

use crate::{Color, Piece, Square};

/// Castling availability as four independent flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CastlingSetup {
    pub white_short: bool,
    pub white_long: bool,
    pub black_short: bool,
    pub black_long: bool,
}

impl CastlingSetup {
    /// All four rights available.
    pub const ALL: CastlingSetup = CastlingSetup {
        white_short: true,
        white_long: true,
        black_short: true,
        black_long: true,
    };

    /// No rights available.
    pub const NONE: CastlingSetup = CastlingSetup {
        white_short: false,
        white_long: false,
        black_short: false,
        black_long: false,
    };
}

/// A parsed position, ready to be turned into a live board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSetup {
    /// Every piece on the board. Order is preserved into the board's piece list.
    pub placement: Vec<Piece>,
    pub side_to_move: Color,
    pub castling: CastlingSetup,
    /// Square a pawn may capture onto en passant, if the last move was a double step.
    pub en_passant: Option<Square>,
    /// Accepted but not needed for move legality.
    pub halfmove_clock: u32,
    /// Accepted but not needed for move legality.
    pub fullmove_number: u32,
}

impl PositionSetup {
    /// Returns the piece standing on `sq`, if any.
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.placement.iter().find(|p| p.square == sq)
    }

    /// Serializes this setup in FEN notation.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();

        for row in (0..8u8).rev() {
            let mut empty = 0;
            for col in 0..8u8 {
                let piece = Square::new(row, col).and_then(|sq| self.piece_at(sq));
                match piece {
                    Some(p) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(p.kind.to_fen_char(p.color));
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        let rights = [
            (self.castling.white_short, 'K'),
            (self.castling.white_long, 'Q'),
            (self.castling.black_short, 'k'),
            (self.castling.black_long, 'q'),
        ];
        let before = fen.len();
        for (set, c) in rights {
            if set {
                fen.push(c);
            }
        }
        if fen.len() == before {
            fen.push('-');
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push_str(&format!(
            " {} {}",
            self.halfmove_clock, self.fullmove_number
        ));
        fen
    }
}
