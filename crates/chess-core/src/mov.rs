//! Move representation.

use crate::{PieceKind, Square};
use std::fmt;

/// A move request: source square, destination square and, for pawns reaching
/// the last row, the kind to promote to.
///
/// Castling is expressed as the king's two-square move and en passant as the
/// pawn's diagonal move onto the en-passant target; the board works out the
/// rest. Encoded in 16 bits: 6 bits from, 6 bits to, 3 bits promotion.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(u16);

impl Move {
    /// Creates a move without promotion.
    #[inline]
    pub const fn new(from: Square, to: Square) -> Self {
        Move((from.index() as u16) | ((to.index() as u16) << 6))
    }

    /// Creates a move that promotes to `kind` on arrival.
    #[inline]
    pub const fn with_promotion(from: Square, to: Square, kind: PieceKind) -> Self {
        let code: u16 = match kind {
            PieceKind::Queen => 1,
            PieceKind::Rook => 2,
            PieceKind::Bishop => 3,
            PieceKind::Knight => 4,
            // Kings and pawns are not promotion targets.
            PieceKind::King | PieceKind::Pawn => 0,
        };
        Move(Self::new(from, to).0 | (code << 12))
    }

    /// Returns the source square.
    #[inline]
    pub const fn from(self) -> Square {
        // SAFETY: masked to 6 bits, always a valid square index
        unsafe { Square::from_index_unchecked((self.0 & 0x3F) as u8) }
    }

    /// Returns the destination square.
    #[inline]
    pub const fn to(self) -> Square {
        // SAFETY: masked to 6 bits, always a valid square index
        unsafe { Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8) }
    }

    /// Returns the requested promotion kind, if any.
    #[inline]
    pub const fn promotion(self) -> Option<PieceKind> {
        match (self.0 >> 12) & 0x7 {
            1 => Some(PieceKind::Queen),
            2 => Some(PieceKind::Rook),
            3 => Some(PieceKind::Bishop),
            4 => Some(PieceKind::Knight),
            _ => None,
        }
    }

    /// Returns the coordinate notation for this move (e.g., "e2e4", "e7e8q").
    pub fn to_uci(self) -> String {
        match self.promotion() {
            Some(kind) => format!("{}{}{}", self.from(), self.to(), kind.to_char()),
            None => format!("{}{}", self.from(), self.to()),
        }
    }

    /// Parses coordinate notation. Only the squares and the promotion letter
    /// are checked here; legality is the board's business.
    pub fn from_uci(s: &str) -> Option<Self> {
        if s.len() < 4 || s.len() > 5 {
            return None;
        }
        let from = Square::from_algebraic(s.get(0..2)?)?;
        let to = Square::from_algebraic(s.get(2..4)?)?;
        match s.chars().nth(4) {
            None => Some(Move::new(from, to)),
            Some(c) => match PieceKind::from_char(c)? {
                kind @ (PieceKind::Queen
                | PieceKind::Rook
                | PieceKind::Bishop
                | PieceKind::Knight) => Some(Move::with_promotion(from, to, kind)),
                _ => None,
            },
        }
    }

    /// Placeholder value; never a legal move.
    pub const NULL: Move = Move(0);
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({})", self.to_uci())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
