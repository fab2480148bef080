//! Castling, en passant and promotion.
//!
//! [`SpecialState`] is the only game state beyond piece placement that move
//! legality depends on. Castling rights only ever get cleared; the en passant
//! target lives for exactly one ply.

use crate::board::Board;
use crate::tables::{between, pawn_attacks};
use crate::Bitboard;
use chess_core::{CastlingSetup, Color, Piece, PieceKind, Square};

/// Which way a king castles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastleSide {
    /// Toward the h-file.
    Short,
    /// Toward the a-file.
    Long,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::Short, CastleSide::Long];

    const fn cols(self) -> (u8, u8, u8) {
        // (rook from, king to, rook to)
        match self {
            CastleSide::Short => (7, 6, 5),
            CastleSide::Long => (0, 2, 3),
        }
    }

    const fn square(color: Color, col: u8) -> Square {
        match Square::new(color.home_row(), col) {
            Some(sq) => sq,
            None => panic!("home row square out of range"),
        }
    }

    /// Home square of the king.
    pub const fn king_from(color: Color) -> Square {
        Self::square(color, 4)
    }

    pub const fn king_to(self, color: Color) -> Square {
        Self::square(color, self.cols().1)
    }

    pub const fn rook_from(self, color: Color) -> Square {
        Self::square(color, self.cols().0)
    }

    pub const fn rook_to(self, color: Color) -> Square {
        Self::square(color, self.cols().2)
    }
}

/// Castling rights flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_SHORT: u8 = 0b0001;
    pub const WHITE_LONG: u8 = 0b0010;
    pub const BLACK_SHORT: u8 = 0b0100;
    pub const BLACK_LONG: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// Creates new castling rights from flags.
    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::Short) => Self::WHITE_SHORT,
            (Color::White, CastleSide::Long) => Self::WHITE_LONG,
            (Color::Black, CastleSide::Short) => Self::BLACK_SHORT,
            (Color::Black, CastleSide::Long) => Self::BLACK_LONG,
        }
    }

    /// Returns true if `color` may still castle toward `side`.
    #[inline]
    pub const fn has(self, color: Color, side: CastleSide) -> bool {
        self.0 & Self::flag(color, side) != 0
    }

    /// Removes one right. Rights are never restored.
    #[inline]
    pub fn clear(&mut self, color: Color, side: CastleSide) {
        self.0 &= !Self::flag(color, side);
    }

    /// Returns true if `color` has any right left.
    #[inline]
    pub const fn any(self, color: Color) -> bool {
        self.has(color, CastleSide::Short) || self.has(color, CastleSide::Long)
    }

    /// Returns the raw flags.
    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    pub fn to_setup(self) -> CastlingSetup {
        CastlingSetup {
            white_short: self.has(Color::White, CastleSide::Short),
            white_long: self.has(Color::White, CastleSide::Long),
            black_short: self.has(Color::Black, CastleSide::Short),
            black_long: self.has(Color::Black, CastleSide::Long),
        }
    }
}

impl From<CastlingSetup> for CastlingRights {
    fn from(setup: CastlingSetup) -> Self {
        let mut flags = 0;
        if setup.white_short {
            flags |= Self::WHITE_SHORT;
        }
        if setup.white_long {
            flags |= Self::WHITE_LONG;
        }
        if setup.black_short {
            flags |= Self::BLACK_SHORT;
        }
        if setup.black_long {
            flags |= Self::BLACK_LONG;
        }
        CastlingRights::new(flags)
    }
}

/// A move that needs more than relocating one piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMove {
    Castle(CastleSide),
    /// Diagonal pawn step onto the en passant target; `captured` holds the
    /// pawn being taken.
    EnPassant { captured: Square },
    Promotion,
}

/// Castling rights plus the en passant target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpecialState {
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
}

impl SpecialState {
    pub fn new(castling: CastlingRights, en_passant: Option<Square>) -> Self {
        SpecialState {
            castling,
            en_passant,
        }
    }

    /// Updates rights and the en passant target after `piece` moved from
    /// `from` to `to`. `piece` is the mover as it stood before the move.
    pub fn record_move(&mut self, piece: &Piece, from: Square, to: Square) {
        for color in Color::BOTH {
            let king = CastleSide::king_from(color);
            for side in CastleSide::ALL {
                let rook = side.rook_from(color);
                if from == king || from == rook || to == king || to == rook {
                    self.castling.clear(color, side);
                }
            }
        }

        self.en_passant = None;
        if piece.kind == PieceKind::Pawn && from.row().abs_diff(to.row()) == 2 {
            self.en_passant = from.offset(piece.color.forward(), 0);
        }
    }

    /// Extra targets `piece` may reach through a special move.
    ///
    /// `threatened` is the set of squares the opponent attacks; castling may
    /// not start from, pass through or land on any of them.
    pub fn available_moves(&self, board: &Board, piece: &Piece, threatened: Bitboard) -> Bitboard {
        let mut targets = Bitboard::EMPTY;
        match piece.kind {
            PieceKind::King => {
                let color = piece.color;
                if piece.square != CastleSide::king_from(color) || !self.castling.any(color) {
                    return targets;
                }
                for side in CastleSide::ALL {
                    if !self.castling.has(color, side) {
                        continue;
                    }
                    let rook_from = side.rook_from(color);
                    let rook_ok = board
                        .piece_at(rook_from)
                        .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color);
                    if !rook_ok || between(piece.square, rook_from).intersects(board.all()) {
                        continue;
                    }
                    let king_to = side.king_to(color);
                    let transit = between(piece.square, king_to)
                        .with(piece.square)
                        .with(king_to);
                    if !transit.intersects(threatened) {
                        targets.set(king_to);
                    }
                }
            }
            PieceKind::Pawn => {
                if let Some(target) = self.en_passant {
                    let captured = target.offset(-piece.color.forward(), 0);
                    let victim_ok = captured
                        .and_then(|sq| board.piece_at(sq))
                        .is_some_and(|p| p.kind == PieceKind::Pawn && p.color != piece.color);
                    if victim_ok && pawn_attacks(piece.square, piece.color).contains(target) {
                        targets.set(target);
                    }
                }
            }
            _ => {}
        }
        targets
    }

    /// Classifies a move of `piece` to `to` if it is special.
    pub fn classify(&self, piece: &Piece, to: Square) -> Option<SpecialMove> {
        match piece.kind {
            PieceKind::King if piece.square == CastleSide::king_from(piece.color) => {
                CastleSide::ALL
                    .into_iter()
                    .find(|side| side.king_to(piece.color) == to)
                    .map(SpecialMove::Castle)
            }
            PieceKind::Pawn => {
                if to.row() == piece.color.promotion_row() {
                    Some(SpecialMove::Promotion)
                } else if Some(to) == self.en_passant && to.col() != piece.square.col() {
                    to.offset(-piece.color.forward(), 0)
                        .map(|captured| SpecialMove::EnPassant { captured })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Returns true if moving `piece` to `to` is castling, en passant or a
    /// promotion.
    pub fn is_special_move(&self, piece: &Piece, to: Square) -> bool {
        self.classify(piece, to).is_some()
    }
}

/// Applies a special move to the board. Rights and the en passant target are
/// updated separately through [`SpecialState::record_move`].
pub fn execute(
    board: &mut Board,
    special: SpecialMove,
    piece: &Piece,
    to: Square,
    promotion: PieceKind,
) {
    match special {
        SpecialMove::Castle(side) => {
            board.move_piece(piece.square, Some(to));
            board.move_piece(side.rook_from(piece.color), Some(side.rook_to(piece.color)));
        }
        SpecialMove::EnPassant { captured } => {
            board.move_piece(piece.square, Some(to));
            board.remove_piece(captured);
        }
        SpecialMove::Promotion => {
            board.move_piece(piece.square, Some(to));
            board.set_kind(to, promotion);
        }
    }
}
