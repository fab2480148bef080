//! Reducing pseudo-legal targets to legal ones.
//!
//! The filter works from [`ThreatLines`], the check and pin lines aimed at
//! the side to move's king. A check line is every square that resolves that
//! check by capture or interposition; a pin line is every square the pinned
//! piece may still occupy.

use crate::board::Board;
use crate::movegen::{is_king_attacked, threatened_squares};
use crate::special::{self, SpecialMove, SpecialState};
use crate::tables::{king_attacks, knight_attacks, pawn_attacks, threat_line};
use crate::Bitboard;
use chess_core::{Color, Piece, PieceKind};

/// Check and pin lines against one king.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatLines {
    checks: Vec<Bitboard>,
    pins: Vec<Bitboard>,
}

impl ThreatLines {
    /// Collects every line the opponent aims at `color`'s king.
    ///
    /// A slider line with no blocker is a check. With a single blocker of
    /// `color` it is a pin; a single blocker of the attacker's own color
    /// shields nothing and the line is dropped. Knights and pawns that
    /// attack the king contribute a one-square check line.
    pub fn scan(board: &Board, color: Color) -> Self {
        let king = board.king_square(color);
        let occupied = board.all();
        let mut lines = ThreatLines::default();

        for piece in board.pieces_of(color.opposite()) {
            match piece.kind {
                PieceKind::Rook | PieceKind::Bishop | PieceKind::Queen => {
                    let line = threat_line(piece.kind, piece.square, king, occupied);
                    if line.is_empty() {
                        continue;
                    }
                    match (line.without(piece.square) & occupied).single() {
                        None => lines.checks.push(line),
                        Some(blocker) => {
                            if board.piece_at(blocker).is_some_and(|p| p.color == color) {
                                lines.pins.push(line);
                            }
                        }
                    }
                }
                PieceKind::Knight => {
                    if knight_attacks(piece.square).contains(king) {
                        lines.checks.push(Bitboard::from_square(piece.square));
                    }
                }
                PieceKind::Pawn => {
                    if pawn_attacks(piece.square, piece.color).contains(king) {
                        lines.checks.push(Bitboard::from_square(piece.square));
                    }
                }
                PieceKind::King => {
                    debug_assert!(!king_attacks(piece.square).contains(king), "kings are adjacent");
                }
            }
        }
        lines
    }

    /// Returns true if the king is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        !self.checks.is_empty()
    }

    pub fn checks(&self) -> &[Bitboard] {
        &self.checks
    }

    pub fn pins(&self) -> &[Bitboard] {
        &self.pins
    }

    /// The pin line through `piece`, if it is pinned.
    pub fn pin_of(&self, piece: &Piece) -> Option<Bitboard> {
        self.pins.iter().copied().find(|line| line.contains(piece.square))
    }
}

/// Narrows `candidates` (pseudo-legal plus special targets of `piece`) to
/// the moves that do not leave its own king attacked.
///
/// `lines` must have been scanned for `piece`'s color on `board`.
pub fn filter(
    board: &Board,
    special: &SpecialState,
    lines: &ThreatLines,
    piece: &Piece,
    candidates: Bitboard,
) -> Bitboard {
    if piece.kind == PieceKind::King {
        // The king must not hide behind itself along a slider's line.
        let occupied = board.all().without(piece.square);
        let threatened = threatened_squares(board, piece.color.opposite(), occupied);
        return candidates & !threatened;
    }

    let mut allowed = candidates;
    if let Some(pin) = lines.pin_of(piece) {
        allowed &= pin;
    }

    let en_passant = match special.en_passant {
        Some(target) if piece.kind == PieceKind::Pawn && allowed.contains(target) => {
            match special.classify(piece, target) {
                Some(SpecialMove::EnPassant { captured }) => Some((target, captured)),
                _ => None,
            }
        }
        _ => None,
    };

    for check in lines.checks() {
        let mut resolves = *check;
        // Taking the checking pawn en passant lands off the check line.
        if let Some((target, captured)) = en_passant {
            if check.single() == Some(captured) {
                resolves.set(target);
            }
        }
        allowed &= resolves;
    }

    // En passant vacates two squares on one row, which no line table
    // captures. Play it out and look.
    if let Some((target, captured)) = en_passant {
        if allowed.contains(target) {
            let mut after = board.clone();
            special::execute(
                &mut after,
                SpecialMove::EnPassant { captured },
                piece,
                target,
                PieceKind::Queen,
            );
            if is_king_attacked(&after, piece.color) {
                allowed.clear(target);
            }
        }
    }

    allowed
}
