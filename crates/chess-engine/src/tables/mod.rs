//! Precomputed attack and threat-line tables.
//!
//! Everything here is built once per process and never mutated afterwards.
//! [`tables`] builds on first use behind a [`OnceLock`], so the build
//! happens-before every lookup even if the host searches from several
//! threads; [`init`] lets a host pay the cost up front.

mod attacks;
mod sliding;
mod threat;

pub use sliding::{Geometry, SlidingTable};
pub use threat::ThreatTable;

use crate::Bitboard;
use chess_core::{Color, PieceKind, Square};
use std::sync::OnceLock;
use std::time::Instant;

/// All precomputed lookup data.
pub struct Tables {
    pub king: [Bitboard; 64],
    pub knight: [Bitboard; 64],
    /// Forward pawn steps `[color][square]`.
    pub pawn_push: [[Bitboard; 64]; 2],
    /// Diagonal pawn captures `[color][square]`.
    pub pawn_capture: [[Bitboard; 64]; 2],
    pub rook: SlidingTable,
    pub bishop: SlidingTable,
    pub rook_lines: ThreatTable,
    pub bishop_lines: ThreatTable,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

/// Gets the global tables, building them if necessary.
pub fn tables() -> &'static Tables {
    TABLES.get_or_init(Tables::new)
}

/// Builds the global tables now rather than on first lookup.
pub fn init() {
    tables();
}

impl Tables {
    /// Creates and initializes all tables.
    pub fn new() -> Self {
        let start = Instant::now();
        let tables = Tables {
            king: attacks::king_table(),
            knight: attacks::knight_table(),
            pawn_push: attacks::pawn_push_table(),
            pawn_capture: attacks::pawn_capture_table(),
            rook: SlidingTable::new(Geometry::Orthogonal),
            bishop: SlidingTable::new(Geometry::Diagonal),
            rook_lines: ThreatTable::new(Geometry::Orthogonal),
            bishop_lines: ThreatTable::new(Geometry::Diagonal),
        };
        tracing::debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            rook_entries = tables.rook.len(),
            bishop_entries = tables.bishop.len(),
            "attack tables built"
        );
        tables
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns king targets from the given square.
#[inline]
pub fn king_attacks(sq: Square) -> Bitboard {
    tables().king[sq.index() as usize]
}

/// Returns knight targets from the given square.
#[inline]
pub fn knight_attacks(sq: Square) -> Bitboard {
    tables().knight[sq.index() as usize]
}

/// Returns the diagonal capture squares of a pawn.
#[inline]
pub fn pawn_attacks(sq: Square, color: Color) -> Bitboard {
    tables().pawn_capture[color.index()][sq.index() as usize]
}

/// Returns the forward squares of a pawn, ignoring occupancy.
#[inline]
pub fn pawn_pushes(sq: Square, color: Color) -> Bitboard {
    tables().pawn_push[color.index()][sq.index() as usize]
}

/// Returns rook moves for a square given occupied squares.
#[inline]
pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().rook.moves(sq, occupied)
}

/// Returns bishop moves for a square given occupied squares.
#[inline]
pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    tables().bishop.moves(sq, occupied)
}

/// Returns queen moves (rook + bishop).
#[inline]
pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

/// Returns the threat line a slider of `kind` on `attacker` casts toward a
/// king on `king`, or the empty set for non-sliders and obstructed lines.
///
/// Queen lines are the union of both geometries; at most one is non-empty.
pub fn threat_line(
    kind: PieceKind,
    attacker: Square,
    king: Square,
    occupied: Bitboard,
) -> Bitboard {
    let t = tables();
    let orthogonal = || t.rook_lines.line(&t.rook, attacker, king, occupied);
    let diagonal = || t.bishop_lines.line(&t.bishop, attacker, king, occupied);
    match kind {
        PieceKind::Rook => orthogonal(),
        PieceKind::Bishop => diagonal(),
        PieceKind::Queen => orthogonal() | diagonal(),
        _ => Bitboard::EMPTY,
    }
}

/// Squares strictly between two squares sharing a row, column or diagonal.
pub fn between(a: Square, b: Square) -> Bitboard {
    let t = tables();
    (t.rook_lines.raw(a, b) | t.bishop_lines.raw(a, b)).without(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn queen_attacks_empty_board() {
        assert_eq!(queen_attacks(sq("d4"), Bitboard::EMPTY).count(), 27);
    }

    #[test]
    fn queen_threat_line_uses_matching_geometry() {
        let diag = threat_line(PieceKind::Queen, sq("h4"), sq("e1"), Bitboard::EMPTY);
        assert_eq!(diag.count(), 3);
        assert!(diag.contains(sq("h4")) && diag.contains(sq("f2")));
        let straight = threat_line(PieceKind::Queen, sq("e5"), sq("e1"), Bitboard::EMPTY);
        assert_eq!(straight.count(), 4);
        assert!(threat_line(PieceKind::Rook, sq("h4"), sq("e1"), Bitboard::EMPTY).is_empty());
        assert!(threat_line(PieceKind::Knight, sq("f3"), sq("e1"), Bitboard::EMPTY).is_empty());
    }

    #[test]
    fn between_squares() {
        let b = between(Square::E1, Square::H1);
        assert_eq!(b.count(), 2);
        assert!(b.contains(Square::F1) && b.contains(Square::G1));
        assert!(between(Square::E1, sq("f3")).is_empty());
    }
}
