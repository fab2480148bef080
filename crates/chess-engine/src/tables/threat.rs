//! Threat-line tables.
//!
//! For every (attacker, king) pair that shares a line of the given geometry,
//! the table holds the squares a check along that line passes through: the
//! attacker's own square and everything strictly between it and the king.
//! Whether the line is live depends only on how many pieces sit between the
//! two, i.e. on the occupancy masked to the in-between squares.

use super::sliding::{Geometry, SlidingTable};
use crate::Bitboard;
use chess_core::Square;

/// Precomputed lines for one geometry, indexed `attacker * 64 + king`.
pub struct ThreatTable {
    lines: Vec<Bitboard>,
}

impl ThreatTable {
    pub fn new(geometry: Geometry) -> Self {
        let mut lines = vec![Bitboard::EMPTY; 64 * 64];
        for attacker in Square::all() {
            for (drow, dcol) in geometry.directions() {
                let mut traversed = Bitboard::from_square(attacker);
                let mut cur = attacker;
                while let Some(next) = cur.offset(drow, dcol) {
                    lines[index(attacker, next)] = traversed;
                    traversed.set(next);
                    cur = next;
                }
            }
        }
        ThreatTable { lines }
    }

    /// Returns the threat line from `attacker` to `king`.
    ///
    /// Empty when the king is outside the attacker's visibility mask or when
    /// more than one piece stands between them. With no piece between, the
    /// line is a check; with exactly one, it is a potential pin.
    #[inline]
    pub fn line(
        &self,
        reach: &SlidingTable,
        attacker: Square,
        king: Square,
        occupied: Bitboard,
    ) -> Bitboard {
        if !reach.visibility(attacker).contains(king) {
            return Bitboard::EMPTY;
        }
        let line = self.lines[index(attacker, king)];
        if (line.without(attacker) & occupied).count() > 1 {
            Bitboard::EMPTY
        } else {
            line
        }
    }

    /// The raw line, ignoring occupancy.
    #[inline]
    pub fn raw(&self, attacker: Square, king: Square) -> Bitboard {
        self.lines[index(attacker, king)]
    }
}

#[inline]
fn index(attacker: Square, king: Square) -> usize {
    attacker.index() as usize * 64 + king.index() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn squares(names: &[&str]) -> Bitboard {
        names.iter().map(|s| sq(s)).collect()
    }

    #[test]
    fn open_line_includes_attacker_excludes_king() {
        let reach = SlidingTable::new(Geometry::Orthogonal);
        let table = ThreatTable::new(Geometry::Orthogonal);
        let line = table.line(&reach, sq("e8"), sq("e1"), Bitboard::EMPTY);
        assert_eq!(line, squares(&["e8", "e7", "e6", "e5", "e4", "e3", "e2"]));
    }

    #[test]
    fn single_blocker_keeps_line() {
        let reach = SlidingTable::new(Geometry::Diagonal);
        let table = ThreatTable::new(Geometry::Diagonal);
        let occ = squares(&["a5", "c3", "e1"]);
        let line = table.line(&reach, sq("a5"), sq("e1"), occ);
        assert_eq!(line, squares(&["a5", "b4", "c3", "d2"]));
    }

    #[test]
    fn two_blockers_clear_line() {
        let reach = SlidingTable::new(Geometry::Diagonal);
        let table = ThreatTable::new(Geometry::Diagonal);
        let occ = squares(&["a5", "b4", "c3", "e1"]);
        assert!(table.line(&reach, sq("a5"), sq("e1"), occ).is_empty());
    }

    #[test]
    fn unaligned_or_wrong_geometry_is_empty() {
        let rook_reach = SlidingTable::new(Geometry::Orthogonal);
        let rook = ThreatTable::new(Geometry::Orthogonal);
        assert!(rook.line(&rook_reach, sq("a5"), sq("e1"), Bitboard::EMPTY).is_empty());
        assert!(rook.line(&rook_reach, sq("b3"), sq("e1"), Bitboard::EMPTY).is_empty());
    }

    #[test]
    fn adjacent_attacker_line_is_just_its_square() {
        let reach = SlidingTable::new(Geometry::Orthogonal);
        let table = ThreatTable::new(Geometry::Orthogonal);
        let line = table.line(&reach, sq("e2"), sq("e1"), Bitboard::EMPTY);
        assert_eq!(line.single(), Some(sq("e2")));
    }
}
