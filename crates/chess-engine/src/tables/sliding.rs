//! Occupancy-keyed move tables for the sliding pieces.
//!
//! For every square the table stores one move set per occupancy pattern of
//! the squares that can stop the piece. The key is the live occupancy masked
//! to those squares and compressed into a dense index, which is a perfect
//! hash: distinct relevant patterns always land in distinct slots.

use crate::Bitboard;
use chess_core::Square;

/// Line geometry of a slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Rows and columns.
    Orthogonal,
    /// Both diagonals.
    Diagonal,
}

impl Geometry {
    pub(crate) const fn directions(self) -> [(i8, i8); 4] {
        match self {
            Geometry::Orthogonal => [(1, 0), (-1, 0), (0, 1), (0, -1)],
            Geometry::Diagonal => [(1, 1), (1, -1), (-1, 1), (-1, -1)],
        }
    }
}

/// Per-square lookup data.
#[derive(Debug, Clone, Copy)]
pub struct SlidingEntry {
    /// Every square on the piece's lines, edges included.
    pub visibility: Bitboard,
    /// Squares whose occupancy can change the move set (edges excluded).
    pub mask: Bitboard,
    /// Start of this square's slice in the move table.
    pub offset: usize,
}

/// All move sets for one geometry.
pub struct SlidingTable {
    entries: [SlidingEntry; 64],
    moves: Vec<Bitboard>,
}

impl SlidingTable {
    /// Builds the table by walking every ray for every occupancy pattern.
    pub fn new(geometry: Geometry) -> Self {
        let mut moves = Vec::new();
        let entries = std::array::from_fn(|i| {
            // SAFETY: from_fn over a 64-element array yields indices below 64
            let sq = unsafe { Square::from_index_unchecked(i as u8) };
            let mask = relevant_mask(sq, geometry);
            let offset = moves.len();
            moves.resize(offset + (1usize << mask.count()), Bitboard::EMPTY);

            // Carry-Rippler trick to enumerate all subsets of the mask
            let mut blockers = Bitboard::EMPTY;
            loop {
                moves[offset + occupancy_key(blockers, mask)] = walk_rays(sq, geometry, blockers);
                blockers = Bitboard(blockers.0.wrapping_sub(mask.0) & mask.0);
                if blockers.is_empty() {
                    break;
                }
            }

            SlidingEntry {
                visibility: walk_rays(sq, geometry, Bitboard::EMPTY),
                mask,
                offset,
            }
        });

        SlidingTable { entries, moves }
    }

    /// Returns the move set from `sq` given the live board occupancy.
    /// Blocking squares are included; callers subtract their own pieces.
    #[inline]
    pub fn moves(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let entry = &self.entries[sq.index() as usize];
        self.moves[entry.offset + occupancy_key(occupied, entry.mask)]
    }

    /// Returns the full, unobstructed line set of `sq`.
    #[inline]
    pub fn visibility(&self, sq: Square) -> Bitboard {
        self.entries[sq.index() as usize].visibility
    }

    /// Number of stored move sets.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Compresses the bits of `occupied` selected by `mask` into the low bits of
/// the result, preserving their order.
#[inline]
fn occupancy_key(occupied: Bitboard, mask: Bitboard) -> usize {
    let mut key = 0usize;
    let mut bit = 1usize;
    let mut remaining = mask.0;
    while remaining != 0 {
        let lowest = remaining & remaining.wrapping_neg();
        if occupied.0 & lowest != 0 {
            key |= bit;
        }
        bit <<= 1;
        remaining &= remaining - 1;
    }
    key
}

/// Squares along each ray from `sq`, stopping before the board edge.
fn relevant_mask(sq: Square, geometry: Geometry) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for (drow, dcol) in geometry.directions() {
        let mut cur = sq;
        while let Some(next) = cur.offset(drow, dcol) {
            // The last square of a ray never hides anything behind it.
            if next.offset(drow, dcol).is_none() {
                break;
            }
            mask.set(next);
            cur = next;
        }
    }
    mask
}

/// Walks each ray outward, stopping at and including the first blocker.
pub(crate) fn walk_rays(sq: Square, geometry: Geometry, blockers: Bitboard) -> Bitboard {
    let mut targets = Bitboard::EMPTY;
    for (drow, dcol) in geometry.directions() {
        let mut cur = sq;
        while let Some(next) = cur.offset(drow, dcol) {
            targets.set(next);
            if blockers.contains(next) {
                break;
            }
            cur = next;
        }
    }
    targets
}
