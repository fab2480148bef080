//! Board square indexing.

use std::fmt;

/// A square on the board, indexed 0-63.
///
/// `row = index / 8` and `col = index % 8`, so a1 = 0, h1 = 7, a2 = 8 and
/// h8 = 63. A `Square` can only be built from an in-range index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    /// Number of squares on the board.
    pub const COUNT: usize = 64;

    /// Creates a square from row and column, or `None` if either is off the board.
    #[inline]
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < 8 && col < 8 {
            Some(Square(row * 8 + col))
        } else {
            None
        }
    }

    /// Creates a square from index (0-63).
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Creates a square from index without bounds checking.
    ///
    /// # Safety
    /// The index must be in the range 0-63.
    #[inline]
    pub const unsafe fn from_index_unchecked(index: u8) -> Self {
        debug_assert!(index < 64);
        Square(index)
    }

    /// Iterates over all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// Parses a square from algebraic notation (e.g., "e4").
    pub const fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].to_ascii_lowercase();
        let row = bytes[1];
        if col < b'a' || col > b'h' || row < b'1' || row > b'8' {
            return None;
        }
        Square::new(row - b'1', col - b'a')
    }

    /// Returns the index (0-63).
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Returns the row (0-7), 0 being White's home row.
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 / 8
    }

    /// Returns the column (0-7), 0 being the a-file.
    #[inline]
    pub const fn col(self) -> u8 {
        self.0 % 8
    }

    /// Returns the square displaced by `(drow, dcol)`, or `None` when the
    /// destination leaves the board. Displacements never wrap around an edge.
    #[inline]
    pub const fn offset(self, drow: i8, dcol: i8) -> Option<Square> {
        let row = self.row() as i8 + drow;
        let col = self.col() as i8 + dcol;
        if row < 0 || row > 7 || col < 0 || col > 7 {
            None
        } else {
            Some(Square((row * 8 + col) as u8))
        }
    }

    /// Returns the algebraic notation for this square.
    pub fn to_algebraic(self) -> String {
        let col = (b'a' + self.col()) as char;
        let row = (b'1' + self.row()) as char;
        format!("{}{}", col, row)
    }

    /// Returns a bitmask with only this square set.
    #[inline]
    pub const fn mask(self) -> u64 {
        1u64 << self.0
    }

    pub const A1: Square = Square(0);
    pub const B1: Square = Square(1);
    pub const C1: Square = Square(2);
    pub const D1: Square = Square(3);
    pub const E1: Square = Square(4);
    pub const F1: Square = Square(5);
    pub const G1: Square = Square(6);
    pub const H1: Square = Square(7);
    pub const A8: Square = Square(56);
    pub const B8: Square = Square(57);
    pub const C8: Square = Square(58);
    pub const D8: Square = Square(59);
    pub const E8: Square = Square(60);
    pub const F8: Square = Square(61);
    pub const G8: Square = Square(62);
    pub const H8: Square = Square(63);
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Square({})", self.to_algebraic())
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn square_row_col() {
        let e4 = Square::from_algebraic("e4").unwrap();
        assert_eq!(e4.row(), 3);
        assert_eq!(e4.col(), 4);
        assert_eq!(e4.index(), 28);
        assert_eq!(Square::new(3, 4), Some(e4));
    }

    #[test]
    fn square_out_of_range() {
        assert_eq!(Square::from_index(64), None);
        assert_eq!(Square::new(8, 0), None);
        assert_eq!(Square::new(0, 8), None);
    }

    #[test]
    fn square_from_algebraic() {
        assert_eq!(Square::from_algebraic("a1"), Some(Square::A1));
        assert_eq!(Square::from_algebraic("H8"), Some(Square::H8));
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("a9"), None);
        assert_eq!(Square::from_algebraic(""), None);
    }

    #[test]
    fn offset_rejects_wraparound() {
        assert_eq!(Square::H1.offset(0, 1), None);
        assert_eq!(Square::A1.offset(0, -1), None);
        assert_eq!(Square::A8.offset(1, 0), None);
        assert_eq!(Square::A1.offset(1, 1), Square::from_algebraic("b2"));
    }

    #[test]
    fn all_squares_in_order() {
        let squares: Vec<Square> = Square::all().collect();
        assert_eq!(squares.len(), Square::COUNT);
        assert_eq!(squares[0], Square::A1);
        assert_eq!(squares[63], Square::H8);
    }

    proptest! {
        #[test]
        fn algebraic_roundtrip(index in 0u8..64) {
            let sq = Square::from_index(index).unwrap();
            prop_assert_eq!(Square::from_algebraic(&sq.to_algebraic()), Some(sq));
        }

        #[test]
        fn offset_stays_on_board(index in 0u8..64, drow in -7i8..=7, dcol in -7i8..=7) {
            let sq = Square::from_index(index).unwrap();
            if let Some(dest) = sq.offset(drow, dcol) {
                prop_assert_eq!(dest.row() as i8 - sq.row() as i8, drow);
                prop_assert_eq!(dest.col() as i8 - sq.col() as i8, dcol);
            }
        }
    }
}
