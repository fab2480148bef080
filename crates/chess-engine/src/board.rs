//! Mutable board state.
//!
//! Pieces live in an arena (`Vec<Piece>`) addressed by index; a 64-entry
//! square index points into it. The two occupancy bitboards are derived data
//! and are rebuilt from the arena after every mutation, so they can never
//! drift from the piece records.

use crate::error::PositionError;
use crate::Bitboard;
use chess_core::{Color, Piece, PieceKind, Square};

/// Piece placement plus side to move.
#[derive(Debug, PartialEq, Eq)]
pub struct Board {
    pieces: Vec<Piece>,
    squares: [Option<u8>; 64],
    side_to_move: Color,
    all: Bitboard,
    own: Bitboard,
}

impl Clone for Board {
    /// Copies the arena and index; the aggregates are recomputed rather
    /// than copied.
    fn clone(&self) -> Self {
        let mut board = Board {
            pieces: self.pieces.clone(),
            squares: self.squares,
            side_to_move: self.side_to_move,
            all: Bitboard::EMPTY,
            own: Bitboard::EMPTY,
        };
        board.refresh();
        board
    }
}

impl Board {
    /// Creates a board from a piece list.
    ///
    /// Rejects overlapping pieces and anything other than exactly one king
    /// per side.
    pub fn from_pieces(pieces: &[Piece], side_to_move: Color) -> Result<Self, PositionError> {
        let mut board = Board {
            pieces: Vec::with_capacity(pieces.len()),
            squares: [None; 64],
            side_to_move,
            all: Bitboard::EMPTY,
            own: Bitboard::EMPTY,
        };

        for piece in pieces {
            let slot = &mut board.squares[piece.square.index() as usize];
            if slot.is_some() {
                return Err(PositionError::DuplicateSquare(piece.square));
            }
            *slot = Some(board.pieces.len() as u8);
            board.pieces.push(*piece);
        }

        for color in Color::BOTH {
            let kings = board
                .pieces
                .iter()
                .filter(|p| p.color == color && p.kind == PieceKind::King)
                .count();
            match kings {
                0 => return Err(PositionError::MissingKing(color)),
                1 => {}
                _ => return Err(PositionError::ExtraKing(color)),
            }
        }

        board.refresh();
        Ok(board)
    }

    /// Returns the side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// Returns the piece on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.squares[sq.index() as usize].map(|i| &self.pieces[i as usize])
    }

    /// All live pieces in arena order.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Live pieces of one color.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.pieces.iter().filter(move |p| p.color == color)
    }

    /// Every occupied square.
    #[inline]
    pub fn all(&self) -> Bitboard {
        self.all
    }

    /// Squares occupied by the side to move.
    #[inline]
    pub fn own(&self) -> Bitboard {
        self.own
    }

    /// Squares occupied by `color`.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        if color == self.side_to_move {
            self.own
        } else {
            self.all & !self.own
        }
    }

    /// Per-kind occupancy of one color, indexed by [`PieceKind::index`].
    pub fn kinds(&self, color: Color) -> [Bitboard; 6] {
        let mut kinds = [Bitboard::EMPTY; 6];
        for piece in self.pieces_of(color) {
            kinds[piece.kind.index()].set(piece.square);
        }
        kinds
    }

    /// Square of `color`'s king.
    ///
    /// # Panics
    ///
    /// Panics if the king is missing, which no legal sequence of moves can
    /// produce.
    pub fn king_square(&self, color: Color) -> Square {
        match self
            .pieces_of(color)
            .find(|p| p.kind == PieceKind::King)
        {
            Some(king) => king.square,
            None => panic!("board invariant violated: {} has no king", color),
        }
    }

    /// Moves the piece on `from` to `to`, capturing whatever stands there.
    /// With `to == None` the piece is taken off the board.
    ///
    /// Returns the captured piece, if any.
    ///
    /// # Panics
    ///
    /// Panics if `from` is empty.
    pub fn move_piece(&mut self, from: Square, to: Option<Square>) -> Option<Piece> {
        if self.squares[from.index() as usize].is_none() {
            panic!("board invariant violated: no piece on {}", from);
        }

        let captured = match to {
            Some(to) if to != from => self.take(to),
            _ => None,
        };

        match to {
            Some(to) => {
                // Re-read: the capture may have swapped the mover into a new slot.
                if let Some(index) = self.squares[from.index() as usize].take() {
                    self.pieces[index as usize].square = to;
                    self.squares[to.index() as usize] = Some(index);
                }
            }
            None => {
                self.take(from);
            }
        }

        self.refresh();
        captured
    }

    /// Removes and returns the piece on `sq`.
    ///
    /// # Panics
    ///
    /// Panics if `sq` is empty.
    pub fn remove_piece(&mut self, sq: Square) -> Piece {
        let Some(&piece) = self.piece_at(sq) else {
            panic!("board invariant violated: no piece on {}", sq);
        };
        self.move_piece(sq, None);
        piece
    }

    /// Replaces the kind of the piece on `sq` (promotion).
    ///
    /// # Panics
    ///
    /// Panics if `sq` is empty.
    pub fn set_kind(&mut self, sq: Square, kind: PieceKind) {
        let Some(index) = self.squares[sq.index() as usize] else {
            panic!("board invariant violated: no piece on {}", sq);
        };
        self.pieces[index as usize].kind = kind;
    }

    /// Hands the move to the other side.
    pub fn flip_side(&mut self) {
        self.side_to_move = self.side_to_move.opposite();
        self.refresh();
    }

    /// Removes the piece on `sq` from the arena, keeping the index in step.
    fn take(&mut self, sq: Square) -> Option<Piece> {
        let index = self.squares[sq.index() as usize].take()? as usize;
        let piece = self.pieces.swap_remove(index);
        if let Some(moved) = self.pieces.get(index) {
            self.squares[moved.square.index() as usize] = Some(index as u8);
        }
        Some(piece)
    }

    /// Re-aggregates both occupancy bitboards from the piece records.
    fn refresh(&mut self) {
        let mut all = Bitboard::EMPTY;
        let mut own = Bitboard::EMPTY;
        for piece in &self.pieces {
            all.set(piece.square);
            if piece.color == self.side_to_move {
                own.set(piece.square);
            }
        }
        self.all = all;
        self.own = own;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::FenParser;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn start() -> Board {
        let setup = FenParser::startpos();
        Board::from_pieces(&setup.placement, setup.side_to_move).unwrap()
    }

    fn assert_consistent(board: &Board) {
        let all: Bitboard = board.pieces().iter().map(|p| p.square).collect();
        let own: Bitboard = board
            .pieces_of(board.side_to_move())
            .map(|p| p.square)
            .collect();
        assert_eq!(board.all(), all);
        assert_eq!(board.own(), own);
        for piece in board.pieces() {
            assert_eq!(board.piece_at(piece.square), Some(piece));
        }
        assert_eq!(board.all().count() as usize, board.pieces().len());
    }

    #[test]
    fn startpos_aggregates() {
        let board = start();
        assert_eq!(board.all().count(), 32);
        assert_eq!(board.own().count(), 16);
        assert_eq!(board.king_square(Color::White), Square::E1);
        assert_eq!(board.king_square(Color::Black), Square::E8);
        assert_consistent(&board);
    }

    #[test]
    fn quiet_move_relocates_piece() {
        let mut board = start();
        assert_eq!(board.move_piece(Square::G1, Some(sq("f3"))), None);
        assert_eq!(board.piece_at(sq("f3")).map(|p| p.kind), Some(PieceKind::Knight));
        assert!(board.piece_at(Square::G1).is_none());
        assert_consistent(&board);
    }

    #[test]
    fn capture_removes_target() {
        let mut board = start();
        let captured = board.move_piece(Square::D1, Some(sq("d7")));
        assert_eq!(
            captured.map(|p| (p.kind, p.color)),
            Some((PieceKind::Pawn, Color::Black))
        );
        assert_eq!(board.pieces().len(), 31);
        assert_eq!(board.piece_at(sq("d7")).map(|p| p.kind), Some(PieceKind::Queen));
        assert_consistent(&board);
    }

    #[test]
    fn capture_of_last_arena_slot() {
        // The black h-pawn is the last record; capture it and check the mover.
        let mut board = start();
        board.move_piece(Square::H1, Some(sq("h7")));
        assert_eq!(board.piece_at(sq("h7")).map(|p| p.color), Some(Color::White));
        assert_consistent(&board);

        // Now capture with the piece that sits in the last slot.
        let last = *board.pieces().last().unwrap();
        let target = sq("a7");
        board.move_piece(last.square, Some(target));
        assert_eq!(board.piece_at(target).map(|p| p.kind), Some(last.kind));
        assert_consistent(&board);
    }

    #[test]
    fn remove_piece() {
        let mut board = start();
        let pawn = board.remove_piece(sq("e2"));
        assert_eq!(pawn.kind, PieceKind::Pawn);
        assert!(board.piece_at(sq("e2")).is_none());
        assert_eq!(board.pieces().len(), 31);
        assert_consistent(&board);
    }

    #[test]
    fn flip_side_recomputes_own() {
        let mut board = start();
        board.flip_side();
        assert_eq!(board.side_to_move(), Color::Black);
        assert!(board.own().contains(Square::E8));
        assert!(!board.own().contains(Square::E1));
        assert_consistent(&board);
    }

    #[test]
    fn clone_recomputes_aggregates() {
        let mut board = start();
        board.move_piece(sq("e2"), Some(sq("e4")));
        let copy = board.clone();
        assert_eq!(copy, board);
        assert_consistent(&copy);
    }

    #[test]
    #[should_panic(expected = "no piece on e4")]
    fn moving_from_empty_square_panics() {
        let mut board = start();
        board.move_piece(sq("e4"), Some(sq("e5")));
    }

    #[test]
    fn rejects_bad_placements() {
        let king = |c, s| Piece::new(PieceKind::King, c, sq(s));
        assert_eq!(
            Board::from_pieces(&[king(Color::White, "e1")], Color::White),
            Err(PositionError::MissingKing(Color::Black))
        );
        assert_eq!(
            Board::from_pieces(
                &[
                    king(Color::White, "e1"),
                    king(Color::White, "e2"),
                    king(Color::Black, "e8")
                ],
                Color::White
            ),
            Err(PositionError::ExtraKing(Color::White))
        );
        assert_eq!(
            Board::from_pieces(
                &[king(Color::White, "e1"), king(Color::Black, "e1")],
                Color::White
            ),
            Err(PositionError::DuplicateSquare(Square::E1))
        );
    }
}
