//! Pseudo-legal move generation and attack queries.
//!
//! Everything here works on per-piece target bitboards. Nothing in this
//! module knows about check, pins or special moves; see [`crate::legal`] and
//! [`crate::special`] for those.

pub mod perft;

use crate::board::Board;
use crate::tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, pawn_pushes, queen_attacks,
    rook_attacks,
};
use crate::Bitboard;
use chess_core::{Color, Move, Piece, PieceKind, Square};

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of legal moves in any chess position.
    pub const MAX_MOVES: usize = 256;

    /// Creates an empty move list.
    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    /// Adds a move to the list.
    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    /// Adds every move from `from` into `targets`, expanding pawn moves that
    /// reach the last row into one move per promotion kind.
    pub fn push_targets(&mut self, piece: &Piece, targets: Bitboard) {
        let last_row = Bitboard::row(piece.color.promotion_row());
        let promotes = piece.kind == PieceKind::Pawn && targets.intersects(last_row);
        for to in targets {
            if promotes && to.row() == piece.color.promotion_row() {
                for kind in PieceKind::PROMOTIONS {
                    self.push(Move::with_promotion(piece.square, to, kind));
                }
            } else {
                self.push(Move::new(piece.square, to));
            }
        }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Move] {
        &mut self.moves[..self.len]
    }

    /// Returns true if `m` is in the list.
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Target squares of `piece` ignoring check, pins and special moves.
///
/// `all` is the full occupancy and `same` the squares of the mover's own
/// color. Pawns capture diagonally onto enemy pieces only and push onto
/// empty squares only; the double step needs the single step to be empty.
pub fn pseudo_moves(piece: &Piece, all: Bitboard, same: Bitboard) -> Bitboard {
    let sq = piece.square;
    match piece.kind {
        PieceKind::King => king_attacks(sq) & !same,
        PieceKind::Knight => knight_attacks(sq) & !same,
        PieceKind::Rook => rook_attacks(sq, all) & !same,
        PieceKind::Bishop => bishop_attacks(sq, all) & !same,
        PieceKind::Queen => queen_attacks(sq, all) & !same,
        PieceKind::Pawn => {
            let enemy = all & !same;
            let captures = pawn_attacks(sq, piece.color) & enemy;
            let blocked = match sq.offset(piece.color.forward(), 0) {
                Some(step) => all.contains(step),
                None => true,
            };
            let pushes = if blocked {
                Bitboard::EMPTY
            } else {
                pawn_pushes(sq, piece.color) & !all
            };
            captures | pushes
        }
    }
}

/// Squares `piece` attacks under `occupied`, own pieces included.
///
/// Differs from [`pseudo_moves`] in that pawns count only their diagonals
/// and protected squares stay in the set.
pub fn attack_set(piece: &Piece, occupied: Bitboard) -> Bitboard {
    let sq = piece.square;
    match piece.kind {
        PieceKind::King => king_attacks(sq),
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::Pawn => pawn_attacks(sq, piece.color),
    }
}

/// Every square attacked by `by` when the board occupancy is `occupied`.
///
/// Callers pass the real occupancy minus the defending king to find the
/// squares that king may not step onto.
pub fn threatened_squares(board: &Board, by: Color, occupied: Bitboard) -> Bitboard {
    board
        .pieces_of(by)
        .fold(Bitboard::EMPTY, |acc, piece| acc | attack_set(piece, occupied))
}

/// Squares of `by`'s pieces attacking `sq`.
pub fn attackers_of(board: &Board, sq: Square, by: Color, occupied: Bitboard) -> Bitboard {
    let kinds = board.kinds(by);
    let of = |kind: PieceKind| kinds[kind.index()];
    let diagonal = of(PieceKind::Bishop) | of(PieceKind::Queen);
    let orthogonal = of(PieceKind::Rook) | of(PieceKind::Queen);

    (pawn_attacks(sq, by.opposite()) & of(PieceKind::Pawn))
        | (knight_attacks(sq) & of(PieceKind::Knight))
        | (king_attacks(sq) & of(PieceKind::King))
        | (bishop_attacks(sq, occupied) & diagonal)
        | (rook_attacks(sq, occupied) & orthogonal)
}

/// Returns true if any piece of `by` attacks `sq`.
#[inline]
pub fn is_square_attacked(board: &Board, sq: Square, by: Color) -> bool {
    attackers_of(board, sq, by, board.all()).is_not_empty()
}

/// Returns true if `color`'s king is attacked.
pub fn is_king_attacked(board: &Board, color: Color) -> bool {
    is_square_attacked(board, board.king_square(color), color.opposite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::FenParser;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn board(fen: &str) -> Board {
        let setup = FenParser::parse(fen).unwrap();
        Board::from_pieces(&setup.placement, setup.side_to_move).unwrap()
    }

    fn targets(board: &Board, from: &str) -> Bitboard {
        let piece = board.piece_at(sq(from)).unwrap();
        pseudo_moves(piece, board.all(), board.occupied_by(piece.color))
    }

    #[test]
    fn startpos_pseudo_moves() {
        let b = board(FenParser::STARTPOS);
        assert_eq!(targets(&b, "e2").count(), 2);
        assert_eq!(targets(&b, "g1").count(), 2);
        assert!(targets(&b, "a1").is_empty());
        assert!(targets(&b, "d1").is_empty());
        assert!(targets(&b, "e1").is_empty());
    }

    #[test]
    fn pawn_double_step_needs_clear_path() {
        let b = board("4k3/8/8/8/8/4n3/4P3/4K3 w - - 0 1");
        assert!(targets(&b, "e2").is_empty());

        let b = board("4k3/8/8/8/4n3/8/4P3/4K3 w - - 0 1");
        assert_eq!(targets(&b, "e2"), Bitboard::from_square(sq("e3")));
    }

    #[test]
    fn pawn_captures_only_enemies() {
        let b = board("4k3/8/8/8/8/3p1N2/4P3/4K3 w - - 0 1");
        let t = targets(&b, "e2");
        assert!(t.contains(sq("d3")));
        assert!(!t.contains(sq("f3")));
        assert!(t.contains(sq("e3")) && t.contains(sq("e4")));
    }

    #[test]
    fn black_pawn_moves_down() {
        let b = board("4k3/3p4/8/8/8/8/8/4K3 b - - 0 1");
        let t = targets(&b, "d7");
        assert_eq!(t, Bitboard::from_square(sq("d6")) | Bitboard::from_square(sq("d5")));
    }

    #[test]
    fn threatened_squares_include_protected_pieces() {
        let b = board("4k3/8/8/8/8/8/3PP3/4K3 w - - 0 1");
        let threats = threatened_squares(&b, Color::White, b.all());
        // The king protects its own pawns.
        assert!(threats.contains(sq("d2")));
        assert!(threats.contains(sq("e2")));
        // Pawns threaten diagonals, not pushes.
        assert!(threats.contains(sq("f3")));
        assert!(!threats.contains(sq("e4")));
    }

    #[test]
    fn attackers_found_from_all_directions() {
        let b = board("4k3/8/8/1b6/8/5n2/8/r3K3 w - - 0 1");
        let attackers = attackers_of(&b, Square::E1, Color::Black, b.all());
        assert!(!attackers.contains(sq("b5")));
        assert!(attackers.contains(sq("a1")));
        assert!(attackers.contains(sq("f3")));
        assert!(is_king_attacked(&b, Color::White));
        assert!(!is_king_attacked(&b, Color::Black));
    }

    #[test]
    fn move_list_expands_promotions() {
        let b = board("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1");
        let pawn = b.piece_at(sq("b7")).unwrap();
        let mut list = MoveList::new();
        list.push_targets(pawn, targets(&b, "b7"));
        assert_eq!(list.len(), 4);
        assert!(list.contains(Move::with_promotion(sq("b7"), sq("b8"), PieceKind::Knight)));
    }
}
