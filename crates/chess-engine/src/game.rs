//! Game state and the move application API.
//!
//! [`Game`] owns the board, the special-move state and the threat lines for
//! the side to move, and keeps them in step: every applied move updates all
//! three before control returns. Cloning a game copies all of it, which is
//! how the search and perft branch.

use crate::board::Board;
use crate::error::PositionError;
use crate::legal::{self, ThreatLines};
use crate::movegen::{is_king_attacked, pseudo_moves, threatened_squares, MoveList};
use crate::special::{self, CastleSide, SpecialMove, SpecialState};
use crate::status::{DrawReason, GameResult, MoveStatus};
use crate::zobrist::ZOBRIST;
use crate::Bitboard;
use chess_core::{Color, FenParser, Move, Piece, PieceKind, PositionSetup, Square};

/// A position in play, with enough history to detect repetition.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    special: SpecialState,
    /// Check and pin lines against the side to move.
    lines: ThreatLines,
    /// Moves played since the position was loaded.
    history: Vec<Move>,
    halfmove_clock: u32,
    fullmove_number: u32,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a new game with the standard starting position.
    pub fn new() -> Self {
        Self::from_setup(&FenParser::startpos()).expect("standard start position is valid")
    }

    /// Creates a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Self::from_setup(&FenParser::parse(fen)?)
    }

    /// Creates a game from a parsed position.
    ///
    /// The position is rejected, never repaired, when it could not have
    /// arisen in play: missing or extra kings, pawns on a back rank, the side
    /// not to move in check, castling rights whose king or rook has left
    /// home, or an en passant target with no pawn behind it.
    pub fn from_setup(setup: &PositionSetup) -> Result<Self, PositionError> {
        let board = Board::from_pieces(&setup.placement, setup.side_to_move)?;

        if let Some(pawn) = board
            .pieces()
            .iter()
            .find(|p| p.kind == PieceKind::Pawn && (p.square.row() == 0 || p.square.row() == 7))
        {
            return Err(PositionError::PawnOnBackRank(pawn.square));
        }

        let special = SpecialState::new(setup.castling.into(), setup.en_passant);
        validate_castling(&board, &special)?;
        validate_en_passant(&board, &special)?;

        let waiting = setup.side_to_move.opposite();
        if is_king_attacked(&board, waiting) {
            return Err(PositionError::OpponentInCheck(waiting));
        }

        let lines = ThreatLines::scan(&board, setup.side_to_move);
        let mut game = Game {
            board,
            special,
            lines,
            history: Vec::new(),
            halfmove_clock: setup.halfmove_clock,
            fullmove_number: setup.fullmove_number.max(1),
            result: None,
        };
        game.result = game.evaluate_result();
        Ok(game)
    }

    /// Exports the position for display or logging.
    pub fn to_setup(&self) -> PositionSetup {
        PositionSetup {
            placement: self.board.pieces().to_vec(),
            side_to_move: self.board.side_to_move(),
            castling: self.special.castling.to_setup(),
            en_passant: self.special.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        }
    }

    /// Serializes the position in FEN notation.
    pub fn to_fen(&self) -> String {
        self.to_setup().to_fen()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn special(&self) -> &SpecialState {
        &self.special
    }

    pub fn threat_lines(&self) -> &ThreatLines {
        &self.lines
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Returns the piece on `sq`, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.piece_at(sq).copied()
    }

    /// Returns true if the side to move is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        self.lines.in_check()
    }

    /// Returns the game result, if the game has ended.
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Returns true if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// Moves played since the position was loaded.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Zobrist hash of the current position.
    pub fn hash(&self) -> u64 {
        ZOBRIST.hash(&self.board, &self.special)
    }

    /// Legal destinations of the piece on `sq`.
    ///
    /// Empty when the square is empty or holds a piece of the side not to
    /// move.
    pub fn legal_moves(&self, sq: Square) -> Bitboard {
        match self.board.piece_at(sq) {
            Some(piece) if piece.color == self.side_to_move() => self.legal_targets(piece),
            _ => Bitboard::EMPTY,
        }
    }

    /// Every legal move of the side to move, promotions expanded per kind.
    pub fn legal_move_list(&self) -> MoveList {
        let mut moves = MoveList::new();
        for piece in self.board.pieces_of(self.side_to_move()) {
            moves.push_targets(piece, self.legal_targets(piece));
        }
        moves
    }

    /// Returns true if the side to move has at least one legal move.
    pub fn has_legal_move(&self) -> bool {
        self.board
            .pieces_of(self.side_to_move())
            .any(|piece| self.legal_targets(piece).is_not_empty())
    }

    fn legal_targets(&self, piece: &Piece) -> Bitboard {
        let all = self.board.all();
        let candidates = pseudo_moves(piece, all, self.board.own());
        let extra = match piece.kind {
            PieceKind::King if self.special.castling.any(piece.color) => {
                let threatened = threatened_squares(&self.board, piece.color.opposite(), all);
                self.special.available_moves(&self.board, piece, threatened)
            }
            PieceKind::Pawn if self.special.en_passant.is_some() => {
                self.special.available_moves(&self.board, piece, Bitboard::EMPTY)
            }
            _ => Bitboard::EMPTY,
        };
        legal::filter(&self.board, &self.special, &self.lines, piece, candidates | extra)
    }

    /// Plays `from` to `to` if it is legal.
    ///
    /// `promotion` picks the piece a pawn becomes on the last row and
    /// defaults to a queen; it is ignored for every other move. Returns
    /// [`MoveStatus::NotExecuted`] without touching any state when the move
    /// is illegal, the promotion kind is not one of queen, rook, bishop or
    /// knight, or the game is already over.
    pub fn execute_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceKind>,
    ) -> MoveStatus {
        if self.result.is_some() {
            return MoveStatus::NotExecuted;
        }
        let Some(piece) = self.piece_at(from) else {
            return MoveStatus::NotExecuted;
        };
        if piece.color != self.side_to_move() || !self.legal_targets(&piece).contains(to) {
            return MoveStatus::NotExecuted;
        }

        let mv = if piece.kind == PieceKind::Pawn && to.row() == piece.color.promotion_row() {
            let kind = promotion.unwrap_or(PieceKind::Queen);
            if !PieceKind::PROMOTIONS.contains(&kind) {
                return MoveStatus::NotExecuted;
            }
            Move::with_promotion(from, to, kind)
        } else {
            Move::new(from, to)
        };

        self.make_move(mv);
        self.result = self.evaluate_result();

        let status = match self.result {
            Some(GameResult::Draw(_)) => MoveStatus::Draw,
            Some(_) => MoveStatus::Checkmate,
            None if self.is_check() => MoveStatus::Check,
            None => MoveStatus::Normal,
        };
        tracing::trace!(mv = %mv, ?status, "move executed");
        status
    }

    /// Applies a move taken from [`Game::legal_move_list`] without checking
    /// it.
    ///
    /// Updates the board, rights, en passant target, counters, history and
    /// threat lines, but not [`Game::result`]; [`Game::execute_move`] is the
    /// checked entry point that also settles the result.
    ///
    /// # Panics
    ///
    /// Panics if the origin square is empty.
    pub fn make_move(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());
        let Some(piece) = self.piece_at(from) else {
            panic!("board invariant violated: no piece on {}", from);
        };

        let special = self.special.classify(&piece, to);
        let capture = self.board.piece_at(to).is_some()
            || matches!(special, Some(SpecialMove::EnPassant { .. }));

        match special {
            Some(special) => special::execute(
                &mut self.board,
                special,
                &piece,
                to,
                mv.promotion().unwrap_or(PieceKind::Queen),
            ),
            None => {
                self.board.move_piece(from, Some(to));
            }
        }
        self.special.record_move(&piece, from, to);

        if piece.kind == PieceKind::Pawn || capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if piece.color == Color::Black {
            self.fullmove_number += 1;
        }

        self.board.flip_side();
        self.history.push(mv);
        self.lines = ThreatLines::scan(&self.board, self.board.side_to_move());
    }

    /// A draw that holds regardless of the moves available: repetition, the
    /// fifty-move rule or insufficient material.
    pub fn draw_by_rule(&self) -> Option<DrawReason> {
        if self.is_repetition() {
            Some(DrawReason::Repetition)
        } else if self.halfmove_clock >= 100 {
            Some(DrawReason::FiftyMoveRule)
        } else if self.is_insufficient_material() {
            Some(DrawReason::InsufficientMaterial)
        } else {
            None
        }
    }

    /// The last mover repeated the same step it made two and four of its own
    /// moves ago.
    fn is_repetition(&self) -> bool {
        let n = self.history.len();
        n >= 9 && {
            let last = self.history[n - 1];
            self.history[n - 5] == last && self.history[n - 9] == last
        }
    }

    /// Bare kings, or kings plus one knight or bishop.
    pub fn is_insufficient_material(&self) -> bool {
        let mut others = self
            .board
            .pieces()
            .iter()
            .filter(|p| p.kind != PieceKind::King);
        match (others.next(), others.next()) {
            (None, _) => true,
            (Some(p), None) => matches!(p.kind, PieceKind::Knight | PieceKind::Bishop),
            _ => false,
        }
    }

    fn evaluate_result(&self) -> Option<GameResult> {
        if !self.has_legal_move() {
            return Some(if self.is_check() {
                GameResult::mated(self.side_to_move())
            } else {
                GameResult::Draw(DrawReason::Stalemate)
            });
        }
        self.draw_by_rule().map(GameResult::Draw)
    }
}

fn validate_castling(board: &Board, special: &SpecialState) -> Result<(), PositionError> {
    for color in Color::BOTH {
        for side in CastleSide::ALL {
            if !special.castling.has(color, side) {
                continue;
            }
            let home = |sq: Square, kind: PieceKind| {
                board
                    .piece_at(sq)
                    .is_some_and(|p| p.kind == kind && p.color == color)
            };
            if !home(CastleSide::king_from(color), PieceKind::King)
                || !home(side.rook_from(color), PieceKind::Rook)
            {
                return Err(PositionError::InvalidCastling(format!("{} {:?}", color, side)));
            }
        }
    }
    Ok(())
}

fn validate_en_passant(board: &Board, special: &SpecialState) -> Result<(), PositionError> {
    let Some(target) = special.en_passant else {
        return Ok(());
    };
    // The opponent just stepped a pawn from its pawn row over `target`.
    let stepped = board.side_to_move().opposite();
    let expected_row = stepped.pawn_row() as i8 + stepped.forward();
    let pawn_ok = target
        .offset(stepped.forward(), 0)
        .and_then(|sq| board.piece_at(sq))
        .is_some_and(|p| p.kind == PieceKind::Pawn && p.color == stepped);

    if target.row() as i8 != expected_row || board.piece_at(target).is_some() || !pawn_ok {
        return Err(PositionError::InvalidEnPassant(target));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn play(game: &mut Game, moves: &[&str]) -> MoveStatus {
        let mut status = MoveStatus::NotExecuted;
        for uci in moves {
            let mv = Move::from_uci(uci).unwrap();
            status = game.execute_move(mv.from(), mv.to(), mv.promotion());
            assert!(status.is_executed(), "{} rejected", uci);
        }
        status
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.legal_move_list().len(), 20);
        assert!(!game.is_check());
        assert!(!game.is_game_over());
        assert_eq!(game.to_fen(), FenParser::STARTPOS);
    }

    #[test]
    fn legal_moves_per_square() {
        let game = Game::new();
        assert_eq!(game.legal_moves(sq("e2")).count(), 2);
        assert_eq!(game.legal_moves(sq("b1")).count(), 2);
        // Wrong side and empty squares have no moves.
        assert!(game.legal_moves(sq("e7")).is_empty());
        assert!(game.legal_moves(sq("e4")).is_empty());
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut game = Game::new();
        let before = game.to_fen();
        assert_eq!(game.execute_move(sq("e2"), sq("e5"), None), MoveStatus::NotExecuted);
        assert_eq!(game.execute_move(sq("e7"), sq("e5"), None), MoveStatus::NotExecuted);
        assert_eq!(game.execute_move(sq("e4"), sq("e5"), None), MoveStatus::NotExecuted);
        assert_eq!(game.to_fen(), before);
        assert!(game.history().is_empty());
    }

    #[test]
    fn counters_follow_moves() {
        let mut game = Game::new();
        play(&mut game, &["g1f3", "g8f6"]);
        assert_eq!(game.halfmove_clock(), 2);
        assert_eq!(game.fullmove_number(), 2);
        play(&mut game, &["e2e4"]);
        assert_eq!(game.halfmove_clock(), 0);
        assert_eq!(game.fullmove_number(), 2);
    }

    #[test]
    fn checkmate_fools_mate() {
        let mut game = Game::new();
        let status = play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(status, MoveStatus::Checkmate);
        assert!(game.is_game_over());
        assert_eq!(game.result(), Some(GameResult::BlackWins));
        assert_eq!(game.execute_move(sq("e2"), sq("e4"), None), MoveStatus::NotExecuted);
    }

    #[test]
    fn check_status() {
        let mut game = Game::new();
        let status = play(&mut game, &["e2e4", "f7f6", "d1h5"]);
        assert_eq!(status, MoveStatus::Check);
        assert!(game.is_check());
    }

    #[test]
    fn stalemate() {
        let game = Game::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(game.is_game_over());
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::Stalemate)));
    }

    #[test]
    fn repeated_step_draws() {
        let mut game = Game::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        play(&mut game, &shuffle);
        play(&mut game, &shuffle);
        assert!(!game.is_game_over());
        let status = play(&mut game, &["g1f3"]);
        assert_eq!(status, MoveStatus::Draw);
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::Repetition)));
    }

    #[test]
    fn fifty_move_rule() {
        let mut game = Game::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 1").unwrap();
        let status = play(&mut game, &["a1a2"]);
        assert_eq!(status, MoveStatus::Draw);
        assert_eq!(game.result(), Some(GameResult::Draw(DrawReason::FiftyMoveRule)));
    }

    #[test]
    fn insufficient_material() {
        let game = Game::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert_eq!(
            game.result(),
            Some(GameResult::Draw(DrawReason::InsufficientMaterial))
        );
        let game = Game::from_fen("8/8/8/8/8/8/8/4KB1k w - - 0 1").unwrap();
        assert!(game.is_insufficient_material());
        let game = Game::from_fen("8/8/8/8/8/8/8/3RK2k w - - 0 1").unwrap();
        assert!(!game.is_insufficient_material());
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(game.legal_moves(Square::E1).contains(Square::G1));
        assert!(game.legal_moves(Square::E1).contains(Square::C1));
        assert_eq!(game.execute_move(Square::E1, Square::G1, None), MoveStatus::Normal);
        assert_eq!(game.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        assert_eq!(game.execute_move(Square::E8, Square::C8, None), MoveStatus::Normal);
        assert_eq!(game.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
    }

    #[test]
    fn en_passant_lasts_one_ply() {
        let mut game = Game::new();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(game.special().en_passant, Some(sq("d6")));
        assert!(game.legal_moves(sq("e5")).contains(sq("d6")));

        let mut taken = game.clone();
        play(&mut taken, &["e5d6"]);
        assert!(taken.piece_at(sq("d5")).is_none());
        assert_eq!(taken.board().pieces().len(), 31);

        play(&mut game, &["h2h3", "h7h6"]);
        assert!(!game.legal_moves(sq("e5")).contains(sq("d6")));
    }

    #[test]
    fn promotion_kinds() {
        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            game.clone().execute_move(sq("a7"), sq("a8"), Some(PieceKind::King)),
            MoveStatus::NotExecuted
        );
        assert_eq!(
            game.execute_move(sq("a7"), sq("a8"), Some(PieceKind::Knight)),
            MoveStatus::Normal
        );
        assert_eq!(game.piece_at(sq("a8")).map(|p| p.kind), Some(PieceKind::Knight));

        let mut game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game.execute_move(sq("a7"), sq("a8"), None), MoveStatus::Check);
        assert_eq!(game.piece_at(sq("a8")).map(|p| p.kind), Some(PieceKind::Queen));
        assert_eq!(game.legal_move_list().len(), 3);
    }

    #[test]
    fn promotions_expand_in_move_list() {
        let game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let promos = game
            .legal_move_list()
            .as_slice()
            .iter()
            .filter(|m| m.promotion().is_some())
            .count();
        assert_eq!(promos, 4);
    }

    #[test]
    fn rejects_impossible_positions() {
        assert!(matches!(
            Game::from_fen("4k3/8/8/8/8/8/8/8 w - - 0 1"),
            Err(PositionError::MissingKing(Color::White))
        ));
        assert!(matches!(
            Game::from_fen("P3k3/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(PositionError::PawnOnBackRank(_))
        ));
        assert!(matches!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K2R b - - 0 1"),
            Ok(_)
        ));
        assert!(matches!(
            Game::from_fen("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1"),
            Err(PositionError::OpponentInCheck(Color::Black))
        ));
        assert!(matches!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(PositionError::InvalidCastling(_))
        ));
        assert!(matches!(
            Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1"),
            Err(PositionError::InvalidEnPassant(_))
        ));
        assert!(matches!(
            Game::from_fen("4k3/8/8/8"),
            Err(PositionError::Fen(_))
        ));
    }

    #[test]
    fn setup_round_trip() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        assert_eq!(Game::from_fen(fen).unwrap().to_fen(), fen);
        let fen = "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        assert_eq!(Game::from_fen(fen).unwrap().to_fen(), fen);
    }

    #[test]
    fn hash_tracks_position() {
        let mut a = Game::new();
        let mut b = Game::new();
        play(&mut a, &["g1f3", "g8f6", "b1c3"]);
        play(&mut b, &["b1c3", "g8f6", "g1f3"]);
        assert_eq!(a.hash(), b.hash());
        assert_ne!(a.hash(), Game::new().hash());
    }
}
