//! FEN (Forsyth-Edwards Notation) parsing into a [`PositionSetup`].

use crate::{CastlingSetup, Color, Piece, PieceKind, PositionSetup, Square};
use thiserror::Error;

/// Errors that can occur when parsing FEN strings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 6 parts, got {0}")]
    InvalidPartCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// FEN reader. Checks the notation only; board-level sanity (one king per
/// side and so on) is left to whoever builds a board from the result.
pub struct FenParser;

impl FenParser {
    /// The standard starting position FEN.
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    /// Parses a FEN string.
    pub fn parse(fen: &str) -> Result<PositionSetup, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() != 6 {
            return Err(FenError::InvalidPartCount(parts.len()));
        }

        let placement = Self::parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::InvalidActiveColor(other.to_string())),
        };

        let castling = Self::parse_castling(parts[2])?;
        let en_passant = Self::parse_en_passant(parts[3])?;

        let halfmove_clock = parts[4]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidHalfmoveClock(parts[4].to_string()))?;

        let fullmove_number = parts[5]
            .parse::<u32>()
            .map_err(|_| FenError::InvalidFullmoveNumber(parts[5].to_string()))?;

        Ok(PositionSetup {
            placement,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Parses the standard starting position.
    pub fn startpos() -> PositionSetup {
        let rights = CastlingSetup::ALL;
        let mut placement = Vec::with_capacity(32);
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for color in Color::BOTH {
            for (col, kind) in back.into_iter().enumerate() {
                if let Some(sq) = Square::new(color.home_row(), col as u8) {
                    placement.push(Piece::new(kind, color, sq));
                }
            }
            for col in 0..8u8 {
                if let Some(sq) = Square::new(color.pawn_row(), col) {
                    placement.push(Piece::new(PieceKind::Pawn, color, sq));
                }
            }
        }
        PositionSetup {
            placement,
            side_to_move: Color::White,
            castling: rights,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    fn parse_placement(placement: &str) -> Result<Vec<Piece>, FenError> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                rows.len()
            )));
        }

        let mut pieces = Vec::new();
        for (i, text) in rows.iter().enumerate() {
            let row = 7 - i as u8;
            let mut col = 0u32;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip;
                } else if let Some((kind, color)) = PieceKind::from_fen_char(c) {
                    let sq = Square::new(row, col as u8).ok_or_else(|| {
                        FenError::InvalidPiecePlacement(format!(
                            "rank {} has more than 8 squares",
                            row + 1
                        ))
                    })?;
                    pieces.push(Piece::new(kind, color, sq));
                    col += 1;
                } else {
                    return Err(FenError::InvalidPiecePlacement(format!(
                        "invalid character '{}' in rank {}",
                        c,
                        row + 1
                    )));
                }
            }
            if col != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} has {} squares, expected 8",
                    row + 1,
                    col
                )));
            }
        }

        Ok(pieces)
    }

    fn parse_castling(castling: &str) -> Result<CastlingSetup, FenError> {
        let mut rights = CastlingSetup::NONE;
        if castling == "-" {
            return Ok(rights);
        }

        for c in castling.chars() {
            match c {
                'K' => rights.white_short = true,
                'Q' => rights.white_long = true,
                'k' => rights.black_short = true,
                'q' => rights.black_long = true,
                _ => {
                    return Err(FenError::InvalidCastlingRights(format!(
                        "invalid character '{}'",
                        c
                    )))
                }
            }
        }

        Ok(rights)
    }

    fn parse_en_passant(ep: &str) -> Result<Option<Square>, FenError> {
        if ep == "-" {
            return Ok(None);
        }

        match Square::from_algebraic(ep) {
            Some(sq) if sq.row() == 2 || sq.row() == 5 => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(ep.to_string())),
        }
    }
}
