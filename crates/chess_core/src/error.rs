//! Error types for position parsing and move application.

use std::fmt;

use thiserror::Error;

/// The FEN field a parse failure was detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FenField {
    /// Wrong number of whitespace-separated fields.
    Layout,
    Placement,
    SideToMove,
    Castling,
    EnPassant,
    HalfmoveClock,
    FullmoveNumber,
}

impl fmt::Display for FenField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FenField::Layout => "field count",
            FenField::Placement => "piece placement",
            FenField::SideToMove => "side to move",
            FenField::Castling => "castling rights",
            FenField::EnPassant => "en passant square",
            FenField::HalfmoveClock => "halfmove clock",
            FenField::FullmoveNumber => "fullmove number",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid fen ({field}): {reason}")]
    InvalidFen { field: FenField, reason: String },

    /// Well-formed move that is not legal in the position it was applied to.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// Move text that is not coordinate notation at all.
    #[error("malformed move: {0}")]
    MalformedMove(String),
}

impl ChessError {
    pub(crate) fn fen(field: FenField, reason: impl Into<String>) -> Self {
        ChessError::InvalidFen {
            field,
            reason: reason.into(),
        }
    }
}
