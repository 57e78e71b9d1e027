//! Coordinate move notation (`e2e4`, `e7e8q`) as used on the UCI wire.

use crate::{board::Position, error::ChessError, movegen::legal_moves, types::*};

/// Text sent for "no move", e.g. `bestmove 0000` in a mated position.
pub const NULL_MOVE_TEXT: &str = "0000";

pub fn move_to_uci(mv: Move) -> String {
    let mut s = String::with_capacity(5);
    s.push_str(&sq_to_coord(mv.from));
    s.push_str(&sq_to_coord(mv.to));
    if let Some(p) = mv.promo {
        s.push(p.to_char());
    }
    s
}

/// Formats a line of moves separated by single spaces.
pub fn line_to_uci(line: &[Move]) -> String {
    line.iter()
        .map(|&mv| move_to_uci(mv))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Splits move text into (from, to, promotion) without consulting a position.
pub fn parse_move_text(txt: &str) -> Result<(u8, u8, Option<PieceKind>), ChessError> {
    let malformed = || ChessError::MalformedMove(txt.to_string());
    if !txt.is_ascii() || !(4..=5).contains(&txt.len()) {
        return Err(malformed());
    }
    let from = coord_to_sq(&txt[0..2]).ok_or_else(malformed)?;
    let to = coord_to_sq(&txt[2..4]).ok_or_else(malformed)?;
    let promo = match txt[4..].chars().next() {
        Some(ch) if !ch.is_ascii_lowercase() => return Err(malformed()),
        Some(ch) => match PieceKind::from_char(ch) {
            Some(kind @ (PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight)) => {
                Some(kind)
            }
            _ => return Err(malformed()),
        },
        None => None,
    };
    Ok((from, to, promo))
}

/// Resolves move text against the legal moves of `pos`.
///
/// Matching against the generator gives the move its castle/en-passant/
/// double-push flags. The promotion letter must match exactly: `e7e8` does not
/// stand in for `e7e8q`.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Result<Move, ChessError> {
    let (from, to, promo) = parse_move_text(txt)?;
    legal_moves(pos)
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promo == promo)
        .ok_or_else(|| ChessError::IllegalMove(txt.to_string()))
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
