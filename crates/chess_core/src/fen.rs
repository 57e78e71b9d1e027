//! Forsyth-Edwards Notation parsing and formatting.
//!
//! Parsing is strict: every field is validated and the first problem found is
//! reported together with the field it was found in. Formatting always
//! produces the six-field canonical form.

use crate::{
    board::{CastlingRights, Position},
    error::{ChessError, FenField},
    types::*,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&parts.len()) {
            return Err(ChessError::fen(
                FenField::Layout,
                format!("expected 4 to 6 fields, found {}", parts.len()),
            ));
        }

        let board = parse_placement(parts[0])?;

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::fen(
                    FenField::SideToMove,
                    format!("expected `w` or `b`, found `{other}`"),
                ))
            }
        };

        let castling = parse_castling(parts[2])?;
        let en_passant = parse_en_passant(parts[3])?;

        let halfmove_clock = match parts.get(4) {
            Some(txt) => txt.parse::<u32>().map_err(|_| {
                ChessError::fen(FenField::HalfmoveClock, format!("`{txt}` is not a count"))
            })?,
            None => 0,
        };
        let fullmove_number = match parts.get(5) {
            Some(txt) => match txt.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ChessError::fen(
                        FenField::FullmoveNumber,
                        format!("`{txt}` is not a positive move number"),
                    ))
                }
            },
            None => 1,
        };

        let pos = Position {
            board,
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        };
        pos.validate()?;
        Ok(pos)
    }

    /// Checks the cross-field invariants a parsed position must satisfy.
    fn validate(&self) -> Result<(), ChessError> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .board
                .iter()
                .filter(|pc| **pc == Some(Piece::new(color, PieceKind::King)))
                .count();
            if kings != 1 {
                return Err(ChessError::fen(
                    FenField::Placement,
                    format!("expected exactly one {color:?} king, found {kings}"),
                ));
            }
        }

        for (i, pc) in self.board.iter().enumerate() {
            if let Some(pc) = pc {
                let rank = rank_of(i as u8);
                if pc.kind == PieceKind::Pawn && (rank == 0 || rank == 7) {
                    return Err(ChessError::fen(
                        FenField::Placement,
                        format!("pawn on back rank at {}", sq_to_coord(i as u8)),
                    ));
                }
            }
        }

        let home = [
            (self.castling.wk, Color::White, 4u8, 7u8, 'K'),
            (self.castling.wq, Color::White, 4, 0, 'Q'),
            (self.castling.bk, Color::Black, 60, 63, 'k'),
            (self.castling.bq, Color::Black, 60, 56, 'q'),
        ];
        for (right, color, king, rook, token) in home {
            if right
                && (self.piece_at(king) != Some(Piece::new(color, PieceKind::King))
                    || self.piece_at(rook) != Some(Piece::new(color, PieceKind::Rook)))
            {
                return Err(ChessError::fen(
                    FenField::Castling,
                    format!("`{token}` without king and rook on their home squares"),
                ));
            }
        }

        if let Some(ep) = self.en_passant {
            // White to move means Black just pushed: target on rank 6.
            let mover = self.side_to_move;
            let pusher = mover.other();
            let expected_rank = match mover {
                Color::White => 5,
                Color::Black => 2,
            };
            let origin = sq(file_of(ep), rank_of(ep) - pusher.forward());
            let pushed = sq(file_of(ep), rank_of(ep) + pusher.forward());
            let plausible = rank_of(ep) == expected_rank
                && self.piece_at(ep).is_none()
                && origin.is_some_and(|s| self.piece_at(s).is_none())
                && pushed.is_some_and(|s| {
                    self.piece_at(s) == Some(Piece::new(pusher, PieceKind::Pawn))
                });
            if !plausible {
                return Err(ChessError::fen(
                    FenField::EnPassant,
                    format!(
                        "{} is not a plausible target with {mover:?} to move",
                        sq_to_coord(ep)
                    ),
                ));
            }
        }

        if self.in_check(self.side_to_move.other()) {
            return Err(ChessError::fen(
                FenField::SideToMove,
                "the side not to move is in check",
            ));
        }

        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.board[(rank * 8 + file) as usize] {
                    Some(pc) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(pc.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        let start = out.len();
        for (right, token) in self.castling.as_array().iter().zip(['K', 'Q', 'k', 'q']) {
            if *right {
                out.push(token);
            }
        }
        if out.len() == start {
            out.push('-');
        }

        out.push(' ');
        match self.en_passant {
            Some(ep) => out.push_str(&sq_to_coord(ep)),
            None => out.push('-'),
        }

        out.push_str(&format!(
            " {} {}",
            self.halfmove_clock, self.fullmove_number
        ));
        out
    }
}

fn parse_placement(field: &str) -> Result<[Option<Piece>; 64], ChessError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(ChessError::fen(
            FenField::Placement,
            format!("expected 8 ranks, found {}", ranks.len()),
        ));
    }

    let mut board = [None; 64];
    for (rank_idx, rank_str) in ranks.iter().enumerate() {
        let rank: i8 = 7 - rank_idx as i8; // FEN lists rank 8 .. 1
        let mut file: i8 = 0;
        let mut prev_digit = false;
        for ch in rank_str.chars() {
            if let Some(d) = ch.to_digit(10) {
                if !(1..=8).contains(&d) || prev_digit {
                    return Err(ChessError::fen(
                        FenField::Placement,
                        format!("bad empty-square run in rank {}", rank + 1),
                    ));
                }
                file += d as i8;
                prev_digit = true;
            } else {
                let pc = Piece::from_char(ch).ok_or_else(|| {
                    ChessError::fen(FenField::Placement, format!("unknown piece `{ch}`"))
                })?;
                if let Some(s) = sq(file, rank) {
                    board[s as usize] = Some(pc);
                }
                file += 1;
                prev_digit = false;
            }
            if file > 8 {
                return Err(ChessError::fen(
                    FenField::Placement,
                    format!("rank {} has more than 8 files", rank + 1),
                ));
            }
        }
        if file != 8 {
            return Err(ChessError::fen(
                FenField::Placement,
                format!("rank {} has {} files", rank + 1, file),
            ));
        }
    }
    Ok(board)
}

fn parse_castling(field: &str) -> Result<CastlingRights, ChessError> {
    let mut castling = CastlingRights::none();
    if field == "-" {
        return Ok(castling);
    }
    for c in field.chars() {
        let right = match c {
            'K' => &mut castling.wk,
            'Q' => &mut castling.wq,
            'k' => &mut castling.bk,
            'q' => &mut castling.bq,
            _ => {
                return Err(ChessError::fen(
                    FenField::Castling,
                    format!("unexpected character `{c}`"),
                ))
            }
        };
        if *right {
            return Err(ChessError::fen(
                FenField::Castling,
                format!("duplicate `{c}`"),
            ));
        }
        *right = true;
    }
    Ok(castling)
}

fn parse_en_passant(field: &str) -> Result<Option<u8>, ChessError> {
    if field == "-" {
        return Ok(None);
    }
    coord_to_sq(field).map(Some).ok_or_else(|| {
        ChessError::fen(FenField::EnPassant, format!("`{field}` is not a square"))
    })
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;
