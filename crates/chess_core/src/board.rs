use crate::{error::ChessError, movegen::legal_moves, types::*, uci::move_to_uci, zobrist::ZOBRIST};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        wk: true,
        wq: true,
        bk: true,
        bq: true,
    };

    pub fn none() -> Self {
        Self::default()
    }

    /// Rights in Zobrist/FEN order: K, Q, k, q.
    pub fn as_array(&self) -> [bool; 4] {
        [self.wk, self.wq, self.bk, self.bq]
    }
}

/// Game-ending state of a single position, ignoring move history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terminal {
    Ongoing,
    Checkmate,
    Stalemate,
    /// Fifty-move rule or insufficient material.
    Draw,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>, // square behind a pawn that just advanced 2
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        let mut p = Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        };

        // Pawns
        for f in 0..8 {
            p.board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            p.board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
        }
        // Back ranks
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
        for (f, &kind) in back.iter().enumerate() {
            p.board[f] = Some(Piece::new(Color::White, kind));
            p.board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        p
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        self.board
            .iter()
            .position(|pc| *pc == Some(Piece::new(c, PieceKind::King)))
            .map(|i| i as u8)
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }
    pub fn set_piece(&mut self, sq: u8, pc: Option<Piece>) {
        self.board[sq as usize] = pc;
    }

    pub fn in_check(&self, c: Color) -> bool {
        let ksq = match self.king_sq(c) {
            Some(s) => s,
            None => return false,
        };
        self.is_square_attacked(ksq, c.other())
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        let tf = file_of(target);
        let tr = rank_of(target);
        let hits = |s: Option<u8>, kinds: &[PieceKind]| -> bool {
            match s.and_then(|s| self.piece_at(s)) {
                Some(pc) => pc.color == by && kinds.contains(&pc.kind),
                None => false,
            }
        };

        // A pawn of `by` attacks the target from one rank behind it.
        let pawn_rank = tr - by.forward();
        if hits(sq(tf - 1, pawn_rank), &[PieceKind::Pawn])
            || hits(sq(tf + 1, pawn_rank), &[PieceKind::Pawn])
        {
            return true;
        }

        if KNIGHT_DELTAS
            .iter()
            .any(|(df, dr)| hits(sq(tf + df, tr + dr), &[PieceKind::Knight]))
        {
            return true;
        }

        if KING_DELTAS
            .iter()
            .any(|(df, dr)| hits(sq(tf + df, tr + dr), &[PieceKind::King]))
        {
            return true;
        }

        // Sliding: bishop/rook/queen
        let rays = [
            (&DIAGONALS, [PieceKind::Bishop, PieceKind::Queen]),
            (&ORTHOGONALS, [PieceKind::Rook, PieceKind::Queen]),
        ];
        for (dirs, kinds) in rays {
            for (df, dr) in dirs.iter() {
                let mut f = tf + df;
                let mut r = tr + dr;
                while let Some(sq2) = sq(f, r) {
                    if let Some(pc) = self.piece_at(sq2) {
                        if pc.color == by && kinds.contains(&pc.kind) {
                            return true;
                        }
                        break;
                    }
                    f += df;
                    r += dr;
                }
            }
        }

        false
    }

    /// Returns the position after `mv`, which must come from the move generator.
    ///
    /// No legality check is done; use [`Position::apply`] for untrusted moves.
    pub fn play(&self, mv: Move) -> Position {
        let mut next = self.clone();
        next.make_move(mv);
        next
    }

    /// Returns the position after `mv`, failing if `mv` is not one of the
    /// legal moves of this position.
    pub fn apply(&self, mv: Move) -> Result<Position, ChessError> {
        if legal_moves(self).contains(&mv) {
            Ok(self.play(mv))
        } else {
            Err(ChessError::IllegalMove(move_to_uci(mv)))
        }
    }

    fn make_move(&mut self, mv: Move) {
        let from = mv.from;
        let to = mv.to;
        let moved = match self.piece_at(from) {
            Some(pc) => pc,
            None => return,
        };
        let mut captured = self.piece_at(to);

        self.en_passant = None;

        // Halfmove clock reset on capture or pawn move
        let mut reset_hmc = moved.kind == PieceKind::Pawn || captured.is_some();

        if mv.is_en_passant {
            // The captured pawn sits beside the mover, behind the target square.
            if let Some(cs) = sq(file_of(to), rank_of(to) - moved.color.forward()) {
                captured = self.piece_at(cs);
                self.set_piece(cs, None);
                reset_hmc = true;
            }
        }

        self.set_piece(from, None);
        self.set_piece(to, Some(moved));

        if moved.kind == PieceKind::Pawn && (rank_of(to) == 7 || rank_of(to) == 0) {
            let promo = mv.promo.unwrap_or(PieceKind::Queen);
            self.set_piece(to, Some(Piece::new(moved.color, promo)));
        }

        if mv.is_castle && moved.kind == PieceKind::King {
            // e1->g1 rook h1->f1, e1->c1 rook a1->d1, mirrored for Black
            let rook_squares = match (from, to) {
                (4, 6) => Some((7, 5)),
                (4, 2) => Some((0, 3)),
                (60, 62) => Some((63, 61)),
                (60, 58) => Some((56, 59)),
                _ => None,
            };
            if let Some((rf, rt)) = rook_squares {
                let rook = self.piece_at(rf);
                self.set_piece(rf, None);
                self.set_piece(rt, rook);
            }
        }

        // Moving from or capturing on a home square drops the matching right.
        for touched in [from, to] {
            match touched {
                0 => self.castling.wq = false,
                7 => self.castling.wk = false,
                56 => self.castling.bq = false,
                63 => self.castling.bk = false,
                _ => {}
            }
        }
        if moved.kind == PieceKind::King {
            match moved.color {
                Color::White => {
                    self.castling.wk = false;
                    self.castling.wq = false;
                }
                Color::Black => {
                    self.castling.bk = false;
                    self.castling.bq = false;
                }
            }
        }

        // Double pawn push sets en-passant square
        if moved.kind == PieceKind::Pawn && (rank_of(to) - rank_of(from)).abs() == 2 {
            self.en_passant = sq(file_of(from), (rank_of(from) + rank_of(to)) / 2);
        }

        self.halfmove_clock = if reset_hmc {
            0
        } else {
            self.halfmove_clock + 1
        };

        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.other();
    }

    /// Zobrist key of the position, used for repetition detection.
    pub fn hash(&self) -> u64 {
        let mut h = 0u64;
        for (i, pc) in self.board.iter().enumerate() {
            if let Some(pc) = pc {
                h ^= ZOBRIST.piece_key(*pc, i as u8);
            }
        }
        if self.side_to_move == Color::Black {
            h ^= ZOBRIST.side_to_move;
        }
        for (i, right) in self.castling.as_array().iter().enumerate() {
            if *right {
                h ^= ZOBRIST.castling_key(i);
            }
        }
        if let Some(ep) = self.en_passant {
            h ^= ZOBRIST.ep_key(file_of(ep) as u8);
        }
        h
    }

    /// Canonical key for opening-book lookups: the first four FEN fields.
    pub fn fingerprint(&self) -> String {
        let fen = self.to_fen();
        fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can deliver mate with the material left on the board.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();
        for (i, pc) in self.board.iter().enumerate() {
            let Some(pc) = pc else { continue };
            match pc.kind {
                PieceKind::King => {}
                PieceKind::Knight | PieceKind::Bishop => minors.push((i as u8, *pc)),
                _ => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            [(s1, p1), (s2, p2)] => {
                let square_color = |s: u8| (file_of(s) + rank_of(s)) % 2;
                p1.kind == PieceKind::Bishop
                    && p2.kind == PieceKind::Bishop
                    && p1.color != p2.color
                    && square_color(*s1) == square_color(*s2)
            }
            _ => false,
        }
    }

    pub fn terminal(&self) -> Terminal {
        if legal_moves(self).is_empty() {
            if self.in_check(self.side_to_move) {
                Terminal::Checkmate
            } else {
                Terminal::Stalemate
            }
        } else if self.is_fifty_move_draw() || self.is_insufficient_material() {
            Terminal::Draw
        } else {
            Terminal::Ongoing
        }
    }
}

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];

pub(crate) const KING_DELTAS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

pub(crate) const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
