use crate::{
    board::{Position, DIAGONALS, KING_DELTAS, KNIGHT_DELTAS, ORTHOGONALS},
    types::*,
};

/// Generate all legal moves, returning a freshly allocated vector.
///
/// Moves come out in board-index order of their origin square, so the
/// sequence is reproducible for a given position.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    legal_moves_into(pos, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
pub fn legal_moves_into(pos: &Position, out: &mut Vec<Move>) {
    out.clear();
    pseudo_moves(pos, out);

    let mover = pos.side_to_move;
    out.retain(|&mv| !pos.play(mv).in_check(mover));
}

fn pseudo_moves(pos: &Position, out: &mut Vec<Move>) {
    for sq in 0..64u8 {
        let pc = match pos.piece_at(sq) {
            Some(p) => p,
            None => continue,
        };
        if pc.color != pos.side_to_move {
            continue;
        }
        match pc.kind {
            PieceKind::Pawn => gen_pawn(pos, sq, pc.color, out),
            PieceKind::Knight => gen_steps(pos, sq, pc.color, out, &KNIGHT_DELTAS),
            PieceKind::Bishop => gen_slider(pos, sq, pc.color, out, &DIAGONALS),
            PieceKind::Rook => gen_slider(pos, sq, pc.color, out, &ORTHOGONALS),
            PieceKind::Queen => {
                gen_slider(pos, sq, pc.color, out, &DIAGONALS);
                gen_slider(pos, sq, pc.color, out, &ORTHOGONALS);
            }
            PieceKind::King => {
                gen_steps(pos, sq, pc.color, out, &KING_DELTAS);
                gen_castle(pos, sq, pc.color, out);
            }
        }
    }
}

fn push_pawn_move(from: u8, to: u8, promo_rank: i8, out: &mut Vec<Move>) {
    if rank_of(to) == promo_rank {
        for pk in PieceKind::PROMOTIONS {
            out.push(Move::promotion(from, to, pk));
        }
    } else {
        out.push(Move::new(from, to));
    }
}

fn gen_pawn(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let f = file_of(from);
    let r = rank_of(from);

    let dir = c.forward();
    let (start_rank, promo_rank) = match c {
        Color::White => (1, 7),
        Color::Black => (6, 0),
    };

    // forward 1
    if let Some(to) = sq(f, r + dir) {
        if pos.piece_at(to).is_none() {
            push_pawn_move(from, to, promo_rank, out);

            // forward 2 from start
            if r == start_rank {
                if let Some(to2) = sq(f, r + 2 * dir) {
                    if pos.piece_at(to2).is_none() {
                        out.push(Move::double_push(from, to2));
                    }
                }
            }
        }
    }

    // captures + en-passant
    for df in [-1, 1] {
        if let Some(to) = sq(f + df, r + dir) {
            match pos.piece_at(to) {
                Some(tpc) if tpc.color != c => push_pawn_move(from, to, promo_rank, out),
                Some(_) => {}
                None if pos.en_passant == Some(to) => out.push(Move::en_passant(from, to)),
                None => {}
            }
        }
    }
}

/// Knight and king moves: one step along each delta.
fn gen_steps(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>, deltas: &[(i8, i8)]) {
    let f = file_of(from);
    let r = rank_of(from);
    for (df, dr) in deltas {
        if let Some(to) = sq(f + df, r + dr) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => out.push(Move::new(from, to)),
                _ => {}
            }
        }
    }
}

fn gen_slider(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>, dirs: &[(i8, i8)]) {
    let f0 = file_of(from);
    let r0 = rank_of(from);
    for (df, dr) in dirs {
        let mut f = f0 + df;
        let mut r = r0 + dr;
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) if pc.color != c => {
                    out.push(Move::new(from, to));
                    break;
                }
                _ => break,
            }
            f += df;
            r += dr;
        }
    }
}

/// One castling option: the right that enables it, king target, rook home,
/// squares that must be empty and squares the king crosses.
struct CastleRoute {
    right: bool,
    king_to: u8,
    rook_from: u8,
    empty: &'static [u8],
    safe: &'static [u8],
}

fn gen_castle(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let (king_from, routes) = match c {
        Color::White => (
            4u8,
            [
                CastleRoute {
                    right: pos.castling.wk,
                    king_to: 6,
                    rook_from: 7,
                    empty: &[5, 6],
                    safe: &[5, 6],
                },
                CastleRoute {
                    right: pos.castling.wq,
                    king_to: 2,
                    rook_from: 0,
                    empty: &[3, 2, 1],
                    safe: &[3, 2],
                },
            ],
        ),
        Color::Black => (
            60u8,
            [
                CastleRoute {
                    right: pos.castling.bk,
                    king_to: 62,
                    rook_from: 63,
                    empty: &[61, 62],
                    safe: &[61, 62],
                },
                CastleRoute {
                    right: pos.castling.bq,
                    king_to: 58,
                    rook_from: 56,
                    empty: &[59, 58, 57],
                    safe: &[59, 58],
                },
            ],
        ),
    };
    if from != king_from {
        return;
    }

    // Can't castle out of check.
    if pos.in_check(c) {
        return;
    }

    let enemy = c.other();
    for route in routes {
        if route.right
            && pos.piece_at(route.rook_from) == Some(Piece::new(c, PieceKind::Rook))
            && route.empty.iter().all(|&s| pos.piece_at(s).is_none())
            && route.safe.iter().all(|&s| !pos.is_square_attacked(s, enemy))
        {
            out.push(Move::castle(king_from, route.king_to));
        }
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
