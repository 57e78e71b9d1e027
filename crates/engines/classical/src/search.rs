//! Iterative deepening negamax with alpha-beta pruning and quiescence search.

use std::cmp::Reverse;

use chess_core::{
    legal_moves_into, Move, PieceKind, Position, SearchLimits, SearchResult, TimeControl, MATE,
    MATE_THRESHOLD,
};
use tracing::debug;

use crate::eval::{evaluate, PIECE_VALUES};

/// Hard cap on recursion, quiescence included.
const MAX_PLY: usize = 128;

/// Ordering key: captures by most valuable victim then least valuable
/// attacker, promotions by piece, quiet moves keep generator order.
fn order_key(pos: &Position, mv: Move, hint: Option<Move>) -> i32 {
    if hint == Some(mv) {
        return 1_000_000;
    }
    let mut key = 0;
    let victim = if mv.is_en_passant {
        Some(PieceKind::Pawn)
    } else {
        pos.piece_at(mv.to).map(|pc| pc.kind)
    };
    if let Some(victim) = victim {
        let attacker = pos.piece_at(mv.from).map(|pc| pc.kind).unwrap_or(PieceKind::Pawn);
        key += 10 * PIECE_VALUES[victim.idx()] - PIECE_VALUES[attacker.idx()] + 10_000;
    }
    if let Some(promo) = mv.promo {
        key += PIECE_VALUES[promo.idx()];
    }
    key
}

fn order_moves(pos: &Position, moves: &mut [Move], hint: Option<Move>) {
    // Stable: equal keys keep generator order
    moves.sort_by_key(|&mv| Reverse(order_key(pos, mv, hint)));
}

fn is_tactical(pos: &Position, mv: Move) -> bool {
    mv.promo.is_some() || mv.is_en_passant || pos.piece_at(mv.to).is_some()
}

/// State shared by every node of one search.
struct Searcher<'a> {
    tc: &'a TimeControl,
    nodes: u64,
    /// Hashes of the game so far followed by the current search path
    path: Vec<u64>,
    /// Principal variation of the previous iteration, used for ordering
    prev_pv: Vec<Move>,
}

impl Searcher<'_> {
    /// Counts the node and reports whether the search must unwind.
    #[inline]
    fn enter_node(&mut self) -> bool {
        self.nodes += 1;
        self.tc.is_stopped() || (self.tc.should_check_time(self.nodes) && self.tc.check_time())
    }

    fn is_repetition(&self, hash: u64) -> bool {
        self.path.iter().filter(|&&h| h == hash).count() >= 3
    }

    /// Returns (score, stopped); a stopped score is meaningless.
    fn negamax(
        &mut self,
        pos: &Position,
        depth: u8,
        ply: usize,
        mut alpha: i32,
        beta: i32,
        pv: &mut Vec<Move>,
    ) -> (i32, bool) {
        pv.clear();
        if self.enter_node() {
            return (0, true);
        }

        if ply > 0 {
            if self.path.last().is_some_and(|&h| self.is_repetition(h)) {
                return (0, false); // threefold repetition draw
            }
            if pos.is_insufficient_material() {
                return (0, false);
            }
        }

        let mut moves = Vec::with_capacity(64);
        legal_moves_into(pos, &mut moves);

        if moves.is_empty() {
            if pos.in_check(pos.side_to_move) {
                return (-(MATE - ply as i32), false); // Checkmate
            }
            return (0, false); // Stalemate
        }

        if ply > 0 && pos.is_fifty_move_draw() {
            return (0, false);
        }

        if depth == 0 || ply >= MAX_PLY {
            return self.quiescence(pos, ply, alpha, beta);
        }

        order_moves(pos, &mut moves, self.prev_pv.get(ply).copied());

        let mut best = -MATE - 1;
        let mut child_pv = Vec::new();

        for mv in moves {
            let child = pos.play(mv);
            self.path.push(child.hash());
            let (score, stopped) = self.negamax(&child, depth - 1, ply + 1, -beta, -alpha, &mut child_pv);
            self.path.pop();

            if stopped {
                return (best, true);
            }

            let score = -score;
            if score > best {
                best = score;
                if score > alpha {
                    alpha = score;
                    pv.clear();
                    pv.push(mv);
                    pv.extend_from_slice(&child_pv);
                }
            }
            if alpha >= beta {
                break; // Beta cutoff
            }
        }

        (best, false)
    }

    /// Resolves captures and promotions so leaves are not evaluated mid-exchange.
    fn quiescence(&mut self, pos: &Position, ply: usize, mut alpha: i32, beta: i32) -> (i32, bool) {
        if self.enter_node() {
            return (0, true);
        }

        let mut moves = Vec::with_capacity(64);
        legal_moves_into(pos, &mut moves);
        if moves.is_empty() {
            if pos.in_check(pos.side_to_move) {
                return (-(MATE - ply as i32), false);
            }
            return (0, false);
        }

        let stand_pat = evaluate(pos);
        if stand_pat >= beta || ply >= MAX_PLY {
            return (stand_pat, false);
        }
        alpha = alpha.max(stand_pat);

        moves.retain(|&mv| is_tactical(pos, mv));
        order_moves(pos, &mut moves, None);

        let mut best = stand_pat;
        for mv in moves {
            let (score, stopped) = self.quiescence(&pos.play(mv), ply + 1, -beta, -alpha);
            if stopped {
                return (best, true);
            }
            let score = -score;
            if score > best {
                best = score;
                alpha = alpha.max(score);
            }
            if alpha >= beta {
                break;
            }
        }
        (best, false)
    }
}

/// Searches depth 1, 2, ... up to `limits.depth`, calling `on_depth` after
/// every completed iteration.
///
/// An iteration cut short by the stop flag or the clock is thrown away and
/// the deepest completed one is returned. When not even depth 1 completed,
/// the first ordered legal move is returned with the static evaluation.
/// `best_move` is `None` only when the side to move has no legal move.
pub fn iterative_deepening(
    pos: &Position,
    history: &[u64],
    limits: &SearchLimits,
    nodes: &mut u64,
    on_depth: &mut dyn FnMut(&SearchResult),
) -> SearchResult {
    let mut tc = limits.time_control.clone();
    tc.start();

    let mut root_moves = Vec::with_capacity(64);
    legal_moves_into(pos, &mut root_moves);
    if root_moves.is_empty() {
        let score = if pos.in_check(pos.side_to_move) { -MATE } else { 0 };
        return SearchResult {
            score,
            ..SearchResult::default()
        };
    }
    order_moves(pos, &mut root_moves, None);

    let fallback = root_moves[0];
    let mut best = SearchResult {
        best_move: Some(fallback),
        score: evaluate(pos),
        depth: 0,
        pv: vec![fallback],
        nodes: 0,
        stopped: false,
    };

    let mut path = Vec::with_capacity(history.len() + MAX_PLY);
    path.extend_from_slice(history);
    path.push(pos.hash());
    let mut searcher = Searcher {
        tc: &tc,
        nodes: 0,
        path,
        prev_pv: Vec::new(),
    };

    let mut pv = Vec::new();
    for depth in 1..=limits.depth {
        let (score, stopped) = searcher.negamax(pos, depth, 0, -MATE - 1, MATE + 1, &mut pv);
        if stopped {
            best.stopped = true;
            break;
        }

        best = SearchResult {
            best_move: pv.first().copied().or(Some(fallback)),
            score,
            depth,
            pv: pv.clone(),
            nodes: searcher.nodes,
            stopped: false,
        };
        debug!(depth, score, nodes = searcher.nodes, "iteration complete");
        on_depth(&best);
        searcher.prev_pv = pv.clone();

        // A forced mate inside the horizon cannot change with more depth
        if score.abs() >= MATE_THRESHOLD && MATE - score.abs() <= depth as i32 {
            break;
        }
    }

    best.nodes = searcher.nodes;
    *nodes = searcher.nodes;
    best
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
