//! Terminal-state detection: checkmate, stalemate and the draw rules a single
//! position can decide on its own.

use chess_core::{legal_moves, parse_uci_move, Color, Position, Terminal};

fn fen(txt: &str) -> Position {
    Position::from_fen(txt).unwrap()
}

fn play(pos: &Position, moves: &[&str]) -> Position {
    moves.iter().fold(pos.clone(), |p, txt| {
        let mv = parse_uci_move(&p, txt).unwrap();
        p.apply(mv).unwrap()
    })
}

// =============================================================================
// Checkmate Tests
// =============================================================================

#[test]
fn test_scholars_mate_played_out() {
    let pos = play(
        &Position::startpos(),
        &["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"],
    );
    assert_eq!(pos.terminal(), Terminal::Checkmate);
    assert!(pos.in_check(Color::Black));
}

#[test]
fn test_fools_mate() {
    let pos = play(&Position::startpos(), &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(pos.terminal(), Terminal::Checkmate);
    assert_eq!(pos.side_to_move, Color::White);
}

#[test]
fn test_check_is_not_mate() {
    let pos = fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
    assert!(pos.in_check(Color::White));
    assert_eq!(pos.terminal(), Terminal::Ongoing);
}

// =============================================================================
// Stalemate Tests
// =============================================================================

#[test]
fn test_stalemate_king_in_corner() {
    // Black king in corner, white queen stalemates
    let pos = fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
    assert!(legal_moves(&pos).is_empty());
    assert!(!pos.in_check(Color::Black), "Stalemate means king is not in check");
    assert_eq!(pos.terminal(), Terminal::Stalemate);
}

#[test]
fn test_stalemate_king_and_pawn_endgame() {
    let pos = fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1");
    assert_eq!(pos.terminal(), Terminal::Stalemate);
}

// =============================================================================
// Fifty-Move Rule Tests
// =============================================================================

#[test]
fn test_fifty_move_rule_at_100_halfmoves() {
    let pos = fen("8/8/8/4k3/8/4K3/8/R7 w - - 100 60");
    assert!(pos.is_fifty_move_draw());
    assert_eq!(pos.terminal(), Terminal::Draw);
}

#[test]
fn test_fifty_move_rule_at_99_halfmoves() {
    let pos = fen("8/8/8/4k3/8/4K3/8/R7 w - - 99 60");
    assert!(!pos.is_fifty_move_draw());
    assert_eq!(pos.terminal(), Terminal::Ongoing);
}

#[test]
fn test_fifty_move_rule_reached_by_quiet_move() {
    let pos = fen("8/8/8/4k3/8/4K3/8/R7 w - - 99 60");
    let next = play(&pos, &["a1a2"]);
    assert_eq!(next.halfmove_clock, 100);
    assert_eq!(next.terminal(), Terminal::Draw);
}

#[test]
fn test_fifty_move_rule_reset_on_pawn_move() {
    let pos = fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60");
    let next = play(&pos, &["e2e3"]);
    assert_eq!(next.halfmove_clock, 0);
    assert_eq!(next.terminal(), Terminal::Ongoing);
}

// =============================================================================
// Insufficient Material Tests
// =============================================================================

#[test]
fn test_insufficient_material_after_last_capture() {
    // Knight takes the last pawn: K+N v K
    let pos = fen("8/8/8/4k3/8/4K3/3p4/1N6 w - - 0 1");
    let next = play(&pos, &["b1d2"]);
    assert_eq!(next.terminal(), Terminal::Draw);
}

#[test]
fn test_sufficient_material_with_queen() {
    let pos = fen("8/8/8/4k3/8/4K3/8/3Q4 w - - 0 1");
    assert!(!pos.is_insufficient_material());
}

// =============================================================================
// Position Hash Tests (for threefold repetition)
// =============================================================================

#[test]
fn test_knight_shuffle_repeats_hash() {
    let start = Position::startpos();
    let mut history = vec![start.hash()];
    let mut pos = start.clone();
    for _ in 0..2 {
        for txt in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            pos = play(&pos, &[txt]);
            history.push(pos.hash());
        }
    }
    let count = history.iter().filter(|&&h| h == start.hash()).count();
    assert_eq!(count, 3, "Position should appear three times (threefold repetition)");
}

#[test]
fn test_hash_sees_en_passant_and_castling() {
    let with_ep = fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3");
    let without_ep = fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3");
    assert_ne!(with_ep.hash(), without_ep.hash());

    let no_castle = fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w Qkq - 0 3");
    assert_ne!(no_castle.hash(), without_ep.hash());
}
