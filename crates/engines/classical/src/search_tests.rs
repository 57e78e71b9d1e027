use super::*;
use chess_core::{legal_moves, move_to_uci, parse_uci_move, Score, TimeControl};
use std::time::{Duration, Instant};

fn fen(txt: &str) -> Position {
    Position::from_fen(txt).unwrap()
}

fn run(pos: &Position, limits: SearchLimits) -> (SearchResult, Vec<SearchResult>) {
    let mut nodes = 0;
    let mut reports = Vec::new();
    let result = iterative_deepening(pos, &[], &limits, &mut nodes, &mut |r| reports.push(r.clone()));
    (result, reports)
}

#[test]
fn test_start_position_returns_legal_move() {
    let pos = Position::startpos();
    let (result, reports) = run(&pos, SearchLimits::depth(3));
    let mv = result.best_move.unwrap();
    assert!(legal_moves(&pos).contains(&mv));
    assert_eq!(result.depth, 3);
    assert_eq!(reports.len(), 3);
    assert_eq!(result.pv.first(), Some(&mv));
    assert!(result.nodes > 0);
    assert!(!result.stopped);
}

#[test]
fn test_finds_back_rank_mate_in_one() {
    let pos = fen("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1");
    let (result, _) = run(&pos, SearchLimits::depth(3));
    assert_eq!(move_to_uci(result.best_move.unwrap()), "e1e8");
    assert_eq!(result.uci_score(), Score::Mate(1));
}

#[test]
fn test_mate_score_persists_across_depths() {
    let pos = fen("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1");
    for depth in 1..=4 {
        let (result, _) = run(&pos, SearchLimits::depth(depth));
        assert_eq!(result.uci_score(), Score::Mate(1), "depth {depth}");
        assert_eq!(move_to_uci(result.best_move.unwrap()), "e1e8");
    }
}

#[test]
fn test_mated_side_reports_negative_mate() {
    // Only Kb8 is legal, then Rh8#
    let pos = fen("k7/8/1K6/8/8/8/8/7R b - - 0 1");
    let (result, _) = run(&pos, SearchLimits::depth(3));
    assert!(result.score <= -MATE_THRESHOLD);
    assert_eq!(result.uci_score(), Score::Mate(-1));
}

#[test]
fn test_checkmated_position_has_no_move() {
    let pos = fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");
    let (result, reports) = run(&pos, SearchLimits::depth(3));
    assert_eq!(result.best_move, None);
    assert!(reports.is_empty());
}

#[test]
fn test_captures_hanging_queen() {
    let pos = fen("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1");
    let (result, _) = run(&pos, SearchLimits::depth(2));
    assert_eq!(move_to_uci(result.best_move.unwrap()), "d1d5");
}

#[test]
fn test_search_is_deterministic() {
    let pos = fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let (a, _) = run(&pos, SearchLimits::depth(3));
    let (b, _) = run(&pos, SearchLimits::depth(3));
    assert_eq!(a, b);
}

#[test]
fn test_stop_before_start_returns_fallback() {
    let pos = Position::startpos();
    let limits = SearchLimits::depth(10);
    limits.stop_handle().stop();
    let (result, reports) = run(&pos, limits);
    assert!(result.stopped);
    assert_eq!(result.depth, 0);
    assert!(reports.is_empty());
    assert!(legal_moves(&pos).contains(&result.best_move.unwrap()));
}

#[test]
fn test_stop_from_other_thread_returns_promptly() {
    let pos = Position::startpos();
    let limits = SearchLimits::infinite();
    let handle = limits.stop_handle();

    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        handle.stop();
    });

    let started = Instant::now();
    let (result, reports) = run(&pos, limits);
    stopper.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(result.stopped);
    assert!(result.best_move.is_some());
    // The returned result is the last completed iteration
    if let Some(last) = reports.last() {
        assert_eq!(result.depth, last.depth);
        assert_eq!(result.best_move, last.best_move);
    }
}

#[test]
fn test_move_time_limit_is_respected() {
    let pos = Position::startpos();
    let started = Instant::now();
    let (result, _) = run(&pos, SearchLimits::time(Duration::from_millis(50)));
    assert!(started.elapsed() < Duration::from_millis(1500));
    assert!(result.best_move.is_some());
}

#[test]
fn test_threefold_in_history_scores_draw() {
    // Down a queen, but Nf3 reaches a position already seen twice
    let pos = fen("4k3/8/8/8/8/8/q7/4K1N1 w - - 0 1");
    let knight_out = parse_uci_move(&pos, "g1f3").unwrap();
    let repeated = pos.play(knight_out).hash();
    let history = [repeated, pos.hash(), repeated];

    let mut nodes = 0;
    let result = iterative_deepening(&pos, &history, &SearchLimits::depth(1), &mut nodes, &mut |_| {});
    assert_eq!(result.best_move, Some(knight_out));
    assert_eq!(result.score, 0);
}

#[test]
fn test_progress_reports_every_completed_depth() {
    let pos = Position::startpos();
    let (result, reports) = run(&pos, SearchLimits::depth(4));
    let depths: Vec<u8> = reports.iter().map(|r| r.depth).collect();
    assert_eq!(depths, [1, 2, 3, 4]);
    assert_eq!(reports.last(), Some(&result));
}

#[test]
fn test_stop_handle_survives_clone_into_limits() {
    let limits = SearchLimits::depth(2);
    let handle: TimeControl = limits.stop_handle();
    handle.stop();
    assert!(limits.should_stop());
}
