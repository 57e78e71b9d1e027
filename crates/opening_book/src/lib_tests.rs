use super::*;
use chess_core::{parse_uci_move, Position};

fn mv(txt: &str) -> Move {
    parse_uci_move(&Position::startpos(), txt).unwrap()
}

fn start_fp() -> String {
    Position::startpos().fingerprint()
}

#[test]
fn test_lookup_missing_position() {
    let book = OpeningBook::new();
    assert!(book.lookup("8/8/8/8/8/8/8/8 w - -").is_none());
    assert!(book.best("8/8/8/8/8/8/8/8 w - -").is_none());
    assert!(book.is_empty());
}

#[test]
fn test_record_increments_without_duplicates() {
    let mut book = OpeningBook::new();
    let fp = start_fp();
    book.record(&fp, mv("e2e4"), None);
    book.record(&fp, mv("e2e4"), None);
    let entry = book.record(&fp, mv("e2e4"), None);

    assert_eq!(entry.count, 3);
    let entries = book.lookup(&fp).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].mv, "e2e4");
    assert_eq!(book.total_games(&fp), 3);
}

#[test]
fn test_eval_running_average() {
    let mut book = OpeningBook::new();
    let fp = start_fp();
    book.record(&fp, mv("d2d4"), Some(20));
    book.record(&fp, mv("d2d4"), None);
    let entry = book.record(&fp, mv("d2d4"), Some(40));

    assert_eq!(entry.count, 3);
    assert_eq!(entry.eval_count, 2);
    assert_eq!(entry.average_eval, Some(30.0));
    assert_eq!(entry.eval_cp(), Some(30));
}

#[test]
fn test_ranking_count_then_eval_then_insertion() {
    let mut book = OpeningBook::new();
    let fp = start_fp();
    // g1f3: 1 play, no eval; b1c3: 1 play, eval 5; d2d4: 1 play, eval 30
    book.record(&fp, mv("g1f3"), None);
    book.record(&fp, mv("b1c3"), Some(5));
    book.record(&fp, mv("d2d4"), Some(30));
    // e2e4 and c2c4 tie on count 2 without evals; e2e4 came first
    book.record(&fp, mv("e2e4"), None);
    book.record(&fp, mv("c2c4"), None);
    book.record(&fp, mv("c2c4"), None);
    book.record(&fp, mv("e2e4"), None);

    let order: Vec<String> = book.lookup(&fp).unwrap().into_iter().map(|e| e.mv).collect();
    assert_eq!(order, ["e2e4", "c2c4", "d2d4", "b1c3", "g1f3"]);
    assert_eq!(book.best(&fp).unwrap().mv, "e2e4");
}

#[test]
fn test_lookup_is_deterministic() {
    let mut book = OpeningBook::new();
    let fp = start_fp();
    for txt in ["a2a3", "h2h3", "a2a3", "h2h3"] {
        book.record(&fp, mv(txt), None);
    }
    let first = book.lookup(&fp);
    for _ in 0..5 {
        assert_eq!(book.lookup(&fp), first);
    }
    assert_eq!(book.best(&fp).unwrap().mv, "a2a3");
}

#[test]
fn test_popular_positions() {
    let mut book = OpeningBook::new();
    let start = Position::startpos();
    let after_e4 = start.apply(mv("e2e4")).unwrap();
    book.record(&start.fingerprint(), mv("e2e4"), None);
    let reply = parse_uci_move(&after_e4, "e7e5").unwrap();
    book.record(&after_e4.fingerprint(), reply, None);
    book.record(&after_e4.fingerprint(), reply, None);

    let popular = book.popular_positions(1);
    assert_eq!(popular, vec![(after_e4.fingerprint(), 2)]);
    assert_eq!(book.popular_positions(10).len(), 2);
    assert_eq!(book.len(), 2);
}

#[test]
fn test_json_shape() {
    let mut book = OpeningBook::new();
    book.record(&start_fp(), mv("e2e4"), Some(25));
    let value: serde_json::Value = serde_json::from_str(&book.to_json().unwrap()).unwrap();
    let entry = &value[start_fp()][0];
    assert_eq!(entry["move"], "e2e4");
    assert_eq!(entry["count"], 1);
    assert_eq!(entry["averageEval"], 25.0);
    assert_eq!(entry["evalCount"], 1);
}

#[test]
fn test_from_json_defaults_eval_count() {
    let json = r#"{"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -":
        [{"move": "e2e4", "count": 4, "averageEval": null}]}"#;
    let book = OpeningBook::from_json(json).unwrap();
    let best = book.best(&start_fp()).unwrap();
    assert_eq!(best.count, 4);
    assert_eq!(best.eval_count, 0);
    assert_eq!(best.average_eval, None);
}

#[test]
fn test_from_json_without_eval_count_keeps_average_weight() {
    let json = r#"{"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -":
        [{"move": "e2e4", "count": 10, "averageEval": 50.0}]}"#;
    let mut book = OpeningBook::from_json(json).unwrap();
    assert_eq!(book.best(&start_fp()).unwrap().eval_count, 10);

    let entry = book.record(&start_fp(), mv("e2e4"), Some(0));
    assert_eq!(entry.count, 11);
    assert_eq!(entry.eval_count, 11);
    let avg = entry.average_eval.unwrap();
    assert!((avg - 500.0 / 11.0).abs() < 1e-9, "average {avg}");
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(matches!(
        OpeningBook::from_json("[1, 2, 3]"),
        Err(BookError::Json(_))
    ));
}
