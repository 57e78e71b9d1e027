use std::path::PathBuf;

use chess_core::{parse_uci_move, Position};
use opening_book::OpeningBook;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("brainfish-{}-{}.json", name, std::process::id()))
}

#[test]
fn test_save_then_load_round_trip() {
    let path = temp_path("round-trip");
    let start = Position::startpos();
    let mut book = OpeningBook::new();
    for (txt, eval) in [("e2e4", Some(30)), ("e2e4", Some(-10)), ("d2d4", None)] {
        let mv = parse_uci_move(&start, txt).unwrap();
        book.record(&start.fingerprint(), mv, eval);
    }

    book.save(&path).unwrap();
    let loaded = OpeningBook::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, book);
    assert_eq!(loaded.to_json().unwrap(), book.to_json().unwrap());
}

#[test]
fn test_load_missing_file_is_empty() {
    let path = temp_path("does-not-exist");
    std::fs::remove_file(&path).ok();
    let book = OpeningBook::load(&path).unwrap();
    assert!(book.is_empty());
}

#[test]
fn test_load_corrupt_file_fails() {
    let path = temp_path("corrupt");
    std::fs::write(&path, "{ not json").unwrap();
    let result = OpeningBook::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[test]
fn test_running_averages_survive_json_exactly() {
    let start = Position::startpos();
    let fp = start.fingerprint();
    let e2e4 = parse_uci_move(&start, "e2e4").unwrap();
    let mut book = OpeningBook::new();

    // Means like 80/11 = 7.2727... have no short decimal form
    for i in 0..2000 {
        let eval = (i * 37 % 101) - 50;
        book.record(&fp, e2e4, Some(eval));
        let reloaded = OpeningBook::from_json(&book.to_json().unwrap()).unwrap();
        assert_eq!(
            reloaded.best(&fp).unwrap().average_eval,
            book.best(&fp).unwrap().average_eval,
            "after {} evals",
            i + 1
        );
    }
}
