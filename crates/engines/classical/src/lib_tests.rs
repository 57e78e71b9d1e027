use super::*;

#[test]
fn test_engine_reports_nodes_of_last_search() {
    let mut engine = ClassicalEngine::new();
    assert_eq!(engine.nodes(), 0);

    let mut completed = 0;
    let result = engine.search(&Position::startpos(), &[], SearchLimits::depth(2), &mut |_| {
        completed += 1
    });
    assert_eq!(completed, 2);
    assert!(result.best_move.is_some());
    assert!(engine.nodes() > 0);
    assert_eq!(engine.nodes(), result.nodes);

    engine.new_game();
    assert_eq!(engine.nodes(), 0);
}

#[test]
fn test_engine_identity() {
    let engine = ClassicalEngine::new();
    assert_eq!(engine.name(), "BrainFish Classical");
    assert_eq!(engine.author(), "BrainFish");
}
