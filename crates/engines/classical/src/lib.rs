//! Classical Chess Engine
//!
//! Iterative deepening alpha-beta search over a material and piece-square
//! evaluation.

mod eval;
mod search;

use chess_core::{Engine, Position, SearchLimits, SearchResult};
use tracing::info;

/// Classical chess engine using negamax with alpha-beta pruning.
///
/// This engine uses:
/// - Iterative deepening with principal-variation move ordering
/// - MVV-LVA capture ordering and quiescence search
/// - Material plus piece-square evaluation
/// - 50-move rule, insufficient material and threefold repetition detection
/// - Time control and stop flag support
#[derive(Debug, Clone, Default)]
pub struct ClassicalEngine {
    /// Node counter for statistics
    nodes: u64,
}

impl ClassicalEngine {
    pub fn new() -> Self {
        Self { nodes: 0 }
    }

    /// Nodes visited by the most recent search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }
}

impl Engine for ClassicalEngine {
    fn search(
        &mut self,
        pos: &Position,
        history: &[u64],
        limits: SearchLimits,
        on_depth: &mut dyn FnMut(&SearchResult),
    ) -> SearchResult {
        self.nodes = 0;
        let result = search::iterative_deepening(pos, history, &limits, &mut self.nodes, on_depth);
        info!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            stopped = result.stopped,
            "search finished"
        );
        result
    }

    fn name(&self) -> &str {
        "BrainFish Classical"
    }

    fn new_game(&mut self) {
        self.nodes = 0;
    }
}

// Re-export for direct use if needed
pub use eval::evaluate;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod lib_tests;
