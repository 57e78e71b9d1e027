pub mod board;
pub mod error;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod time_control;
pub mod types;
pub mod uci;
pub mod zobrist;

// Re-export core game logic (not engine-specific)
pub use board::*;
pub use error::*;
pub use fen::START_FEN;
pub use movegen::*;
pub use perft::perft;
pub use time_control::*;
pub use types::*;
pub use uci::*;
pub use zobrist::ZOBRIST;

use std::fmt;

// =============================================================================
// Search scores, results and the Engine trait
// =============================================================================

/// Score of being mated right now; mate found `n` plies away is `MATE - n`.
pub const MATE: i32 = 100_000;

/// Any score with a larger magnitude encodes a forced mate.
pub const MATE_THRESHOLD: i32 = MATE - 1_000;

/// Evaluation as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    /// Moves (not plies) until mate; negative when the side to move is mated.
    Mate(i32),
}

impl Score {
    pub fn from_internal(score: i32) -> Score {
        if score.abs() < MATE_THRESHOLD {
            return Score::Centipawns(score);
        }
        let plies = MATE - score.abs();
        let moves = (plies + 1) / 2;
        Score::Mate(if score > 0 { moves } else { -moves })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "cp {cp}"),
            Score::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Result of a search operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// The best move found (None if no legal moves)
    pub best_move: Option<Move>,
    /// Evaluation from the side to move's perspective (see [`Score`])
    pub score: i32,
    /// Deepest fully completed iteration
    pub depth: u8,
    /// Principal variation, starting with `best_move`
    pub pv: Vec<Move>,
    /// Number of nodes searched (optional, for stats)
    pub nodes: u64,
    /// Whether search was stopped early due to time limit or a stop request
    pub stopped: bool,
}

impl SearchResult {
    pub fn uci_score(&self) -> Score {
        Score::from_internal(self.score)
    }
}

/// Trait that all chess engines must implement.
///
/// Engines are moved onto a worker thread for the duration of a search, hence
/// the `Send` bound.
pub trait Engine: Send {
    /// Search the position with the given search limits.
    ///
    /// # Arguments
    /// * `pos` - The current position to analyze
    /// * `history` - Hashes of the positions played before `pos`, oldest first
    /// * `limits` - Search limits (depth, time, stop flag)
    /// * `on_depth` - Called with the result of every completed iteration
    ///
    /// # Returns
    /// SearchResult for the deepest completed iteration
    fn search(
        &mut self,
        pos: &Position,
        history: &[u64],
        limits: SearchLimits,
        on_depth: &mut dyn FnMut(&SearchResult),
    ) -> SearchResult;

    /// Returns the engine's name for UCI identification
    fn name(&self) -> &str;

    /// Returns the engine's author for UCI identification
    fn author(&self) -> &str {
        "BrainFish"
    }

    /// Reset internal state for a new game (clear hash tables, history, etc.)
    fn new_game(&mut self) {}
}
