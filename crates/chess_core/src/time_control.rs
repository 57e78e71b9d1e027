//! Time control and search limits for chess engines.
//!
//! This module provides shared time management functionality that can be used
//! by any engine implementation to respect time constraints during search,
//! plus the stop flag the protocol layer uses to cancel a running search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deepest iteration any search will attempt.
pub const MAX_DEPTH: u8 = 64;

/// Search limits that control when an engine should stop searching.
///
/// Engines should respect both depth and time limits, stopping when either
/// is reached. The time limit takes precedence - if time runs out, the engine
/// must return immediately with the best move found so far.
#[derive(Debug, Clone)]
pub struct SearchLimits {
    /// Maximum search depth in plies (half-moves)
    pub depth: u8,
    /// Maximum time allowed for this move (None = infinite)
    pub move_time: Option<Duration>,
    /// Time controller for checking if search should stop
    pub time_control: TimeControl,
}

impl SearchLimits {
    /// Create limits with only depth constraint (no time limit).
    pub fn depth(depth: u8) -> Self {
        Self {
            depth: depth.clamp(1, MAX_DEPTH),
            move_time: None,
            time_control: TimeControl::new(None),
        }
    }

    /// Create limits with both depth and time constraints.
    pub fn depth_and_time(depth: u8, move_time: Duration) -> Self {
        Self {
            depth: depth.clamp(1, MAX_DEPTH),
            move_time: Some(move_time),
            time_control: TimeControl::new(Some(move_time)),
        }
    }

    /// Create limits with only time constraint (maximum depth).
    pub fn time(move_time: Duration) -> Self {
        Self::depth_and_time(MAX_DEPTH, move_time)
    }

    /// Search until stopped externally.
    pub fn infinite() -> Self {
        Self::depth(MAX_DEPTH)
    }

    /// Check if search should stop due to time limit.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.time_control.is_stopped()
    }

    /// Handle that can cancel this search from another thread.
    pub fn stop_handle(&self) -> TimeControl {
        self.time_control.clone()
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(4)
    }
}

/// Thread-safe time controller that tracks whether search should stop.
///
/// Clones share the stop flag, so a clone kept by the protocol thread can
/// cancel the search running on a worker. The `is_stopped()` check is an
/// atomic load and can be called at every node.
#[derive(Debug, Clone)]
pub struct TimeControl {
    /// Shared stop flag
    stopped: Arc<AtomicBool>,
    /// Start time of the search, recorded by the searching thread
    start_time: Option<Instant>,
    /// Time limit for this search (None = infinite)
    time_limit: Option<Duration>,
    /// How often to check the clock (in nodes). Checking every node is wasteful.
    check_interval: u64,
}

impl TimeControl {
    /// Create a new time controller.
    ///
    /// # Arguments
    /// * `time_limit` - Maximum time allowed for search (None = infinite)
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            stopped: Arc::new(AtomicBool::new(false)),
            start_time: None,
            time_limit,
            check_interval: 1024, // Check clock every 1024 nodes
        }
    }

    /// Start the clock. Should be called when search begins.
    ///
    /// The stop flag is left alone: a stop that arrived before the worker got
    /// going still counts.
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Force stop the search immediately.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Check if search should stop.
    ///
    /// This is a fast atomic load, suitable for calling frequently.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    /// Check time and update stopped flag if time expired.
    ///
    /// This does the actual clock check. Call this periodically (e.g., every N nodes)
    /// rather than on every node to avoid performance overhead.
    pub fn check_time(&self) -> bool {
        if self.is_stopped() {
            return true;
        }

        if let (Some(limit), Some(start)) = (self.time_limit, self.start_time) {
            if start.elapsed() >= limit {
                self.stop();
                return true;
            }
        }

        false
    }

    /// Check if it's time to check the clock based on node count.
    ///
    /// Returns true every `check_interval` nodes.
    #[inline]
    pub fn should_check_time(&self, nodes: u64) -> bool {
        nodes % self.check_interval == 0
    }

    /// Get elapsed time since search started.
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|s| s.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Get remaining time (None if no limit).
    pub fn remaining(&self) -> Option<Duration> {
        let limit = self.time_limit?;
        Some(limit.saturating_sub(self.elapsed()))
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Budget for one move out of the remaining clock.
///
/// Spreads the remaining time over `moves_to_go` moves (30 when unknown),
/// adds most of the increment, and never plans to use more than half the clock.
pub fn allocate_move_time(
    remaining: Duration,
    increment: Duration,
    moves_to_go: Option<u32>,
) -> Duration {
    let moves = moves_to_go.filter(|&m| m > 0).unwrap_or(30);
    let share = remaining / moves + increment * 3 / 4;
    share.min(remaining / 2).max(Duration::from_millis(1))
}

#[cfg(test)]
#[path = "time_control_tests.rs"]
mod time_control_tests;
