//! Opening book: known moves per position, ranked by how often they were
//! played and how well they scored.
//!
//! Positions are keyed by [`Position::fingerprint`](chess_core::Position::fingerprint),
//! so transpositions reached with different move counters share entries.
//! The store never checks legality; callers validate moves against the
//! position before recording or playing them.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use chess_core::{move_to_uci, Move};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("book i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("book format: {0}")]
    Json(#[from] serde_json::Error),
}

/// One candidate move for a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookEntry {
    /// Coordinate notation, e.g. `e2e4`
    #[serde(rename = "move")]
    pub mv: String,
    /// Times this move was recorded for the position
    pub count: u32,
    /// Running mean of the reported evaluations, in centipawns
    #[serde(rename = "averageEval")]
    pub average_eval: Option<f64>,
    /// Number of evaluations folded into `average_eval`
    #[serde(rename = "evalCount", default)]
    pub eval_count: u32,
}

impl BookEntry {
    fn new(mv: String) -> Self {
        Self {
            mv,
            count: 0,
            average_eval: None,
            eval_count: 0,
        }
    }

    fn fold_eval(&mut self, eval: i32) {
        let n = self.eval_count as f64;
        let prev = self.average_eval.unwrap_or(0.0);
        self.average_eval = Some((prev * n + eval as f64) / (n + 1.0));
        self.eval_count += 1;
    }

    /// Average evaluation rounded to whole centipawns.
    pub fn eval_cp(&self) -> Option<i32> {
        self.average_eval.map(|e| e.round() as i32)
    }
}

/// Count descending, then evaluation descending with unevaluated entries last.
fn rank(a: &BookEntry, b: &BookEntry) -> Ordering {
    b.count.cmp(&a.count).then_with(|| match (a.average_eval, b.average_eval) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

/// In-memory book. Entries per position are kept in insertion order; ranking
/// happens on read, and the stable sort makes first-inserted win ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpeningBook {
    positions: BTreeMap<String, Vec<BookEntry>>,
}

impl OpeningBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranked candidates for a position, `None` if it was never recorded.
    pub fn lookup(&self, fingerprint: &str) -> Option<Vec<BookEntry>> {
        let entries = self.positions.get(fingerprint)?;
        let mut ranked = entries.clone();
        ranked.sort_by(rank);
        Some(ranked)
    }

    /// Top-ranked candidate.
    pub fn best(&self, fingerprint: &str) -> Option<&BookEntry> {
        let entries = self.positions.get(fingerprint)?;
        entries.iter().reduce(|best, e| {
            if rank(e, best) == Ordering::Less {
                e
            } else {
                best
            }
        })
    }

    /// Records one more play of `mv` from the position, folding `eval` into
    /// the running average when given. Returns the updated entry.
    pub fn record(&mut self, fingerprint: &str, mv: Move, eval: Option<i32>) -> BookEntry {
        let text = move_to_uci(mv);
        let entries = self.positions.entry(fingerprint.to_string()).or_default();
        let idx = match entries.iter().position(|e| e.mv == text) {
            Some(idx) => idx,
            None => {
                entries.push(BookEntry::new(text));
                entries.len() - 1
            }
        };
        let entry = &mut entries[idx];
        entry.count += 1;
        if let Some(eval) = eval {
            entry.fold_eval(eval);
        }
        debug!(fingerprint, mv = %entry.mv, count = entry.count, "book record");
        entry.clone()
    }

    /// Sum of move counts recorded for a position.
    pub fn total_games(&self, fingerprint: &str) -> u32 {
        self.positions
            .get(fingerprint)
            .map(|entries| entries.iter().map(|e| e.count).sum())
            .unwrap_or(0)
    }

    /// Positions with the most recorded plays, most played first.
    pub fn popular_positions(&self, limit: usize) -> Vec<(String, u32)> {
        let mut all: Vec<(String, u32)> = self
            .positions
            .keys()
            .map(|fp| (fp.clone(), self.total_games(fp)))
            .collect();
        all.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        all.truncate(limit);
        all
    }

    /// Number of distinct positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Parses a book. Records without `evalCount` but with an average count
    /// every play as evaluated, so later evals are weighted against them.
    pub fn from_json(json: &str) -> Result<Self, BookError> {
        let mut book: OpeningBook = serde_json::from_str(json)?;
        for entry in book.positions.values_mut().flatten() {
            if entry.average_eval.is_some() && entry.eval_count == 0 {
                entry.eval_count = entry.count.max(1);
            }
        }
        Ok(book)
    }

    pub fn to_json(&self) -> Result<String, BookError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a book from disk. A missing file is an empty book.
    pub fn load(path: &Path) -> Result<Self, BookError> {
        if !path.exists() {
            info!(path = %path.display(), "no book file, starting empty");
            return Ok(Self::new());
        }
        let contents = std::fs::read_to_string(path)?;
        let book = Self::from_json(&contents)?;
        info!(path = %path.display(), positions = book.len(), "book loaded");
        Ok(book)
    }

    pub fn save(&self, path: &Path) -> Result<(), BookError> {
        std::fs::write(path, self.to_json()?)?;
        info!(path = %path.display(), positions = self.len(), "book saved");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod lib_tests;
