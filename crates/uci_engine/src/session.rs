//! Protocol session: the state machine behind the UCI loop.
//!
//! A [`Session`] owns the current position, the game history, the opening
//! book and the engine. `go` moves the engine onto a worker thread; the
//! worker hands it back through its `JoinHandle` once `stop`, `quit` or the
//! next command reaps the finished search. All output, including the
//! worker's `info` and `bestmove` lines, goes through one channel so lines
//! never interleave.

use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chess_core::{
    allocate_move_time, line_to_uci, move_to_uci, parse_uci_move, Color, Engine, Position,
    SearchLimits, SearchResult, TimeControl, NULL_MOVE_TEXT,
};
use opening_book::OpeningBook;
use tracing::{debug, info, warn};

use crate::command::{parse_command, Command, GoParams, PositionStart};
use crate::config::EngineConfig;
use crate::error::ProtocolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Uninitialized,
    Ready,
    Searching,
    Terminated,
}

/// A search running on its worker thread.
struct SearchTask {
    stop: TimeControl,
    handle: JoinHandle<Box<dyn Engine>>,
}

pub struct Session {
    config: EngineConfig,
    state: State,
    position: Position,
    /// Hashes of the positions played before `position`, oldest first
    history: Vec<u64>,
    book: OpeningBook,
    /// `None` only while a search owns the engine
    engine: Option<Box<dyn Engine>>,
    search: Option<SearchTask>,
    out: Sender<String>,
    depth: u8,
    own_book: bool,
}

/// Formats a completed iteration as an `info` line.
pub fn info_line(result: &SearchResult) -> String {
    let mut line = format!("info depth {} score {}", result.depth, result.uci_score());
    if !result.pv.is_empty() {
        line.push_str(" pv ");
        line.push_str(&line_to_uci(&result.pv));
    }
    line
}

impl Session {
    pub fn new(config: EngineConfig, engine: Box<dyn Engine>, out: Sender<String>) -> Self {
        Self {
            depth: config.default_depth,
            own_book: config.own_book,
            config,
            state: State::Uninitialized,
            position: Position::startpos(),
            history: Vec::new(),
            book: OpeningBook::new(),
            engine: Some(engine),
            search: None,
            out,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    fn send(&self, line: impl Into<String>) {
        // The receiver only goes away during shutdown
        self.out.send(line.into()).ok();
    }

    /// Loads the configured book and moves Uninitialized -> Ready.
    /// Calling it again is a no-op.
    pub fn initialize(&mut self) -> Result<(), ProtocolError> {
        if self.state != State::Uninitialized {
            return Ok(());
        }
        if let Some(path) = &self.config.book_path {
            self.book = OpeningBook::load(path)?;
        }
        self.state = State::Ready;
        info!(name = %self.config.name, book_positions = self.book.len(), "engine initialized");
        Ok(())
    }

    /// Handles one input line. Recoverable errors are reported as
    /// `error <message>`; only fatal ones are returned. Returns `false` once
    /// the session has terminated.
    pub fn handle_line(&mut self, line: &str) -> Result<bool, ProtocolError> {
        self.reap_finished_search()?;

        let result = parse_command(line).and_then(|cmd| match cmd {
            Some(cmd) => {
                debug!(?cmd, "command");
                self.execute(cmd)
            }
            None => Ok(()),
        });
        match result {
            Ok(()) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(%err, line = line.trim(), "command rejected");
                self.send(format!("error {err}"));
            }
        }
        Ok(self.state != State::Terminated)
    }

    pub fn execute(&mut self, cmd: Command) -> Result<(), ProtocolError> {
        match cmd {
            Command::Uci => self.uci(),
            Command::IsReady => {
                self.send("readyok");
                Ok(())
            }
            Command::UciNewGame => self.new_game(),
            Command::Position { start, moves } => self.set_position(start, &moves),
            Command::Go(params) => self.go(&params),
            Command::Stop => self.stop(),
            Command::Quit => self.quit(),
            Command::SetOption { name, value } => self.set_option(&name, value.as_deref()),
            Command::BookAdd { mv, eval } => self.book_add(&mv, eval),
            Command::BookShow => self.book_show(),
            Command::BookPopular(limit) => self.book_popular(limit),
            Command::BookSave(path) => self.book_save(path),
            Command::Unknown(_) => {
                self.send("unknown command");
                Ok(())
            }
        }
    }

    fn require_ready(&self) -> Result<(), ProtocolError> {
        match self.state {
            State::Uninitialized => Err(ProtocolError::UninitializedEngine),
            State::Searching => Err(ProtocolError::SearchInProgress),
            State::Ready | State::Terminated => Ok(()),
        }
    }

    fn require_idle(&self) -> Result<(), ProtocolError> {
        if self.state == State::Searching {
            return Err(ProtocolError::SearchInProgress);
        }
        Ok(())
    }

    fn uci(&mut self) -> Result<(), ProtocolError> {
        self.initialize()?;
        self.send(format!("id name {}", self.config.name));
        self.send(format!("id author {}", self.config.author));
        self.send(format!(
            "option name Depth type spin default {} min 1 max {}",
            self.config.default_depth, self.config.max_depth
        ));
        self.send(format!("option name OwnBook type check default {}", self.config.own_book));
        self.send("uciok");
        Ok(())
    }

    fn new_game(&mut self) -> Result<(), ProtocolError> {
        self.require_idle()?;
        self.position = Position::startpos();
        self.history.clear();
        if let Some(engine) = self.engine.as_mut() {
            engine.new_game();
        }
        Ok(())
    }

    /// Builds the new position completely before replacing the held one, so
    /// a bad FEN or move leaves the session untouched.
    fn set_position(&mut self, start: PositionStart, moves: &[String]) -> Result<(), ProtocolError> {
        self.require_ready()?;
        let mut pos = match start {
            PositionStart::StartPos => Position::startpos(),
            PositionStart::Fen(fen) => Position::from_fen(&fen)?,
        };
        let mut history = Vec::with_capacity(moves.len());
        for txt in moves {
            let mv = parse_uci_move(&pos, txt)?;
            history.push(pos.hash());
            pos = pos.play(mv);
        }
        self.position = pos;
        self.history = history;
        Ok(())
    }

    fn limits_for(&self, params: &GoParams) -> SearchLimits {
        let depth = params.depth.map(|d| d.min(self.config.max_depth));
        if params.infinite {
            return SearchLimits::infinite();
        }

        let (clock, inc) = match self.position.side_to_move {
            Color::White => (params.wtime, params.winc),
            Color::Black => (params.btime, params.binc),
        };
        let move_time = params.movetime.map(Duration::from_millis).or_else(|| {
            clock.map(|remaining| {
                allocate_move_time(
                    Duration::from_millis(remaining),
                    Duration::from_millis(inc.unwrap_or(0)),
                    params.movestogo,
                )
            })
        });

        match (depth, move_time) {
            (Some(d), Some(t)) => SearchLimits::depth_and_time(d, t),
            (None, Some(t)) => SearchLimits::time(t),
            (Some(d), None) => SearchLimits::depth(d),
            (None, None) => SearchLimits::depth(self.depth),
        }
    }

    /// Highest-ranked book move that is legal in the current position.
    fn book_move(&self) -> Option<(String, Option<i32>)> {
        let fingerprint = self.position.fingerprint();
        for entry in self.book.lookup(&fingerprint)? {
            match parse_uci_move(&self.position, &entry.mv) {
                Ok(mv) => return Some((move_to_uci(mv), entry.eval_cp())),
                Err(err) => warn!(%err, fingerprint = %fingerprint, "skipping unusable book move"),
            }
        }
        None
    }

    fn go(&mut self, params: &GoParams) -> Result<(), ProtocolError> {
        self.require_ready()?;

        if self.own_book && !params.infinite {
            if let Some((mv, eval)) = self.book_move() {
                info!(mv = %mv, "book move");
                if let Some(cp) = eval {
                    self.send(format!("info depth 0 score cp {cp} pv {mv}"));
                }
                self.send(format!("bestmove {mv}"));
                return Ok(());
            }
        }

        let Some(mut engine) = self.engine.take() else {
            return Err(ProtocolError::SearchInProgress);
        };
        let limits = self.limits_for(params);
        let stop = limits.stop_handle();
        let pos = self.position.clone();
        let history = self.history.clone();
        let out = self.out.clone();
        debug!(depth = limits.depth, move_time = ?limits.move_time, "starting search");

        let handle = thread::spawn(move || {
            let result = engine.search(&pos, &history, limits, &mut |r| {
                out.send(info_line(r)).ok();
            });
            let best = result
                .best_move
                .map(move_to_uci)
                .unwrap_or_else(|| NULL_MOVE_TEXT.to_string());
            out.send(format!("bestmove {best}")).ok();
            engine
        });

        self.search = Some(SearchTask { stop, handle });
        self.state = State::Searching;
        Ok(())
    }

    /// Joins the worker and takes the engine back. The worker has sent its
    /// `bestmove` by the time this returns.
    fn finish_search(&mut self) -> Result<(), ProtocolError> {
        let Some(task) = self.search.take() else {
            return Ok(());
        };
        let engine = task.handle.join().map_err(|_| ProtocolError::SearchPanicked)?;
        self.engine = Some(engine);
        if self.state == State::Searching {
            self.state = State::Ready;
        }
        Ok(())
    }

    fn reap_finished_search(&mut self) -> Result<(), ProtocolError> {
        let finished = self
            .search
            .as_ref()
            .is_some_and(|task| task.handle.is_finished());
        if finished {
            self.finish_search()?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), ProtocolError> {
        if let Some(task) = &self.search {
            task.stop.stop();
        }
        self.finish_search()
    }

    fn quit(&mut self) -> Result<(), ProtocolError> {
        self.stop()?;
        self.state = State::Terminated;
        info!("session terminated");
        Ok(())
    }

    /// Stops any running search. Used when input ends without `quit`.
    pub fn shutdown(&mut self) -> Result<(), ProtocolError> {
        if self.state != State::Terminated {
            self.quit()?;
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: Option<&str>) -> Result<(), ProtocolError> {
        self.require_idle()?;
        let value = value
            .ok_or_else(|| ProtocolError::MalformedCommand(format!("option {name} needs a value")))?;
        match name.to_ascii_lowercase().as_str() {
            "depth" => {
                let depth: u8 = value
                    .parse()
                    .ok()
                    .filter(|d| (1..=self.config.max_depth).contains(d))
                    .ok_or_else(|| {
                        ProtocolError::MalformedCommand(format!(
                            "Depth must be between 1 and {}",
                            self.config.max_depth
                        ))
                    })?;
                self.depth = depth;
            }
            "ownbook" => {
                self.own_book = match value {
                    "true" => true,
                    "false" => false,
                    other => {
                        return Err(ProtocolError::MalformedCommand(format!(
                            "OwnBook expects true or false, got '{other}'"
                        )))
                    }
                };
            }
            _ => return Err(ProtocolError::MalformedCommand(format!("unknown option '{name}'"))),
        }
        debug!(name, value, "option set");
        Ok(())
    }

    fn book_add(&mut self, txt: &str, eval: Option<i32>) -> Result<(), ProtocolError> {
        self.require_ready()?;
        let mv = parse_uci_move(&self.position, txt)?;
        let entry = self.book.record(&self.position.fingerprint(), mv, eval);
        self.send(format!("info string book {} count {}", entry.mv, entry.count));
        Ok(())
    }

    fn book_show(&self) -> Result<(), ProtocolError> {
        if self.state == State::Uninitialized {
            return Err(ProtocolError::UninitializedEngine);
        }
        let entries = self.book.lookup(&self.position.fingerprint()).unwrap_or_default();
        if entries.is_empty() {
            self.send("info string book empty");
        }
        for entry in entries {
            let eval = entry
                .eval_cp()
                .map(|cp| cp.to_string())
                .unwrap_or_else(|| "none".to_string());
            self.send(format!("info string book {} count {} eval {eval}", entry.mv, entry.count));
        }
        Ok(())
    }

    fn book_popular(&self, limit: usize) -> Result<(), ProtocolError> {
        if self.state == State::Uninitialized {
            return Err(ProtocolError::UninitializedEngine);
        }
        let popular = self.book.popular_positions(limit);
        if popular.is_empty() {
            self.send("info string book empty");
        }
        for (fingerprint, games) in popular {
            self.send(format!("info string popular games {games} fen {fingerprint}"));
        }
        Ok(())
    }

    fn book_save(&self, path: Option<PathBuf>) -> Result<(), ProtocolError> {
        if self.state == State::Uninitialized {
            return Err(ProtocolError::UninitializedEngine);
        }
        let path = path
            .or_else(|| self.config.book_path.clone())
            .ok_or_else(|| ProtocolError::MalformedCommand("no book path configured".to_string()))?;
        self.book.save(&path)?;
        self.send(format!("info string book saved to {}", path.display()));
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
