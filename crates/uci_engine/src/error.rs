//! Errors surfaced on the protocol channel as `error <message>` lines.

use chess_core::ChessError;
use opening_book::BookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Carries the full parser message, which already names the FEN field.
    #[error("{0}")]
    InvalidFen(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("engine not initialized, send uci first")]
    UninitializedEngine,

    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("search in progress, send stop first")]
    SearchInProgress,

    #[error(transparent)]
    Book(#[from] BookError),

    /// The search thread panicked; the engine instance is gone.
    #[error("search thread panicked")]
    SearchPanicked,
}

impl ProtocolError {
    /// Errors the session cannot recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProtocolError::SearchPanicked)
    }
}

impl From<ChessError> for ProtocolError {
    fn from(err: ChessError) -> Self {
        match err {
            ChessError::InvalidFen { .. } => ProtocolError::InvalidFen(err.to_string()),
            ChessError::IllegalMove(mv) => ProtocolError::IllegalMove(mv),
            ChessError::MalformedMove(mv) => {
                ProtocolError::MalformedCommand(format!("bad move text '{mv}'"))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },

    #[error("--config needs a path")]
    MissingPath,
}
