//! Engine configuration loaded from a TOML file.
//!
//! ```toml
//! name = "BrainFish"
//! author = "BlackBoxAI"
//! default_depth = 5
//! max_depth = 32
//! book_path = "book.json"
//! own_book = true
//! log_level = "info"
//! ```

use std::path::{Path, PathBuf};

use chess_core::MAX_DEPTH;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "BRAINFISH_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub name: String,
    pub author: String,
    /// Depth used by `go` without `depth`, `movetime` or clock arguments
    pub default_depth: u8,
    /// Upper bound for `go depth` and `setoption name Depth`
    pub max_depth: u8,
    /// Book loaded at initialization and written by `book save`
    pub book_path: Option<PathBuf>,
    /// Answer `go` from the book when it knows the position
    pub own_book: bool,
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "BrainFish".to_string(),
            author: "BlackBoxAI".to_string(),
            default_depth: 5,
            max_depth: 32,
            book_path: None,
            own_book: true,
            log_level: "warn".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let mut config: EngineConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: path.display().to_string(),
            source,
        })?;
        config.max_depth = config.max_depth.clamp(1, MAX_DEPTH);
        config.default_depth = config.default_depth.clamp(1, config.max_depth);
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Loads the file named by `--config <path>` or `BRAINFISH_CONFIG`,
    /// falling back to defaults when neither is given.
    pub fn from_args<I>(args: I, env_path: Option<String>) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut path = None;
        while let Some(arg) = args.next() {
            if arg == "--config" {
                path = Some(args.next().ok_or(ConfigError::MissingPath)?);
            }
        }
        match path.or(env_path) {
            Some(p) => Self::load(Path::new(&p)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
