//! UCI front end: command parsing, the protocol session and engine setup.

pub mod command;
pub mod config;
pub mod error;
pub mod session;

pub use command::{parse_command, Command, GoParams, PositionStart};
pub use config::EngineConfig;
pub use error::{ConfigError, ProtocolError};
pub use session::{info_line, Session, State};

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. Logs go to stderr since stdout
/// carries the protocol. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
