use std::io::{self, BufRead, Write};
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Context};
use classical_engine::ClassicalEngine;
use tracing::info;
use uci_engine::config::CONFIG_ENV;
use uci_engine::{init_logging, EngineConfig, Session};

fn main() -> anyhow::Result<()> {
    let env_path = std::env::var(CONFIG_ENV).ok();
    let config = EngineConfig::from_args(std::env::args().skip(1), env_path)?;
    init_logging(&config.log_level);
    info!(name = %config.name, "starting");

    // Every protocol line, from this thread or a search worker, goes through
    // the channel so lines are written whole and in order.
    let (tx, rx) = mpsc::channel::<String>();
    let printer = thread::spawn(move || -> io::Result<()> {
        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        for line in rx {
            writeln!(stdout, "{line}")?;
            stdout.flush()?;
        }
        Ok(())
    });

    let mut session = Session::new(config, Box::new(ClassicalEngine::new()), tx);
    session.initialize().context("failed to initialize engine")?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if !session.handle_line(&line)? {
            break;
        }
    }
    session.shutdown()?;
    drop(session);

    printer
        .join()
        .map_err(|_| anyhow!("output thread panicked"))?
        .context("failed to write stdout")?;
    info!("shutting down");
    Ok(())
}
