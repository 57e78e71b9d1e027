//! Parsing of protocol input lines into [`Command`]s.

use std::path::PathBuf;

use crate::error::ProtocolError;

/// Where a `position` command starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionStart {
    StartPos,
    Fen(String),
}

/// Arguments of `go`. Times are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u8>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u32>,
    pub infinite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Uci,
    IsReady,
    UciNewGame,
    Position {
        start: PositionStart,
        moves: Vec<String>,
    },
    Go(GoParams),
    Stop,
    Quit,
    SetOption {
        name: String,
        value: Option<String>,
    },
    BookAdd {
        mv: String,
        eval: Option<i32>,
    },
    BookShow,
    /// Most played book positions, at most this many
    BookPopular(usize),
    BookSave(Option<PathBuf>),
    Unknown(String),
}

/// Positions listed by `book popular` without a count.
pub const DEFAULT_POPULAR: usize = 5;

fn malformed(msg: impl Into<String>) -> ProtocolError {
    ProtocolError::MalformedCommand(msg.into())
}

fn number<T: std::str::FromStr>(key: &str, value: Option<&&str>) -> Result<T, ProtocolError> {
    let value = value.ok_or_else(|| malformed(format!("{key} needs a value")))?;
    value
        .parse()
        .map_err(|_| malformed(format!("{key} expects a number, got '{value}'")))
}

/// Parses one input line. Returns `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, ProtocolError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return Ok(None);
    };
    let args = &parts[1..];

    let cmd = match head {
        "uci" => Command::Uci,
        "isready" => Command::IsReady,
        "ucinewgame" => Command::UciNewGame,
        "stop" => Command::Stop,
        "quit" => Command::Quit,
        "position" => parse_position(args)?,
        "go" => Command::Go(parse_go(args)?),
        "setoption" => parse_setoption(args)?,
        "book" => parse_book(args)?,
        _ => Command::Unknown(line.trim().to_string()),
    };
    Ok(Some(cmd))
}

fn parse_position(args: &[&str]) -> Result<Command, ProtocolError> {
    let moves_at = args.iter().position(|&t| t == "moves");
    let (head, tail) = match moves_at {
        Some(idx) => (&args[..idx], &args[idx + 1..]),
        None => (args, &args[args.len()..]),
    };

    let start = match head.split_first() {
        Some((&"startpos", [])) => PositionStart::StartPos,
        Some((&"fen", fields)) if !fields.is_empty() => PositionStart::Fen(fields.join(" ")),
        Some((&"fen", _)) => return Err(malformed("position fen needs a FEN string")),
        _ => return Err(malformed("expected 'position startpos' or 'position fen <fen>'")),
    };
    let moves = tail.iter().map(|m| m.to_string()).collect();
    Ok(Command::Position { start, moves })
}

fn parse_go(args: &[&str]) -> Result<GoParams, ProtocolError> {
    let mut params = GoParams::default();
    let mut iter = args.iter();
    while let Some(&key) = iter.next() {
        match key {
            "depth" => params.depth = Some(number(key, iter.next())?),
            "movetime" => params.movetime = Some(number(key, iter.next())?),
            "wtime" => params.wtime = Some(number(key, iter.next())?),
            "btime" => params.btime = Some(number(key, iter.next())?),
            "winc" => params.winc = Some(number(key, iter.next())?),
            "binc" => params.binc = Some(number(key, iter.next())?),
            "movestogo" => params.movestogo = Some(number(key, iter.next())?),
            "infinite" => params.infinite = true,
            other => return Err(malformed(format!("unsupported go argument '{other}'"))),
        }
    }
    if params.depth == Some(0) {
        return Err(malformed("depth must be at least 1"));
    }
    Ok(params)
}

fn parse_setoption(args: &[&str]) -> Result<Command, ProtocolError> {
    if args.first() != Some(&"name") {
        return Err(malformed("expected 'setoption name <id> [value <x>]'"));
    }
    let rest = &args[1..];
    let value_at = rest.iter().position(|&t| t == "value");
    let (name, value) = match value_at {
        Some(idx) => (&rest[..idx], Some(rest[idx + 1..].join(" "))),
        None => (rest, None),
    };
    if name.is_empty() {
        return Err(malformed("setoption needs an option name"));
    }
    Ok(Command::SetOption {
        name: name.join(" "),
        value,
    })
}

fn parse_book(args: &[&str]) -> Result<Command, ProtocolError> {
    match args {
        ["add", mv] => Ok(Command::BookAdd {
            mv: mv.to_string(),
            eval: None,
        }),
        ["add", mv, "eval", cp] => Ok(Command::BookAdd {
            mv: mv.to_string(),
            eval: Some(number("eval", Some(cp))?),
        }),
        ["show"] => Ok(Command::BookShow),
        ["popular"] => Ok(Command::BookPopular(DEFAULT_POPULAR)),
        ["popular", n] => Ok(Command::BookPopular(number("popular", Some(n))?)),
        ["save"] => Ok(Command::BookSave(None)),
        ["save", path] => Ok(Command::BookSave(Some(PathBuf::from(path)))),
        _ => Err(malformed(
            "expected 'book add <move> [eval <cp>]', 'book show', 'book popular [n]' or 'book save [path]'",
        )),
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;
