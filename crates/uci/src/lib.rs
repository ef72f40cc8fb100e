//! UCI (Universal Chess Interface) protocol codec for the GUI side of the
//! conversation.
//!
//! This crate formats the commands a controller sends to an analysis engine
//! and parses the lines the engine answers with. It performs no I/O; the
//! process plumbing lives with the caller.
//!
//! # Outgoing commands
//!
//! - `uci` - Initialize engine, get id and options
//! - `isready` / `readyok` - Synchronization
//! - `ucinewgame` - Reset engine state between unrelated positions
//! - `setoption name <name> value <value>` - Configure the engine
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `stop` - Stop search
//! - `quit` - Exit engine
//!
//! # Incoming messages
//!
//! - `id name <name>` / `id author <author>`
//! - `uciok`, `readyok`
//! - `info ...` - Search progress, see [`EngineInfo`]
//! - `bestmove <move> [ponder <move>]`

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score, ScoreBound};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// `id name ...`
    IdName(String),
    /// `id author ...`
    IdAuthor(String),
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Search finished. `mv` is `None` when the engine had no move to play
    /// (`bestmove (none)` or the null move `0000`).
    BestMove { mv: Option<String>, ponder: Option<String> },
    /// Anything the controller does not act on (`option ...`, banners).
    Unknown(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next() {
            None => Err(UciError::ParseError("empty line".to_string())),
            Some("uciok") => Ok(EngineMessage::UciOk),
            Some("readyok") => Ok(EngineMessage::ReadyOk),
            Some("id") => match parts.next() {
                Some("name") => Ok(EngineMessage::IdName(rest_after(line, "name"))),
                Some("author") => Ok(EngineMessage::IdAuthor(rest_after(line, "author"))),
                _ => Ok(EngineMessage::Unknown(line.to_string())),
            },
            Some("info") => Ok(EngineInfo::parse(line)
                .map(EngineMessage::Info)
                .unwrap_or_else(|| EngineMessage::Unknown(line.to_string()))),
            Some("bestmove") => {
                let mv = parts.next().ok_or_else(|| {
                    UciError::ParseError(format!("bestmove without a move: '{}'", line))
                })?;
                let ponder = match (parts.next(), parts.next()) {
                    (Some("ponder"), Some(p)) => non_null_move(p),
                    _ => None,
                };
                Ok(EngineMessage::BestMove {
                    mv: non_null_move(mv),
                    ponder,
                })
            }
            Some(_) => Ok(EngineMessage::Unknown(line.to_string())),
        }
    }
}

/// Everything after the first occurrence of `keyword` followed by a space.
fn rest_after(line: &str, keyword: &str) -> String {
    line.split_once(&format!("{} ", keyword))
        .map(|(_, rest)| rest.trim().to_string())
        .unwrap_or_default()
}

fn non_null_move(mv: &str) -> Option<String> {
    match mv {
        "(none)" | "0000" => None,
        other => Some(other.to_string()),
    }
}
