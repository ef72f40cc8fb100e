//! Engine session: lifecycle and request/response exchange with a UCI
//! analysis engine such as Stockfish.

mod discovery;
mod process;

pub use discovery::{
    discover_engine, ENGINE_BARE_NAME, ENGINE_CANDIDATES, ENGINE_LOCAL_FALLBACK, INSTALL_HINT,
};

use std::path::PathBuf;
use std::time::{Duration, Instant};

use shakmaty::Color;
use thiserror::Error;
use tracing::{debug, info, warn};
use uci::{EngineInfo, EngineMessage, GuiCommand};

use crate::board::Position;
use crate::limit::AnalysisLimit;
use crate::score::{RawScore, ScoreValue};
use process::EngineProcess;

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The executable could not be found or launched.
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
    /// An operation needed a running engine but the session was not started.
    #[error("Engine not started")]
    NotStarted,
    /// The UCI handshake did not complete.
    #[error("Engine initialization failed: {0}")]
    InitFailed(String),
    /// The engine produced no output for longer than the liveness timeout.
    #[error("Engine unresponsive for {0:?}")]
    Unresponsive(Duration),
    /// The engine closed its output.
    #[error("Engine closed unexpectedly")]
    Terminated,
    /// The engine sent a line that violates the protocol.
    #[error("Invalid engine response: {0}")]
    Protocol(#[from] uci::UciError),
    /// Reading from or writing to the engine failed.
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of one engine search, scored from the side to move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnalysis {
    /// The search depth reached.
    pub depth: u32,
    /// Final score, if the engine reported one.
    pub score: Option<RawScore>,
    /// The principal variation in long notation; may be empty.
    pub best_line: Vec<String>,
    /// The number of nodes searched.
    pub nodes: Option<u64>,
}

/// Something that can analyze one position at a time.
///
/// [`EngineSession`] is the subprocess implementation. The evaluators only
/// depend on this trait.
pub trait Analyze {
    /// True between a successful start and the matching stop.
    fn is_started(&self) -> bool;

    /// Searches `position` under `limit` and blocks until the result is in.
    fn analyze(
        &mut self,
        position: &Position,
        limit: AnalysisLimit,
    ) -> Result<RawAnalysis, EngineError>;

    /// Tells the engine that following positions are unrelated to earlier
    /// ones.
    fn new_game(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

/// Settings for an [`EngineSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Executable to launch; discovered when `None`.
    pub engine_path: Option<PathBuf>,
    /// `Threads` option sent after the handshake.
    pub threads: Option<u32>,
    /// `Hash` option (MB) sent after the handshake.
    pub hash_mb: Option<u32>,
    /// Longest silence tolerated while waiting for a search result.
    /// `None` waits forever.
    pub liveness_timeout: Option<Duration>,
    /// Longest wait for `uciok` and `readyok`.
    pub handshake_timeout: Duration,
    /// Time the engine gets to exit after `quit` before it is killed.
    pub quit_grace: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            engine_path: None,
            threads: None,
            hash_mb: None,
            liveness_timeout: Some(Duration::from_secs(120)),
            handshake_timeout: Duration::from_secs(10),
            quit_grace: Duration::from_secs(1),
        }
    }
}

/// Owns an engine subprocess between [`start`](Self::start) and
/// [`stop`](Self::stop).
///
/// Only one analysis can be in flight; `&mut self` on every exchange makes
/// that a compile-time property. Dropping a started session stops it.
pub struct EngineSession {
    options: SessionOptions,
    process: Option<EngineProcess>,
    /// The engine's name (reported via UCI id).
    name: String,
    path: Option<PathBuf>,
}

impl EngineSession {
    /// Creates an unstarted session.
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            process: None,
            name: String::new(),
            path: None,
        }
    }

    /// Creates an unstarted session for a specific executable.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self::new(SessionOptions {
            engine_path: Some(path.into()),
            ..SessionOptions::default()
        })
    }

    /// Launches the engine and waits for it to report readiness.
    ///
    /// Starting an already started session does nothing.
    ///
    /// # Errors
    ///
    /// - `EngineError::Unavailable` if the executable cannot be found or launched
    /// - `EngineError::InitFailed` if the UCI handshake does not complete
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.process.is_some() {
            debug!("engine already started");
            return Ok(());
        }

        let path = discover_engine(self.options.engine_path.as_deref())?;
        let mut process = EngineProcess::spawn(&path)?;

        match Self::handshake(&mut process, &self.options) {
            Ok(name) => {
                info!(engine = %name, path = %path.display(), "engine started");
                self.name = name;
                self.path = Some(path);
                self.process = Some(process);
                Ok(())
            }
            Err(e) => {
                process.kill();
                Err(EngineError::InitFailed(e.to_string()))
            }
        }
    }

    /// Stops the engine. Safe to call on an unstarted or stopped session.
    pub fn stop(&mut self) {
        if let Some(process) = self.process.take() {
            info!(engine = %self.name, "stopping engine");
            process.shutdown(self.options.quit_grace);
        }
    }

    /// Returns the engine's name as reported via UCI protocol.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The executable the running engine was launched from.
    pub fn path(&self) -> Option<&std::path::Path> {
        self.path.as_deref()
    }

    fn handshake(process: &mut EngineProcess, options: &SessionOptions) -> Result<String, EngineError> {
        // One deadline for the whole exchange; chatter does not extend it.
        let deadline = deadline_after(options.handshake_timeout);
        process.send(&GuiCommand::Uci)?;

        let mut name = None;
        loop {
            match EngineMessage::parse(&recv_until(process, deadline)?) {
                Ok(EngineMessage::IdName(n)) => name = Some(n),
                Ok(EngineMessage::UciOk) => break,
                _ => {}
            }
        }

        if let Some(threads) = options.threads {
            process.send(&GuiCommand::set_option("Threads", threads))?;
        }
        if let Some(hash) = options.hash_mb {
            process.send(&GuiCommand::set_option("Hash", hash))?;
        }
        Self::wait_ready(process, deadline)?;

        Ok(name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown Engine".to_string()))
    }

    fn wait_ready(
        process: &mut EngineProcess,
        deadline: Option<(Instant, Duration)>,
    ) -> Result<(), EngineError> {
        process.send(&GuiCommand::IsReady)?;
        loop {
            if let Ok(EngineMessage::ReadyOk) = EngineMessage::parse(&recv_until(process, deadline)?) {
                return Ok(());
            }
        }
    }

    fn search(
        process: &mut EngineProcess,
        position: &Position,
        limit: AnalysisLimit,
        timeout: Option<Duration>,
    ) -> Result<RawAnalysis, EngineError> {
        process.send(&GuiCommand::position_fen(&position.fen()))?;
        process.send(&GuiCommand::Go(limit.go_options()))?;

        let mut progress = SearchProgress::new(position.turn());
        loop {
            let line = process.recv(timeout)?;
            match EngineMessage::parse(&line) {
                Ok(EngineMessage::Info(info)) => progress.absorb(&info),
                Ok(EngineMessage::BestMove { mv, .. }) => return Ok(progress.finish(mv)),
                Ok(_) => {}
                Err(uci::UciError::ParseError(msg)) if line.is_empty() => {
                    debug!(%msg, "skipping blank engine line");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// The idle timeout for a search under `limit`.
    fn search_timeout(&self, limit: AnalysisLimit) -> Option<Duration> {
        self.options
            .liveness_timeout
            .map(|t| t.saturating_add(limit.budget().unwrap_or_default()))
    }

    /// Drops an engine whose conversation can no longer be trusted.
    fn abandon(&mut self) {
        if let Some(process) = self.process.take() {
            warn!(engine = %self.name, "abandoning engine after failed exchange");
            process.kill();
        }
    }
}

impl Analyze for EngineSession {
    fn is_started(&self) -> bool {
        self.process.is_some()
    }

    fn analyze(
        &mut self,
        position: &Position,
        limit: AnalysisLimit,
    ) -> Result<RawAnalysis, EngineError> {
        let timeout = self.search_timeout(limit);
        let process = self.process.as_mut().ok_or(EngineError::NotStarted)?;

        let result = Self::search(process, position, limit, timeout);
        match &result {
            Ok(analysis) => debug!(
                fen = %position.fen(),
                depth = analysis.depth,
                score = ?analysis.score,
                best = ?analysis.best_line.first(),
                "analysis finished"
            ),
            Err(e) => {
                warn!(error = %e, fen = %position.fen(), "analysis failed");
                self.abandon();
            }
        }
        result
    }

    fn new_game(&mut self) -> Result<(), EngineError> {
        let deadline = self.options.liveness_timeout.and_then(deadline_after);
        let process = self.process.as_mut().ok_or(EngineError::NotStarted)?;

        let result = process
            .send(&GuiCommand::UciNewGame)
            .and_then(|_| Self::wait_ready(process, deadline));
        if result.is_err() {
            self.abandon();
        }
        result
    }
}

/// The instant `limit` from now, paired with `limit`. `None` when the
/// instant is not representable, which means waiting without bound.
fn deadline_after(limit: Duration) -> Option<(Instant, Duration)> {
    Instant::now().checked_add(limit).map(|at| (at, limit))
}

/// Reads one line, bounded by `deadline` (instant and total length) when
/// one is given.
fn recv_until(
    process: &mut EngineProcess,
    deadline: Option<(Instant, Duration)>,
) -> Result<String, EngineError> {
    match deadline {
        Some((at, limit)) => process.recv_by(at, limit),
        None => process.recv(None),
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Folds the `info` stream of one search into a [`RawAnalysis`].
#[derive(Debug)]
struct SearchProgress {
    side_to_move: Color,
    depth: u32,
    score: Option<ScoreValue>,
    score_is_exact: bool,
    pv: Vec<String>,
    nodes: Option<u64>,
}

impl SearchProgress {
    fn new(side_to_move: Color) -> Self {
        Self {
            side_to_move,
            depth: 0,
            score: None,
            score_is_exact: false,
            pv: Vec::new(),
            nodes: None,
        }
    }

    fn absorb(&mut self, info: &EngineInfo) {
        // Only the first line matters in MultiPV mode.
        if info.multipv.is_some_and(|n| n > 1) {
            return;
        }
        if let Some(depth) = info.depth {
            self.depth = depth;
        }
        if let Some(nodes) = info.nodes {
            self.nodes = Some(nodes);
        }
        if let Some(score) = info.score {
            let exact = info.has_exact_score();
            if exact || !self.score_is_exact {
                self.score = Some(score.into());
                self.score_is_exact = exact;
            }
        }
        if !info.pv.is_empty() {
            self.pv = info.pv.clone();
        }
    }

    fn finish(self, best_move: Option<String>) -> RawAnalysis {
        let best_line = if self.pv.is_empty() {
            best_move.into_iter().collect()
        } else {
            self.pv
        };
        let side_to_move = self.side_to_move;

        RawAnalysis {
            depth: self.depth,
            score: self.score.map(|value| RawScore::new(value, side_to_move)),
            best_line,
            nodes: self.nodes,
        }
    }
}
