//! The engine child process and its line channel.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uci::GuiCommand;

use super::EngineError;

/// A running engine with a background thread forwarding its stdout.
///
/// Reading through a channel lets every wait carry a timeout, so a hung
/// engine surfaces as [`EngineError::Unresponsive`] instead of blocking
/// forever.
pub(crate) struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<std::io::Result<String>>,
}

impl EngineProcess {
    /// Spawns `path` with piped stdin and stdout.
    pub(crate) fn spawn(path: &Path) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!("cannot launch {}: {}", path.display(), e))
            })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::InitFailed("engine pipes unavailable".to_string()));
            }
        };

        let (tx, rx) = mpsc::channel();
        let reader = thread::Builder::new()
            .name("uci-reader".to_string())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
            });

        if let Err(e) = reader {
            let _ = child.kill();
            let _ = child.wait();
            return Err(EngineError::Io(e));
        }

        Ok(Self {
            child,
            stdin,
            lines: rx,
        })
    }

    /// Writes one command line.
    pub(crate) fn send(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        debug!(command = %command, "engine <");
        writeln!(self.stdin, "{}", command)?;
        self.stdin.flush()?;
        Ok(())
    }

    /// Waits for the next output line. `None` waits indefinitely.
    pub(crate) fn recv(&mut self, timeout: Option<Duration>) -> Result<String, EngineError> {
        let received = match timeout {
            Some(limit) => self.lines.recv_timeout(limit).map_err(|e| match e {
                RecvTimeoutError::Timeout => EngineError::Unresponsive(limit),
                RecvTimeoutError::Disconnected => EngineError::Terminated,
            })?,
            None => self.lines.recv().map_err(|_| EngineError::Terminated)?,
        };
        let line = received?;
        Ok(line.trim().to_string())
    }

    /// Waits for the next output line, giving up at `deadline`. `limit` is
    /// the length of the whole wait, reported on timeout.
    pub(crate) fn recv_by(&mut self, deadline: Instant, limit: Duration) -> Result<String, EngineError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let received = self.lines.recv_timeout(remaining).map_err(|e| match e {
            RecvTimeoutError::Timeout => EngineError::Unresponsive(limit),
            RecvTimeoutError::Disconnected => EngineError::Terminated,
        })?;
        let line = received?;
        Ok(line.trim().to_string())
    }

    /// Asks the engine to quit and kills it once `grace` has passed.
    pub(crate) fn shutdown(mut self, grace: Duration) {
        if self.send(&GuiCommand::Quit).is_ok() {
            let deadline = Instant::now().checked_add(grace);
            loop {
                match self.child.try_wait() {
                    Ok(Some(status)) => {
                        debug!(%status, "engine exited");
                        return;
                    }
                    Ok(None) if deadline.map_or(true, |d| Instant::now() < d) => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    _ => break,
                }
            }
            warn!(?grace, "engine ignored quit, killing it");
        }
        self.kill();
    }

    /// Terminates the engine immediately.
    pub(crate) fn kill(mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
