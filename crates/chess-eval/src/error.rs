//! Crate-level error type.

use thiserror::Error;

use crate::board::BoardError;
use crate::config::ConfigError;
use crate::engine::EngineError;

/// Errors that can occur during evaluation.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Error from the analysis engine.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
    /// Malformed or illegal board input.
    #[error("Board error: {0}")]
    Board(#[from] BoardError),
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
