//! Chess position evaluation driven by a UCI engine such as Stockfish.
//!
//! Engine output is scored from the side to move; everything this crate
//! returns is scored from White's side instead.
//!
//! # Overview
//!
//! - [`EngineSession`] - Owns the engine subprocess and its UCI conversation
//! - [`Evaluator`] - Single-position, sequence and candidate-move evaluation
//! - [`PositionEvaluation`] - One normalized evaluation record
//! - [`Position`] - Immutable board state backed by `shakmaty`
//! - [`EvaluatorConfig`] - TOML configuration
//!
//! # Example
//!
//! ```no_run
//! use chess_eval::{Evaluator, EvaluatorConfig, STARTPOS_FEN};
//!
//! let config = EvaluatorConfig::default();
//! let evaluation = Evaluator::scoped(&config, |evaluator| {
//!     evaluator.evaluate(STARTPOS_FEN, None)
//! })?;
//! println!("{:?}", evaluation.evaluation_text);
//! # Ok::<(), chess_eval::EvalError>(())
//! ```

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod evaluator;
pub mod limit;
pub mod pv;
pub mod score;

pub use board::{BoardError, Position, STARTPOS_FEN};
pub use config::{ConfigError, EvaluatorConfig};
pub use engine::{discover_engine, Analyze, EngineError, EngineSession, RawAnalysis, SessionOptions};
pub use error::EvalError;
pub use evaluation::{
    CandidateOutcome, Evaluation, MoveComparison, MoveRejection, Mover, PositionEvaluation,
    SequenceEvaluation, SequenceHalt,
};
pub use evaluator::Evaluator;
pub use limit::AnalysisLimit;
pub use pv::{decode_pv, DecodedPv, PV_SAN_LIMIT};
pub use score::{normalize, RawScore, ScoreValue};
