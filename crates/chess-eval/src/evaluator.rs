//! Position, sequence and move-comparison evaluation.
//!
//! This module provides the [`Evaluator`], which turns raw engine output
//! into White-relative [`PositionEvaluation`] records and composes them
//! into sequence walks and candidate comparisons.

use tracing::{debug, warn};

use crate::board::{BoardError, Position};
use crate::config::EvaluatorConfig;
use crate::engine::{Analyze, EngineError, EngineSession};
use crate::error::EvalError;
use crate::evaluation::{
    CandidateOutcome, Evaluation, MoveComparison, MoveRejection, PositionEvaluation,
    SequenceEvaluation, SequenceHalt,
};
use crate::limit::AnalysisLimit;
use crate::pv::decode_pv;
use crate::score::{describe_checkmate, normalize};

/// Evaluates positions through an [`Analyze`] implementation.
///
/// Every operation issues its analyses one after another on the single
/// engine it owns.
pub struct Evaluator<E: Analyze = EngineSession> {
    engine: E,
    /// Depth used when a call passes no limit.
    default_depth: u32,
}

impl<E: Analyze> Evaluator<E> {
    /// Wraps an engine. The engine must be started before evaluating.
    pub fn new(engine: E, default_depth: u32) -> Self {
        Self {
            engine,
            default_depth: default_depth.max(1),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn default_depth(&self) -> u32 {
        self.default_depth
    }

    /// Evaluates the position described by `fen`.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotStarted` if the engine is not running
    /// - `BoardError::InvalidDescriptor` if `fen` cannot be parsed
    /// - any engine failure during the search
    pub fn evaluate(
        &mut self,
        fen: &str,
        limit: Option<AnalysisLimit>,
    ) -> Result<PositionEvaluation, EvalError> {
        self.ensure_started()?;
        let position = Position::from_fen(fen)?;
        self.evaluate_position(&position, limit)
    }

    /// Evaluates an already parsed position.
    pub fn evaluate_position(
        &mut self,
        position: &Position,
        limit: Option<AnalysisLimit>,
    ) -> Result<PositionEvaluation, EvalError> {
        self.ensure_started()?;
        let limit = self.limit_or_default(limit);
        let raw = self.engine.analyze(position, limit)?;

        let evaluation = raw.score.map(normalize);
        let evaluation_text = evaluation.map(|e| match e {
            Evaluation::Mate(0) => describe_checkmate(position.turn()),
            other => other.describe(),
        });

        let (best_move, pv, pv_san) = if raw.best_line.is_empty() {
            (None, None, None)
        } else {
            let decoded = decode_pv(position, &raw.best_line);
            (
                decoded.uci.first().cloned(),
                Some(decoded.uci),
                Some(decoded.san),
            )
        };

        Ok(PositionEvaluation {
            fen: position.fen(),
            depth: raw.depth,
            score: evaluation.and_then(Evaluation::centipawns),
            mate: evaluation.and_then(Evaluation::mate),
            evaluation_text,
            best_move,
            pv,
            pv_san,
        })
    }

    /// Evaluates the starting position and the position after every move.
    ///
    /// Starts from `starting_fen`, or the standard position when `None`.
    /// A move that cannot be played ends the walk; the result then holds the
    /// evaluations made so far and [`SequenceEvaluation::halted`] says where
    /// it stopped.
    pub fn evaluate_sequence<S: AsRef<str>>(
        &mut self,
        moves: &[S],
        starting_fen: Option<&str>,
        limit: Option<AnalysisLimit>,
    ) -> Result<SequenceEvaluation, EvalError> {
        self.ensure_started()?;
        let mut current = match starting_fen {
            Some(fen) => Position::from_fen(fen)?,
            None => Position::startpos(),
        };

        self.engine.new_game()?;
        let mut evaluations = Vec::with_capacity(moves.len() + 1);
        evaluations.push(self.evaluate_position(&current, limit)?);

        for (index, mv) in moves.iter().enumerate() {
            let mv = mv.as_ref();
            match current.play(mv) {
                Ok(next) => {
                    current = next;
                    evaluations.push(self.evaluate_position(&current, limit)?);
                }
                Err(err) => {
                    let reason = rejection(&err)?;
                    warn!(index, %mv, error = %err, "sequence stopped at unplayable move");
                    return Ok(SequenceEvaluation {
                        evaluations,
                        halted: Some(SequenceHalt {
                            index,
                            mv: mv.to_string(),
                            reason,
                        }),
                    });
                }
            }
        }

        Ok(SequenceEvaluation {
            evaluations,
            halted: None,
        })
    }

    /// Evaluates each candidate move from `fen`, from the mover's side.
    ///
    /// The position after a candidate is scored with its sign flipped, so
    /// every reported `score`/`mate` is the negation of the White-relative
    /// value of the resulting position, while `evaluation_text` describes
    /// that position as is. Candidates that cannot be played are recorded
    /// as rejected and do not stop the comparison.
    pub fn compare_moves<S: AsRef<str>>(
        &mut self,
        fen: &str,
        candidates: &[S],
        limit: Option<AnalysisLimit>,
    ) -> Result<MoveComparison, EvalError> {
        self.ensure_started()?;
        let origin = Position::from_fen(fen)?;
        let mut outcomes = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let mv = candidate.as_ref();
            // Playing a move yields a new position; `origin` is never modified.
            let outcome = match origin.play(mv) {
                Ok(after) => {
                    let eval = self.evaluate_position(&after, limit)?;
                    CandidateOutcome::Evaluated(from_mover_side(eval))
                }
                Err(err) => {
                    let reason = rejection(&err)?;
                    warn!(%mv, error = %err, "candidate rejected");
                    CandidateOutcome::Rejected(reason)
                }
            };
            outcomes.push((mv.to_string(), outcome));
        }

        debug!(fen = %origin.fen(), candidates = outcomes.len(), "comparison finished");
        Ok(MoveComparison {
            origin_fen: origin.fen(),
            mover: origin.turn().into(),
            candidates: outcomes,
        })
    }

    /// The engine's preferred move from `fen`, if it names one.
    pub fn best_move(
        &mut self,
        fen: &str,
        limit: Option<AnalysisLimit>,
    ) -> Result<Option<String>, EvalError> {
        Ok(self.evaluate(fen, limit)?.best_move)
    }

    fn ensure_started(&self) -> Result<(), EngineError> {
        if self.engine.is_started() {
            Ok(())
        } else {
            Err(EngineError::NotStarted)
        }
    }

    fn limit_or_default(&self, limit: Option<AnalysisLimit>) -> AnalysisLimit {
        limit
            .unwrap_or(AnalysisLimit::Depth(self.default_depth))
            .at_least_one_ply()
    }
}

impl Evaluator<EngineSession> {
    /// Launches the configured engine and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Engine`] if the engine cannot be found or does
    /// not complete the handshake.
    pub fn start(config: &EvaluatorConfig) -> Result<Self, EvalError> {
        let mut session = EngineSession::new(config.session_options());
        session.start()?;
        Ok(Self::new(session, config.depth))
    }

    /// Runs `f` against a freshly started engine and stops the engine
    /// afterwards, whether `f` succeeded or not.
    pub fn scoped<T, F>(config: &EvaluatorConfig, f: F) -> Result<T, EvalError>
    where
        F: FnOnce(&mut Self) -> Result<T, EvalError>,
    {
        let mut evaluator = Self::start(config)?;
        let result = f(&mut evaluator);
        evaluator.shutdown();
        result
    }

    /// Stops the engine. Later evaluations fail with `NotStarted`.
    pub fn shutdown(&mut self) {
        self.engine.stop();
    }
}

/// Maps a move failure to its marker. Anything other than a move failure
/// is passed back as an error.
fn rejection(err: &BoardError) -> Result<MoveRejection, EvalError> {
    match err {
        BoardError::IllegalMove { .. } => Ok(MoveRejection::Illegal),
        BoardError::InvalidMoveNotation(_) => Ok(MoveRejection::InvalidNotation),
        other => Err(EvalError::Board(other.clone())),
    }
}

/// Negates the score and mate of an evaluation of the position after a
/// move. The text still describes that position.
fn from_mover_side(mut eval: PositionEvaluation) -> PositionEvaluation {
    let flipped = eval.evaluation().map(Evaluation::flip);
    eval.score = flipped.and_then(Evaluation::centipawns);
    eval.mate = flipped.and_then(Evaluation::mate);
    eval
}
