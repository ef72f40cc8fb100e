//! Board and rules adapter.
//!
//! Legality, move application, FEN handling and SAN rendering are delegated
//! to [`shakmaty`]. Everything above this module speaks in FEN strings and
//! long (UCI) move strings, and only ever sees [`Position`] values.

use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position as _, Setup};
use std::fmt;
use thiserror::Error;

/// The standard starting position.
pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors raised for malformed or illegal input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The position descriptor could not be parsed or describes an
    /// impossible position.
    #[error("Invalid position descriptor '{fen}': {reason}")]
    InvalidDescriptor { fen: String, reason: String },
    /// The move string is not in long (UCI) notation.
    #[error("Invalid move notation: {0}")]
    InvalidMoveNotation(String),
    /// The move is well formed but not legal in the position.
    #[error("Illegal move {mv} in position {fen}")]
    IllegalMove { mv: String, fen: String },
}

/// An immutable chess position.
///
/// Applying a move returns a new `Position`; the receiver is never touched.
#[derive(Clone)]
pub struct Position {
    inner: Chess,
}

impl Position {
    /// The standard starting position.
    pub fn startpos() -> Self {
        Self {
            inner: Chess::default(),
        }
    }

    /// Parses a FEN descriptor.
    pub fn from_fen(fen: &str) -> Result<Self, BoardError> {
        let invalid = |reason: String| BoardError::InvalidDescriptor {
            fen: fen.to_string(),
            reason,
        };

        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{}", e)))?;
        let setup: Setup = parsed.into();
        let inner: Chess = setup
            .position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{}", e)))?;

        Ok(Self { inner })
    }

    /// FEN rendering. The en passant square is only included when an en
    /// passant capture is actually legal.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.inner, EnPassantMode::Legal).to_string()
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.inner.turn()
    }

    /// All legal moves in long notation.
    pub fn legal_moves(&self) -> Vec<String> {
        self.inner
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    /// Parses a long-notation move and checks it against this position.
    pub fn parse_move(&self, uci: &str) -> Result<Move, BoardError> {
        let parsed: UciMove = uci
            .trim()
            .parse()
            .map_err(|_| BoardError::InvalidMoveNotation(uci.to_string()))?;

        parsed
            .to_move(&self.inner)
            .map_err(|_| BoardError::IllegalMove {
                mv: uci.to_string(),
                fen: self.fen(),
            })
    }

    /// Returns the position after `uci` is played.
    pub fn play(&self, uci: &str) -> Result<Position, BoardError> {
        let m = self.parse_move(uci)?;
        let mut next = self.inner.clone();
        next.play_unchecked(m);
        Ok(Self { inner: next })
    }

    /// Renders a legal move in SAN, including the check or mate suffix.
    pub fn san(&self, uci: &str) -> Result<String, BoardError> {
        let m = self.parse_move(uci)?;
        let mut scratch = self.inner.clone();
        Ok(SanPlus::from_move_and_play_unchecked(&mut scratch, m).to_string())
    }

    /// SAN rendering and the resulting position in one step.
    pub(crate) fn play_with_san(&self, uci: &str) -> Result<(Position, String), BoardError> {
        let m = self.parse_move(uci)?;
        let mut next = self.inner.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut next, m).to_string();
        Ok((Self { inner: next }, san))
    }

    /// True for checkmate, stalemate and insufficient material.
    pub fn is_game_over(&self) -> bool {
        self.inner.is_game_over()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.fen() == other.fen()
    }
}

impl Eq for Position {}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Position").field(&self.fen()).finish()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fen())
    }
}
