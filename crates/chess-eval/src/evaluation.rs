//! Chess position evaluation types.

use serde::{Deserialize, Serialize};
use shakmaty::Color;

use crate::score::{describe_centipawns, describe_mate};

/// Represents a chess position evaluation.
///
/// Evaluations can be either centipawn scores (for normal positions)
/// or mate scores (when a forced mate is found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Evaluation {
    /// Centipawn evaluation (positive = white advantage)
    Centipawns(i32),
    /// Mate in N moves (positive = white wins, negative = black wins)
    Mate(i32),
}

impl Evaluation {
    /// The same evaluation seen from the other side.
    pub fn flip(self) -> Self {
        match self {
            Evaluation::Centipawns(cp) => Evaluation::Centipawns(cp.saturating_neg()),
            Evaluation::Mate(n) => Evaluation::Mate(n.saturating_neg()),
        }
    }

    pub fn centipawns(self) -> Option<i32> {
        match self {
            Evaluation::Centipawns(cp) => Some(cp),
            Evaluation::Mate(_) => None,
        }
    }

    pub fn mate(self) -> Option<i32> {
        match self {
            Evaluation::Mate(n) => Some(n),
            Evaluation::Centipawns(_) => None,
        }
    }

    /// Human-readable classification, e.g. "Slight advantage for white".
    pub fn describe(self) -> String {
        match self {
            Evaluation::Centipawns(cp) => describe_centipawns(cp),
            Evaluation::Mate(n) => describe_mate(n),
        }
    }
}

/// Evaluation of a single position, always from White's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEvaluation {
    /// The evaluated position.
    pub fen: String,
    /// Depth the engine reached.
    pub depth: u32,
    /// Centipawn score; `None` for mate scores or when the engine gave none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    /// Mate distance, positive when White mates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mate: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_text: Option<String>,
    /// First move of the best line, in long notation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_move: Option<String>,
    /// Best line in long notation, exactly as the engine reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pv: Option<Vec<String>>,
    /// Best line in SAN. May be shorter than `pv`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pv_san: Option<Vec<String>>,
}

impl PositionEvaluation {
    /// The score as an [`Evaluation`], if the engine produced one.
    pub fn evaluation(&self) -> Option<Evaluation> {
        match (self.mate, self.score) {
            (Some(n), _) => Some(Evaluation::Mate(n)),
            (None, Some(cp)) => Some(Evaluation::Centipawns(cp)),
            (None, None) => None,
        }
    }
}

/// Why a move string was not played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveRejection {
    /// Well-formed move that is not legal in the position.
    Illegal,
    /// Not a long-notation move at all.
    InvalidNotation,
}

/// Where and why a sequence evaluation stopped early.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceHalt {
    /// Index into the submitted move list.
    pub index: usize,
    /// The offending move string.
    pub mv: String,
    pub reason: MoveRejection,
}

/// Evaluations along a line of moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEvaluation {
    /// Index 0 is the starting position, index `i` the position after
    /// `i` moves.
    pub evaluations: Vec<PositionEvaluation>,
    /// Set when a move could not be played; `evaluations` then ends at the
    /// position before it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halted: Option<SequenceHalt>,
}

impl SequenceEvaluation {
    /// True when every submitted move was played and evaluated.
    pub fn is_complete(&self) -> bool {
        self.halted.is_none()
    }
}

/// Outcome for one candidate move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOutcome {
    Evaluated(PositionEvaluation),
    Rejected(MoveRejection),
}

/// The side that plays the candidate moves of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mover {
    White,
    Black,
}

impl From<Color> for Mover {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Mover::White,
            Color::Black => Mover::Black,
        }
    }
}

/// Candidate moves from one position, in the order they were submitted.
///
/// Each evaluated candidate carries the negated White-relative value of the
/// position after the move, and the evaluation text of that position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveComparison {
    /// Position the candidates were played from.
    pub origin_fen: String,
    /// Side to move in the origin position.
    pub mover: Mover,
    pub candidates: Vec<(String, CandidateOutcome)>,
}

impl MoveComparison {
    /// Looks up the outcome for a candidate.
    pub fn get(&self, mv: &str) -> Option<&CandidateOutcome> {
        self.candidates
            .iter()
            .find(|(candidate, _)| candidate == mv)
            .map(|(_, outcome)| outcome)
    }

    /// All candidates, best for the mover first. Rejected candidates come
    /// last, in submission order.
    pub fn ranked(&self) -> Vec<(&str, &CandidateOutcome)> {
        let (mut evaluated, rejected): (Vec<_>, Vec<_>) = self
            .candidates
            .iter()
            .map(|(mv, outcome)| (mv.as_str(), outcome))
            .partition(|(_, outcome)| matches!(outcome, CandidateOutcome::Evaluated(_)));

        evaluated.sort_by_key(|(_, outcome)| match outcome {
            CandidateOutcome::Evaluated(eval) => {
                std::cmp::Reverse(sort_key(self.for_mover(eval)))
            }
            CandidateOutcome::Rejected(_) => std::cmp::Reverse((i8::MIN, 0)),
        });
        evaluated.extend(rejected);
        evaluated
    }

    /// A candidate's value with positive meaning good for the mover.
    fn for_mover(&self, eval: &PositionEvaluation) -> Option<Evaluation> {
        // Reported values are negated White-relative values, which already
        // read from Black's side.
        let reported = eval.evaluation();
        match self.mover {
            Mover::White => reported.map(Evaluation::flip),
            Mover::Black => reported,
        }
    }
}

/// Total order on mover-relative values: delivering mate beats any
/// centipawn score (sooner first), getting mated loses to any (later
/// first), missing scores sort last.
fn sort_key(value: Option<Evaluation>) -> (i8, i64) {
    match value {
        Some(Evaluation::Mate(n)) if n >= 0 => (2, -i64::from(n)),
        Some(Evaluation::Mate(n)) => (0, -i64::from(n)),
        Some(Evaluation::Centipawns(cp)) => (1, i64::from(cp)),
        None => (-1, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_with(score: Option<i32>, mate: Option<i32>) -> PositionEvaluation {
        PositionEvaluation {
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            depth: 10,
            score,
            mate,
            evaluation_text: None,
            best_move: None,
            pv: None,
            pv_san: None,
        }
    }

    #[test]
    fn flip_negates_both_kinds() {
        assert_eq!(Evaluation::Centipawns(35).flip(), Evaluation::Centipawns(-35));
        assert_eq!(Evaluation::Mate(-2).flip(), Evaluation::Mate(2));
    }

    #[test]
    fn accessors() {
        assert_eq!(Evaluation::Centipawns(12).centipawns(), Some(12));
        assert_eq!(Evaluation::Centipawns(12).mate(), None);
        assert_eq!(Evaluation::Mate(3).mate(), Some(3));
        assert_eq!(Evaluation::Mate(3).centipawns(), None);
    }

    #[test]
    fn describe_delegates_to_classifier() {
        assert_eq!(Evaluation::Centipawns(10).describe(), "Equal position");
        assert_eq!(Evaluation::Mate(-4).describe(), "Mate in 4 for black");
    }

    #[test]
    fn position_evaluation_round_trips_to_evaluation() {
        assert_eq!(
            eval_with(Some(40), None).evaluation(),
            Some(Evaluation::Centipawns(40))
        );
        assert_eq!(eval_with(None, Some(2)).evaluation(), Some(Evaluation::Mate(2)));
        assert_eq!(eval_with(None, None).evaluation(), None);
    }

    #[test]
    fn absent_fields_are_not_serialized() {
        let json = serde_json::to_value(eval_with(Some(25), None)).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["score"], 25);
        assert_eq!(obj["depth"], 10);
        assert!(!obj.contains_key("mate"));
        assert!(!obj.contains_key("pv"));
        assert!(!obj.contains_key("pv_san"));
        assert!(!obj.contains_key("best_move"));
    }

    #[test]
    fn rejection_markers_serialize_as_kebab_case() {
        assert_eq!(
            serde_json::to_value(MoveRejection::Illegal).unwrap(),
            "illegal"
        );
        assert_eq!(
            serde_json::to_value(MoveRejection::InvalidNotation).unwrap(),
            "invalid-notation"
        );
    }

    #[test]
    fn sequence_completeness() {
        let mut seq = SequenceEvaluation {
            evaluations: vec![eval_with(Some(0), None)],
            halted: None,
        };
        assert!(seq.is_complete());

        seq.halted = Some(SequenceHalt {
            index: 0,
            mv: "e2e5".to_string(),
            reason: MoveRejection::Illegal,
        });
        assert!(!seq.is_complete());
    }

    fn comparison(mover: Mover) -> MoveComparison {
        MoveComparison {
            origin_fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            mover,
            candidates: vec![
                ("a2a3".to_string(), CandidateOutcome::Evaluated(eval_with(Some(-20), None))),
                ("e2e5".to_string(), CandidateOutcome::Rejected(MoveRejection::Illegal)),
                ("d1h5".to_string(), CandidateOutcome::Evaluated(eval_with(None, Some(2)))),
                ("g1f3".to_string(), CandidateOutcome::Evaluated(eval_with(Some(45), None))),
                ("f2f3".to_string(), CandidateOutcome::Evaluated(eval_with(None, Some(-1)))),
                ("b1a3".to_string(), CandidateOutcome::Evaluated(eval_with(None, None))),
                ("h2h4".to_string(), CandidateOutcome::Evaluated(eval_with(None, Some(5)))),
            ],
        }
    }

    fn ranked_moves(comparison: &MoveComparison) -> Vec<&str> {
        comparison.ranked().into_iter().map(|(mv, _)| mv).collect()
    }

    #[test]
    fn comparison_lookup() {
        let comparison = comparison(Mover::White);
        assert_eq!(
            comparison.get("e2e5"),
            Some(&CandidateOutcome::Rejected(MoveRejection::Illegal))
        );
        assert!(comparison.get("b1c3").is_none());
    }

    #[test]
    fn ranking_for_white_mover() {
        // Reported -20 means +20 for White after a2a3.
        assert_eq!(
            ranked_moves(&comparison(Mover::White)),
            vec!["f2f3", "a2a3", "g1f3", "h2h4", "d1h5", "b1a3", "e2e5"]
        );
    }

    #[test]
    fn ranking_for_black_mover() {
        assert_eq!(
            ranked_moves(&comparison(Mover::Black)),
            vec!["d1h5", "h2h4", "g1f3", "a2a3", "f2f3", "b1a3", "e2e5"]
        );
    }

    #[test]
    fn delivered_mate_ranks_first() {
        let comparison = MoveComparison {
            origin_fen: "8/8/8/8/8/8/8/8 w - - 0 1".to_string(),
            mover: Mover::White,
            candidates: vec![
                ("a2a3".to_string(), CandidateOutcome::Evaluated(eval_with(Some(-900), None))),
                ("h5f7".to_string(), CandidateOutcome::Evaluated(eval_with(None, Some(0)))),
            ],
        };
        assert_eq!(ranked_moves(&comparison), vec!["h5f7", "a2a3"]);
    }

    #[test]
    fn mover_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Mover::Black).unwrap(), "black");
        assert_eq!(Mover::from(Color::White), Mover::White);
    }
}
