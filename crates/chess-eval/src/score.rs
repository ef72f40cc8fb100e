//! Conversion of engine scores to White's point of view.
//!
//! Engines report scores relative to the side to move. Everything this crate
//! returns is relative to White. The conversion happens in exactly one
//! place, [`normalize`], and nowhere else.

use shakmaty::Color;

use crate::evaluation::Evaluation;

/// Score value as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreValue {
    /// Centipawns, positive favours the side to move.
    Centipawns(i32),
    /// Signed mate distance, positive means the side to move mates.
    Mate(i32),
}

/// An engine score together with the perspective it was reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawScore {
    pub value: ScoreValue,
    /// Side to move in the analyzed position.
    pub side_to_move: Color,
}

impl RawScore {
    pub fn new(value: ScoreValue, side_to_move: Color) -> Self {
        Self {
            value,
            side_to_move,
        }
    }
}

impl From<uci::Score> for ScoreValue {
    fn from(score: uci::Score) -> Self {
        match score {
            uci::Score::Cp(cp) => ScoreValue::Centipawns(cp),
            uci::Score::Mate(m) => ScoreValue::Mate(m),
        }
    }
}

/// Converts a side-to-move score into a White-relative evaluation.
pub fn normalize(raw: RawScore) -> Evaluation {
    match (raw.side_to_move, raw.value) {
        (Color::White, ScoreValue::Centipawns(cp)) => Evaluation::Centipawns(cp),
        (Color::White, ScoreValue::Mate(n)) => Evaluation::Mate(n),
        (Color::Black, ScoreValue::Centipawns(cp)) => Evaluation::Centipawns(cp.saturating_neg()),
        (Color::Black, ScoreValue::Mate(n)) => Evaluation::Mate(n.saturating_neg()),
    }
}

/// Classifies a White-relative centipawn score.
///
/// Intervals are half open on the pawn scale: below 0.5 is equal, below 1.5
/// slight, below 3.0 clear, anything else winning.
pub fn describe_centipawns(cp: i32) -> String {
    let magnitude = cp.unsigned_abs();
    if magnitude < 50 {
        return "Equal position".to_string();
    }

    let side = side_label(cp);
    if magnitude < 150 {
        format!("Slight advantage for {}", side)
    } else if magnitude < 300 {
        format!("Clear advantage for {}", side)
    } else {
        format!("Winning for {}", side)
    }
}

/// Describes a White-relative mate distance.
pub fn describe_mate(n: i32) -> String {
    format!("Mate in {} for {}", n.unsigned_abs(), side_label(n))
}

/// Describes a position in which `mated` has already been checkmated.
///
/// Engines report this as `mate 0`, which carries no sign, so the winner is
/// taken from the side to move instead.
pub fn describe_checkmate(mated: Color) -> String {
    let winner = match mated {
        Color::White => "black",
        Color::Black => "white",
    };
    format!("Checkmate, {} wins", winner)
}

fn side_label(value: i32) -> &'static str {
    if value > 0 {
        "white"
    } else {
        "black"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn white_to_move_passes_through() {
        let raw = RawScore::new(ScoreValue::Centipawns(35), Color::White);
        assert_eq!(normalize(raw), Evaluation::Centipawns(35));

        let raw = RawScore::new(ScoreValue::Mate(-2), Color::White);
        assert_eq!(normalize(raw), Evaluation::Mate(-2));
    }

    #[test]
    fn black_to_move_is_negated() {
        let raw = RawScore::new(ScoreValue::Centipawns(35), Color::Black);
        assert_eq!(normalize(raw), Evaluation::Centipawns(-35));

        let raw = RawScore::new(ScoreValue::Mate(3), Color::Black);
        assert_eq!(normalize(raw), Evaluation::Mate(-3));
    }

    #[test]
    fn classification_boundaries() {
        assert_eq!(describe_centipawns(0), "Equal position");
        assert_eq!(describe_centipawns(49), "Equal position");
        assert_eq!(describe_centipawns(50), "Slight advantage for white");
        assert_eq!(describe_centipawns(149), "Slight advantage for white");
        assert_eq!(describe_centipawns(150), "Clear advantage for white");
        assert_eq!(describe_centipawns(299), "Clear advantage for white");
        assert_eq!(describe_centipawns(300), "Winning for white");
    }

    #[test]
    fn classification_boundaries_for_black() {
        assert_eq!(describe_centipawns(-49), "Equal position");
        assert_eq!(describe_centipawns(-50), "Slight advantage for black");
        assert_eq!(describe_centipawns(-150), "Clear advantage for black");
        assert_eq!(describe_centipawns(-300), "Winning for black");
        assert_eq!(describe_centipawns(i32::MIN), "Winning for black");
    }

    #[test]
    fn mate_descriptions() {
        assert_eq!(describe_mate(3), "Mate in 3 for white");
        assert_eq!(describe_mate(-1), "Mate in 1 for black");
    }

    #[test]
    fn checkmate_description_names_the_winner() {
        assert_eq!(describe_checkmate(Color::Black), "Checkmate, white wins");
        assert_eq!(describe_checkmate(Color::White), "Checkmate, black wins");
    }

    #[test]
    fn uci_scores_convert() {
        assert_eq!(ScoreValue::from(uci::Score::Cp(-20)), ScoreValue::Centipawns(-20));
        assert_eq!(ScoreValue::from(uci::Score::Mate(4)), ScoreValue::Mate(4));
    }

    proptest! {
        #[test]
        fn perspective_flip_negates(cp in -30_000i32..30_000) {
            let as_white = normalize(RawScore::new(ScoreValue::Centipawns(cp), Color::White));
            let as_black = normalize(RawScore::new(ScoreValue::Centipawns(cp), Color::Black));
            prop_assert_eq!(as_white.flip(), as_black);
        }

        #[test]
        fn mate_flip_negates(n in -100i32..100) {
            let as_white = normalize(RawScore::new(ScoreValue::Mate(n), Color::White));
            let as_black = normalize(RawScore::new(ScoreValue::Mate(n), Color::Black));
            prop_assert_eq!(as_white.flip(), as_black);
        }

        #[test]
        fn description_is_symmetric(cp in 50i32..30_000) {
            let white = describe_centipawns(cp);
            let black = describe_centipawns(-cp);
            prop_assert_eq!(white.replace("white", "black"), black);
        }
    }
}
