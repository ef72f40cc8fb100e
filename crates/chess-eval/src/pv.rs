//! Principal variation decoding.

use tracing::warn;

use crate::board::Position;

/// Maximum number of PV moves rendered in SAN.
pub const PV_SAN_LIMIT: usize = 10;

/// A principal variation in both notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPv {
    /// The engine's line, untouched.
    pub uci: Vec<String>,
    /// SAN rendering of the replayable prefix, capped at [`PV_SAN_LIMIT`].
    pub san: Vec<String>,
    /// Index of the first move that could not be replayed.
    pub truncated_at: Option<usize>,
}

/// Replays `line` from `position` and renders each move in SAN.
///
/// Replay stops at the first move that is malformed or illegal in the
/// replayed position; the SAN list then holds the moves before it. The
/// long-notation line is returned as given either way.
pub fn decode_pv(position: &Position, line: &[String]) -> DecodedPv {
    let mut replay = position.clone();
    let mut san = Vec::with_capacity(line.len().min(PV_SAN_LIMIT));
    let mut truncated_at = None;

    for (index, mv) in line.iter().take(PV_SAN_LIMIT).enumerate() {
        match replay.play_with_san(mv) {
            Ok((next, rendered)) => {
                san.push(rendered);
                replay = next;
            }
            Err(err) => {
                warn!(index, %mv, error = %err, "PV replay stopped");
                truncated_at = Some(index);
                break;
            }
        }
    }

    DecodedPv {
        uci: line.to_vec(),
        san,
        truncated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(moves: &[&str]) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn legal_line_is_fully_rendered() {
        let pv = decode_pv(&Position::startpos(), &line(&["e2e4", "e7e5", "g1f3", "b8c6"]));

        assert_eq!(pv.san, vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(pv.uci.len(), 4);
        assert_eq!(pv.truncated_at, None);
    }

    #[test]
    fn illegal_move_truncates_san_only() {
        let moves = line(&["e2e4", "e7e5", "e4e5", "g1f3"]);
        let pv = decode_pv(&Position::startpos(), &moves);

        assert_eq!(pv.san, vec!["e4", "e5"]);
        assert_eq!(pv.uci, moves);
        assert_eq!(pv.truncated_at, Some(2));
    }

    #[test]
    fn garbage_move_truncates() {
        let pv = decode_pv(&Position::startpos(), &line(&["d2d4", "zz99"]));
        assert_eq!(pv.san, vec!["d4"]);
        assert_eq!(pv.truncated_at, Some(1));
    }

    #[test]
    fn first_move_illegal_yields_empty_san() {
        let pv = decode_pv(&Position::startpos(), &line(&["e7e5"]));
        assert!(pv.san.is_empty());
        assert_eq!(pv.truncated_at, Some(0));
    }

    #[test]
    fn san_is_capped() {
        let moves = line(&[
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6",
            "f3g1", "f6g8",
        ]);
        let pv = decode_pv(&Position::startpos(), &moves);

        assert_eq!(pv.san.len(), PV_SAN_LIMIT);
        assert_eq!(pv.uci.len(), 12);
        assert_eq!(pv.truncated_at, None);
    }

    #[test]
    fn source_position_is_untouched() {
        let start = Position::startpos();
        let _ = decode_pv(&start, &line(&["e2e4", "e7e5"]));
        assert_eq!(start, Position::startpos());
    }

    #[test]
    fn empty_line() {
        let pv = decode_pv(&Position::startpos(), &[]);
        assert!(pv.uci.is_empty());
        assert!(pv.san.is_empty());
        assert_eq!(pv.truncated_at, None);
    }

    #[test]
    fn promotion_and_check_suffixes() {
        let position = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let pv = decode_pv(&position, &line(&["a7a8q"]));
        assert_eq!(pv.san, vec!["a8=Q"]);

        let position = Position::from_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let pv = decode_pv(&position, &line(&["a7a8q"]));
        assert_eq!(pv.san, vec!["a8=Q+"]);
    }
}
