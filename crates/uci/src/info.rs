//! Parsing of UCI `info` lines.

use serde::{Deserialize, Serialize};

/// Score in centipawns or mate distance, relative to the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated).
    Mate(i32),
}

/// Marks a score reported while the search window was failing high or low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBound {
    Lower,
    Upper,
}

/// Search information from engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Selective search depth.
    pub seldepth: Option<u32>,
    /// Index of the reported line when the engine runs in MultiPV mode.
    pub multipv: Option<u32>,
    /// Score evaluation.
    pub score: Option<Score>,
    /// Set when `score` is only a bound.
    pub bound: Option<ScoreBound>,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Nodes per second.
    pub nps: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Principal variation (best line found).
    pub pv: Vec<String>,
    /// Arbitrary string info.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Parse UCI info line. Returns `None` if the line is not an `info` line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace().peekable();
        if tokens.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();

        while let Some(token) = tokens.next() {
            match token {
                "depth" => info.depth = tokens.next().and_then(|t| t.parse().ok()),
                "seldepth" => info.seldepth = tokens.next().and_then(|t| t.parse().ok()),
                "multipv" => info.multipv = tokens.next().and_then(|t| t.parse().ok()),
                "nodes" => info.nodes = tokens.next().and_then(|t| t.parse().ok()),
                "nps" => info.nps = tokens.next().and_then(|t| t.parse().ok()),
                "time" => info.time = tokens.next().and_then(|t| t.parse().ok()),
                "score" => {
                    let kind = tokens.next();
                    let value = tokens.next().and_then(|t| t.parse::<i32>().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => None,
                    };
                    info.bound = match tokens.peek() {
                        Some(&"lowerbound") => Some(ScoreBound::Lower),
                        Some(&"upperbound") => Some(ScoreBound::Upper),
                        _ => None,
                    };
                    if info.bound.is_some() {
                        tokens.next();
                    }
                }
                "pv" => {
                    while let Some(mv) = tokens.next_if(|t| !is_info_keyword(t)) {
                        info.pv.push(mv.to_string());
                    }
                }
                "string" => {
                    let rest: Vec<&str> = tokens.by_ref().collect();
                    info.string = Some(rest.join(" "));
                }
                _ => {}
            }
        }

        Some(info)
    }

    /// True when the line carries an exact (non-bound) score.
    pub fn has_exact_score(&self) -> bool {
        self.score.is_some() && self.bound.is_none()
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "multipv"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "pv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "tbhits"
            | "wdl"
            | "string"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_info() {
        let line = "info depth 12 score cp 30 nodes 125000 nps 500000 pv e2e4 e7e5 g1f3";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Some(Score::Cp(30)));
        assert_eq!(info.nodes, Some(125000));
        assert_eq!(info.nps, Some(500000));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
        assert!(info.has_exact_score());
    }

    #[test]
    fn parse_mate_score() {
        let info = EngineInfo::parse("info depth 20 score mate -3 pv e2e4").unwrap();
        assert_eq!(info.score, Some(Score::Mate(-3)));
    }

    #[test]
    fn parse_bound_score() {
        let line = "info depth 18 seldepth 24 multipv 1 score cp 41 lowerbound nodes 900 pv d2d4";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.score, Some(Score::Cp(41)));
        assert_eq!(info.bound, Some(ScoreBound::Lower));
        assert_eq!(info.nodes, Some(900));
        assert_eq!(info.pv, vec!["d2d4"]);
        assert!(!info.has_exact_score());
    }

    #[test]
    fn pv_stops_at_next_keyword() {
        let line = "info depth 9 pv e2e4 e7e5 nodes 4000 time 12";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.pv, vec!["e2e4", "e7e5"]);
        assert_eq!(info.nodes, Some(4000));
        assert_eq!(info.time, Some(12));
    }

    #[test]
    fn unknown_tokens_are_skipped() {
        let line =
            "info depth 22 seldepth 30 multipv 2 score cp -15 wdl 40 900 60 hashfull 312 tbhits 0 pv c7c5";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.multipv, Some(2));
        assert_eq!(info.score, Some(Score::Cp(-15)));
        assert_eq!(info.pv, vec!["c7c5"]);
    }

    #[test]
    fn string_consumes_rest_of_line() {
        let info = EngineInfo::parse("info string NNUE evaluation using nn-b1a57edbea57.nnue").unwrap();
        assert_eq!(
            info.string.as_deref(),
            Some("NNUE evaluation using nn-b1a57edbea57.nnue")
        );
        assert_eq!(info.depth, None);
    }

    #[test]
    fn non_info_lines_are_rejected() {
        assert!(EngineInfo::parse("bestmove e2e4").is_none());
        assert!(EngineInfo::parse("").is_none());
    }

    #[test]
    fn currmove_lines_have_no_score() {
        let info = EngineInfo::parse("info depth 25 currmove g1f3 currmovenumber 3").unwrap();
        assert_eq!(info.depth, Some(25));
        assert!(info.score.is_none());
        assert!(info.pv.is_empty());
    }
}
