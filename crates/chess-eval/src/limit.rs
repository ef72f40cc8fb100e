//! Search limits for a single analysis request.

use std::time::Duration;
use uci::GoOptions;

/// How long the engine may search. Exactly one limit applies per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisLimit {
    /// Search to this many plies.
    Depth(u32),
    /// Search for this much wall-clock time. The engine enforces it.
    Time(Duration),
}

impl AnalysisLimit {
    /// Picks the limit from optional caller input.
    ///
    /// A positive time budget wins over a positive depth; with neither,
    /// `default_depth` applies. Zero, negative and non-finite values count
    /// as not supplied. Budgets too large for a `Duration` saturate.
    pub fn resolve(depth: Option<u32>, seconds: Option<f64>, default_depth: u32) -> Self {
        match (seconds, depth) {
            (Some(s), _) if s.is_finite() && s > 0.0 => {
                AnalysisLimit::Time(Duration::try_from_secs_f64(s).unwrap_or(Duration::MAX))
            }
            (_, Some(d)) if d > 0 => AnalysisLimit::Depth(d),
            _ => AnalysisLimit::Depth(default_depth.max(1)),
        }
    }

    /// The same limit with a depth of at least one ply.
    pub fn at_least_one_ply(self) -> Self {
        match self {
            AnalysisLimit::Depth(d) => AnalysisLimit::Depth(d.max(1)),
            time => time,
        }
    }

    /// The `go` parameters for this limit.
    pub fn go_options(&self) -> GoOptions {
        match *self {
            AnalysisLimit::Depth(d) => GoOptions::depth(d),
            AnalysisLimit::Time(t) => {
                let ms = u64::try_from(t.as_millis()).unwrap_or(u64::MAX);
                GoOptions::movetime(ms.max(1))
            }
        }
    }

    /// The time budget, for limits that have one.
    pub fn budget(&self) -> Option<Duration> {
        match *self {
            AnalysisLimit::Depth(_) => None,
            AnalysisLimit::Time(t) => Some(t),
        }
    }
}
