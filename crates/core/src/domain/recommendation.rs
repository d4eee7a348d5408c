use crate::domain::moving_average::rolling_mean;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SHORT_WINDOW: usize = 20;
pub const LONG_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Buy,
    DontBuy,
}

impl Recommendation {
    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Recommendation: Buy",
            Recommendation::DontBuy => "Recommendation: Don't Buy",
        }
    }
}

/// The close series is too short to fill the long moving-average window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientHistory {
    pub required: usize,
    pub available: usize,
}

impl fmt::Display for InsufficientHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "insufficient data: {} trading days required, {} available",
            self.required, self.available
        )
    }
}

impl std::error::Error for InsufficientHistory {}

/// Short-over-long simple moving average crossover state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingAverageRule {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MovingAverageRule {
    fn default() -> Self {
        Self {
            short_window: SHORT_WINDOW,
            long_window: LONG_WINDOW,
        }
    }
}

impl MovingAverageRule {
    /// `Buy` iff the last short moving average is strictly above the last long one.
    pub fn evaluate(&self, closes: &[f64]) -> Result<Recommendation, InsufficientHistory> {
        let required = self.short_window.max(self.long_window).max(1);
        let insufficient = InsufficientHistory {
            required,
            available: closes.len(),
        };

        let last = |window| rolling_mean(closes, window).last().copied().flatten();
        let short = last(self.short_window).ok_or(insufficient)?;
        let long = last(self.long_window).ok_or(insufficient)?;

        if short > long {
            Ok(Recommendation::Buy)
        } else {
            Ok(Recommendation::DontBuy)
        }
    }
}
