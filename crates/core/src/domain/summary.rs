use crate::domain::history::PriceHistory;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const OWNER_LABEL: &str = "Public/Institutional Investors";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub ticker: String,
    pub creation_date: NaiveDate,
    pub initial_price: f64,
    pub current_price: f64,
    pub owner: String,
}

impl StockSummary {
    /// First-row date and open, last-row close. `None` for an empty history.
    pub fn from_history(history: &PriceHistory) -> Option<Self> {
        let first = history.first()?;
        let last = history.last()?;
        Some(Self {
            ticker: history.ticker.clone(),
            creation_date: first.date,
            initial_price: first.open,
            current_price: last.close,
            owner: OWNER_LABEL.to_string(),
        })
    }

    pub fn trend(&self) -> Trend {
        Trend::between(self.initial_price, self.current_price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn between(initial: f64, current: f64) -> Self {
        if current > initial {
            Trend::Up
        } else {
            Trend::Down
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Up => "Trending Up",
            Trend::Down => "Trending Down",
        }
    }
}
