//! Name → ticker → history → summary/signal, one request at a time.

use crate::config::Settings;
use crate::domain::currency::{format_amount, CurrencyConverter};
use crate::domain::history::PriceHistory;
use crate::domain::recommendation::{InsufficientHistory, MovingAverageRule, Recommendation};
use crate::domain::summary::{StockSummary, Trend};
use crate::ingest::provider::{MarketDataClient, YahooChartProvider};
use crate::ingest::search::{SymbolSearchClient, YahooSymbolSearch};
use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The search provider returned no usable symbol; no data fetch happened.
    NoMatch { query: String },
    /// A ticker was found but the market data provider had no rows for it.
    NoData { query: String, ticker: String },
    Found(Box<StockReport>),
}

impl LookupOutcome {
    pub fn ticker(&self) -> Option<&str> {
        match self {
            LookupOutcome::NoMatch { .. } => None,
            LookupOutcome::NoData { ticker, .. } => Some(ticker.as_str()),
            LookupOutcome::Found(report) => Some(report.summary.ticker.as_str()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub query: String,
    pub summary: StockSummary,
    pub prices: ConvertedPrices,
    pub trend: Trend,
    pub recommendation: SignalOutcome,
    pub closes: Vec<ClosePoint>,
}

impl StockReport {
    /// `None` when the history has no rows.
    pub fn build(
        query: &str,
        history: &PriceHistory,
        converter: CurrencyConverter,
        rule: &MovingAverageRule,
    ) -> Option<Self> {
        let summary = StockSummary::from_history(history)?;
        let closes = history.closes();
        let recommendation = SignalOutcome::from(rule.evaluate(&closes));

        Some(Self {
            query: query.to_string(),
            prices: ConvertedPrices::new(converter, &summary),
            trend: summary.trend(),
            summary,
            recommendation,
            closes: history
                .bars
                .iter()
                .map(|b| ClosePoint {
                    date: b.date,
                    close: b.close,
                })
                .collect(),
        })
    }
}

/// Initial/current prices in both the quote and the display currency.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedPrices {
    pub converter: CurrencyConverter,
    pub initial_source: f64,
    pub current_source: f64,
    pub initial_target: f64,
    pub current_target: f64,
}

impl ConvertedPrices {
    pub fn new(converter: CurrencyConverter, summary: &StockSummary) -> Self {
        Self {
            converter,
            initial_source: summary.initial_price,
            current_source: summary.current_price,
            initial_target: converter.convert(summary.initial_price),
            current_target: converter.convert(summary.current_price),
        }
    }

    /// `₹8300.00 (USD $100.00)`
    pub fn initial_display(&self) -> String {
        self.display(self.initial_target, self.initial_source)
    }

    pub fn current_display(&self) -> String {
        self.display(self.current_target, self.current_source)
    }

    fn display(&self, target: f64, source: f64) -> String {
        format!(
            "{} ({} {})",
            format_amount(self.converter.target, target),
            self.converter.source.code,
            format_amount(self.converter.source, source)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum SignalOutcome {
    Signal { recommendation: Recommendation },
    InsufficientData { required: usize, available: usize },
}

impl From<Result<Recommendation, InsufficientHistory>> for SignalOutcome {
    fn from(res: Result<Recommendation, InsufficientHistory>) -> Self {
        match res {
            Ok(recommendation) => SignalOutcome::Signal { recommendation },
            Err(InsufficientHistory {
                required,
                available,
            }) => SignalOutcome::InsufficientData {
                required,
                available,
            },
        }
    }
}

impl SignalOutcome {
    pub fn label(&self) -> String {
        match self {
            SignalOutcome::Signal { recommendation } => recommendation.label().to_string(),
            SignalOutcome::InsufficientData {
                required,
                available,
            } => InsufficientHistory {
                required: *required,
                available: *available,
            }
            .to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClosePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Clone)]
pub struct StockLookup {
    search: Arc<dyn SymbolSearchClient>,
    market: Arc<dyn MarketDataClient>,
    converter: CurrencyConverter,
    rule: MovingAverageRule,
}

impl StockLookup {
    pub fn new(
        search: Arc<dyn SymbolSearchClient>,
        market: Arc<dyn MarketDataClient>,
        converter: CurrencyConverter,
    ) -> Self {
        Self {
            search,
            market,
            converter,
            rule: MovingAverageRule::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let search = YahooSymbolSearch::from_settings(settings)?;
        let market = YahooChartProvider::from_settings(settings)?;
        let converter = CurrencyConverter::usd_to_inr(settings)?;
        Ok(Self::new(Arc::new(search), Arc::new(market), converter))
    }

    pub fn converter(&self) -> CurrencyConverter {
        self.converter
    }

    pub async fn lookup(&self, company_name: &str) -> anyhow::Result<LookupOutcome> {
        let query = company_name.trim().to_string();
        anyhow::ensure!(!query.is_empty(), "company name must be non-empty");

        let Some(ticker) = self
            .search
            .first_symbol(&query)
            .await
            .with_context(|| format!("{} lookup failed for {query:?}", self.search.provider_name()))?
        else {
            tracing::info!(%query, "no matching ticker");
            return Ok(LookupOutcome::NoMatch { query });
        };

        let history = self
            .market
            .fetch_daily_history(&ticker)
            .await
            .with_context(|| format!("{} fetch failed for {ticker}", self.market.provider_name()))?;

        let Some(report) = self.build_report(&query, &history) else {
            tracing::warn!(%query, %ticker, "ticker resolved but history is empty");
            return Ok(LookupOutcome::NoData { query, ticker });
        };

        tracing::info!(
            %query,
            %ticker,
            bars = history.len(),
            trend = ?report.trend,
            recommendation = ?report.recommendation,
            "lookup completed"
        );
        Ok(LookupOutcome::Found(Box::new(report)))
    }

    pub fn build_report(&self, query: &str, history: &PriceHistory) -> Option<StockReport> {
        StockReport::build(query, history, self.converter, &self.rule)
    }
}
