use crate::config::Settings;
use crate::domain::history::{PriceBar, PriceHistory};
use crate::ingest::http::{build_client, get_json, join_url};
use crate::ingest::types::{ChartQuote, ChartResponse};
use crate::time::exchange::exchange_local_date;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

const CHART_PATH: &str = "/v8/finance/chart";
const DAILY_INTERVAL: &str = "1d";
/// Predates every listing; the provider clamps it to the first traded day.
const EARLIEST_PERIOD_START: i64 = -2_208_994_789;

#[async_trait::async_trait]
pub trait MarketDataClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Maximum available daily history. An unknown ticker yields an empty history.
    async fn fetch_daily_history(&self, ticker: &str) -> Result<PriceHistory>;
}

#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
}

impl YahooChartProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            http: build_client(settings)?,
            base_url: settings.market_data_base_url.clone(),
        })
    }

    fn url(&self, ticker: &str) -> String {
        join_url(&self.base_url, &format!("{CHART_PATH}/{}", ticker.trim()))
    }
}

#[async_trait::async_trait]
impl MarketDataClient for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_daily_history(&self, ticker: &str) -> Result<PriceHistory> {
        let url = self.url(ticker);
        let window = history_window(chrono::Utc::now().timestamp());
        let query: Vec<(&str, &str)> = window.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let (status, raw_json) = get_json(&self.http, &url, &query).await?;

        if status == StatusCode::NOT_FOUND {
            tracing::warn!(%ticker, %status, "market data provider has no chart for ticker");
            return Ok(PriceHistory::new(ticker, Vec::new()));
        }
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {raw_json}");
        }

        let history = parse_chart(ticker, raw_json)?;
        tracing::debug!(%ticker, bars = history.len(), "fetched daily history");
        Ok(history)
    }
}

/// Explicit `period1`/`period2` window at daily interval. `range=max` lets the provider pick a
/// coarser interval for long listings.
fn history_window(now_unix: i64) -> [(&'static str, String); 3] {
    [
        ("period1", EARLIEST_PERIOD_START.to_string()),
        ("period2", now_unix.to_string()),
        ("interval", DAILY_INTERVAL.to_string()),
    ]
}

fn parse_chart(ticker: &str, raw_json: Value) -> Result<PriceHistory> {
    let parsed = serde_json::from_value::<ChartResponse>(raw_json)
        .context("failed to parse provider response into ChartResponse")?;

    if let Some(err) = parsed.chart.error {
        tracing::warn!(
            %ticker,
            code = %err.code,
            description = err.description.as_deref().unwrap_or(""),
            "market data provider returned chart error"
        );
        return Ok(PriceHistory::new(ticker, Vec::new()));
    }

    let Some(result) = parsed.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceHistory::new(ticker, Vec::new()));
    };

    if let Some(granularity) = result.meta.data_granularity.as_deref() {
        if granularity != DAILY_INTERVAL {
            anyhow::bail!(
                "market data for {ticker} served at {granularity} granularity, expected {DAILY_INTERVAL}"
            );
        }
    }

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let gmtoffset = result.meta.gmtoffset.unwrap_or(0);

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut dropped: usize = 0;
    for (i, ts) in result.timestamp.iter().copied().enumerate() {
        match bar_at(&quote, i) {
            Some((open, high, low, close, volume)) => bars.push(PriceBar {
                date: exchange_local_date(ts, gmtoffset)?,
                open,
                high,
                low,
                close,
                volume,
            }),
            None => dropped += 1,
        }
    }

    if dropped != 0 {
        tracing::debug!(%ticker, dropped, "dropped bars with missing prices");
    }

    Ok(PriceHistory::new(ticker, bars))
}

fn bar_at(quote: &ChartQuote, i: usize) -> Option<(f64, f64, f64, f64, Option<u64>)> {
    let value = |col: &[Option<f64>]| col.get(i).copied().flatten().filter(|v| v.is_finite());

    let open = value(&quote.open[..])?;
    let high = value(&quote.high[..])?;
    let low = value(&quote.low[..])?;
    let close = value(&quote.close[..])?;
    let volume = value(&quote.volume[..])
        .filter(|v| *v >= 0.0)
        .map(|v| v as u64);
    Some((open, high, low, close, volume))
}
