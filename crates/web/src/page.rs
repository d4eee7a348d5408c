use crate::chart::{compute_chart_geometry, ChartGeometry, CHART_HEIGHT, CHART_WIDTH};
use anyhow::Context;
use minijinja::Environment;
use serde::Serialize;
use stockinfo_core::domain::currency::CurrencyConverter;
use stockinfo_core::domain::recommendation::Recommendation;
use stockinfo_core::domain::summary::Trend;
use stockinfo_core::lookup::{LookupOutcome, SignalOutcome, StockReport};

const INDEX_TEMPLATE_NAME: &str = "index.html";
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

pub const BORDER_NEUTRAL: &str = "#ced4da";
pub const BORDER_VALID: &str = "#28a745";
pub const BORDER_INVALID: &str = "#dc3545";

pub const NO_MATCH_MESSAGE: &str = "❌ No matching stock ticker found for the given name.";
pub const NO_DATA_MESSAGE: &str = "❌ Data fetch failed for the selected ticker.";

pub fn templates() -> anyhow::Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template(INDEX_TEMPLATE_NAME, INDEX_TEMPLATE)
        .context("index template failed to compile")?;
    Ok(env)
}

#[derive(Debug, Serialize)]
pub struct PageView {
    pub query: String,
    pub source_code: &'static str,
    pub target_code: &'static str,
    pub border_color: &'static str,
    pub messages: Vec<Message>,
    pub details: Option<Details>,
    pub chart: Option<ChartGeometry>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub kind: &'static str,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Details {
    pub ticker: String,
    pub creation_date: String,
    pub initial_price: String,
    pub current_price: String,
    pub owner: String,
    pub trend: Trend,
    pub trend_label: String,
    pub recommendation: &'static str,
    pub recommendation_label: String,
}

impl PageView {
    pub fn empty(converter: CurrencyConverter) -> Self {
        Self {
            query: String::new(),
            source_code: converter.source.code,
            target_code: converter.target.code,
            border_color: BORDER_NEUTRAL,
            messages: Vec::new(),
            details: None,
            chart: None,
        }
    }

    pub fn from_outcome(converter: CurrencyConverter, outcome: &LookupOutcome) -> Self {
        let mut view = Self::empty(converter);
        match outcome {
            LookupOutcome::NoMatch { query } => {
                view.query = query.clone();
                view.border_color = BORDER_INVALID;
                view.messages.push(Message::error(NO_MATCH_MESSAGE));
            }
            LookupOutcome::NoData { query, ticker } => {
                view.query = query.clone();
                view.border_color = BORDER_VALID;
                view.messages.push(Message::found(ticker));
                view.messages.push(Message::error(NO_DATA_MESSAGE));
            }
            LookupOutcome::Found(report) => {
                view.query = report.query.clone();
                view.border_color = BORDER_VALID;
                view.messages.push(Message::found(&report.summary.ticker));
                view.details = Some(Details::from_report(report));
                view.chart = compute_chart_geometry(&report.closes, CHART_WIDTH, CHART_HEIGHT);
            }
        }
        view
    }

    pub fn render(&self, env: &Environment<'static>) -> anyhow::Result<String> {
        env.get_template(INDEX_TEMPLATE_NAME)
            .context("index template missing")?
            .render(self)
            .context("failed to render index page")
    }
}

impl Message {
    fn found(ticker: &str) -> Self {
        Self {
            kind: "success",
            text: format!("✅ Found Ticker: {ticker}"),
        }
    }

    fn error(text: &str) -> Self {
        Self {
            kind: "error",
            text: text.to_string(),
        }
    }
}

impl Details {
    fn from_report(report: &StockReport) -> Self {
        let trend_label = match report.trend {
            Trend::Up => format!("📈 {}", report.trend.label()),
            Trend::Down => format!("📉 {}", report.trend.label()),
        };

        let (recommendation, recommendation_label) = match report.recommendation {
            SignalOutcome::Signal {
                recommendation: Recommendation::Buy,
            } => ("buy", format!("✅ {}", report.recommendation.label())),
            SignalOutcome::Signal {
                recommendation: Recommendation::DontBuy,
            } => ("dont_buy", format!("❌ {}", report.recommendation.label())),
            SignalOutcome::InsufficientData { .. } => (
                "insufficient_data",
                format!("⚠️ Recommendation unavailable: {}", report.recommendation.label()),
            ),
        };

        Self {
            ticker: report.summary.ticker.clone(),
            creation_date: report.summary.creation_date.to_string(),
            initial_price: report.prices.initial_display(),
            current_price: report.prices.current_display(),
            owner: report.summary.owner.clone(),
            trend: report.trend,
            trend_label,
            recommendation,
            recommendation_label,
        }
    }
}
