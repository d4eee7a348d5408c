use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use minijinja::Environment;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockinfo_core::lookup::{LookupOutcome, StockLookup};

mod chart;
mod page;

use page::PageView;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockinfo_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let lookup = StockLookup::from_settings(&settings)?;
    let state = AppState {
        lookup,
        templates: Arc::new(page::templates()?),
    };

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(
        %addr,
        rate = settings.usd_to_inr_rate,
        search = %settings.symbol_search_base_url,
        market = %settings.market_data_base_url,
        "stock info form listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/lookup", get(api_lookup))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    lookup: StockLookup,
    templates: Arc<Environment<'static>>,
}

#[derive(Debug, Deserialize)]
struct LookupParams {
    company: Option<String>,
}

impl LookupParams {
    fn company(&self) -> Option<&str> {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

async fn index(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Html<String>, StatusCode> {
    let converter = state.lookup.converter();
    let view = match params.company() {
        Some(company) => {
            let outcome = run_lookup(&state.lookup, company).await?;
            PageView::from_outcome(converter, &outcome)
        }
        None => PageView::empty(converter),
    };

    let html = view.render(&state.templates).map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %e, "page render failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Html(html))
}

async fn api_lookup(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<LookupOutcome>, StatusCode> {
    let company = params.company().ok_or(StatusCode::BAD_REQUEST)?;
    let outcome = run_lookup(&state.lookup, company).await?;
    Ok(Json(outcome))
}

async fn run_lookup(lookup: &StockLookup, company: &str) -> Result<LookupOutcome, StatusCode> {
    lookup.lookup(company).await.map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(company, error = %format!("{e:#}"), "lookup failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockinfo_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use stockinfo_core::domain::currency::{CurrencyConverter, INR, USD};
    use stockinfo_core::domain::history::{PriceBar, PriceHistory};
    use stockinfo_core::ingest::provider::MarketDataClient;
    use stockinfo_core::ingest::search::SymbolSearchClient;
    use tower::ServiceExt;

    struct FakeSearch(Option<&'static str>);

    #[async_trait::async_trait]
    impl SymbolSearchClient for FakeSearch {
        fn provider_name(&self) -> &'static str {
            "fake_search"
        }

        async fn first_symbol(&self, _name: &str) -> anyhow::Result<Option<String>> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct FakeMarket {
        closes: Vec<f64>,
        fail: bool,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl MarketDataClient for FakeMarket {
        fn provider_name(&self) -> &'static str {
            "fake_market"
        }

        async fn fetch_daily_history(&self, ticker: &str) -> anyhow::Result<PriceHistory> {
            self.requested.lock().unwrap().push(ticker.to_string());
            anyhow::ensure!(!self.fail, "upstream timed out");
            let start = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
            let bars = self
                .closes
                .iter()
                .enumerate()
                .map(|(i, close)| PriceBar {
                    date: start + chrono::Duration::days(i as i64),
                    open: *close,
                    high: *close,
                    low: *close,
                    close: *close,
                    volume: Some(1),
                })
                .collect();
            Ok(PriceHistory::new(ticker, bars))
        }
    }

    fn test_app(
        symbol: Option<&'static str>,
        closes: Vec<f64>,
        fail: bool,
    ) -> (Router, Arc<FakeMarket>) {
        let market = Arc::new(FakeMarket {
            closes,
            fail,
            requested: Mutex::new(Vec::new()),
        });
        let converter = CurrencyConverter::new(USD, INR, 83.0).unwrap();
        let lookup = StockLookup::new(Arc::new(FakeSearch(symbol)), market.clone(), converter);
        let state = AppState {
            lookup,
            templates: Arc::new(page::templates().unwrap()),
        };
        (app(state), market)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let (app, _) = test_app(None, Vec::new(), false);
        assert_eq!(get(app, "/healthz").await, (StatusCode::OK, "ok".to_string()));
    }

    #[tokio::test]
    async fn blank_form_renders_without_lookup() {
        let (app, market) = test_app(Some("AAPL"), vec![1.0; 60], false);
        let (status, body) = get(app, "/?company=%20%20").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Enter Company Name"));
        assert!(market.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_company_renders_no_match() {
        let (app, market) = test_app(None, vec![1.0; 60], false);
        let (status, body) = get(app, "/?company=Nothing+Inc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(page::BORDER_INVALID));
        assert!(body.contains("No matching stock ticker found"));
        assert!(market.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn known_company_renders_report() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let (app, market) = test_app(Some("TSLA"), closes, false);
        let (status, body) = get(app, "/?company=Tesla").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Found Ticker: TSLA"));
        assert!(body.contains("2021-06-01"));
        assert!(body.contains("Trending Up"));
        assert!(body.contains("Recommendation: Buy"));
        assert_eq!(*market.requested.lock().unwrap(), vec!["TSLA"]);
    }

    #[tokio::test]
    async fn api_lookup_returns_tagged_json() {
        let (app, _) = test_app(Some("MSFT"), vec![10.0; 60], false);
        let (status, body) = get(app, "/api/lookup?company=Microsoft").await;
        assert_eq!(status, StatusCode::OK);

        let v: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(v["status"], "found");
        assert_eq!(v["summary"]["ticker"], "MSFT");
        assert_eq!(v["trend"], "down");
        assert_eq!(v["recommendation"]["signal"], "signal");
        assert_eq!(v["recommendation"]["recommendation"], "dont_buy");
        assert_eq!(v["prices"]["initial_target"], 830.0);
    }

    #[tokio::test]
    async fn api_lookup_requires_company() {
        let (app, _) = test_app(Some("MSFT"), vec![10.0; 60], false);
        let (status, _) = get(app, "/api/lookup").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn provider_failure_is_server_error() {
        let (app, _) = test_app(Some("AMZN"), Vec::new(), true);
        let (status, _) = get(app, "/?company=Amazon").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
