use crate::config::Settings;
use crate::ingest::http::{build_client, get_json, join_url};
use crate::ingest::types::SearchResponse;
use anyhow::Result;
use serde_json::Value;

const SEARCH_PATH: &str = "/v1/finance/search";
const QUOTES_COUNT: &str = "10";

#[async_trait::async_trait]
pub trait SymbolSearchClient: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Symbol of the provider's first quote for `name`, or `None` when nothing matches.
    async fn first_symbol(&self, name: &str) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct YahooSymbolSearch {
    http: reqwest::Client,
    base_url: String,
}

impl YahooSymbolSearch {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            http: build_client(settings)?,
            base_url: settings.symbol_search_base_url.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SymbolSearchClient for YahooSymbolSearch {
    fn provider_name(&self) -> &'static str {
        "yahoo_search"
    }

    async fn first_symbol(&self, name: &str) -> Result<Option<String>> {
        let url = join_url(&self.base_url, SEARCH_PATH);
        let (status, raw_json) = get_json(
            &self.http,
            &url,
            &[
                ("q", name),
                ("quotesCount", QUOTES_COUNT),
                ("newsCount", "0"),
            ],
        )
        .await?;

        if !status.is_success() {
            anyhow::bail!("symbol search HTTP {status}: {raw_json}");
        }

        let symbol = first_symbol_from_json(raw_json);
        tracing::debug!(query = %name, symbol = ?symbol, "symbol search completed");
        Ok(symbol)
    }
}

/// Anything other than a non-empty `quotes` array whose first entry carries a symbol is "no
/// match". Bodies that aren't JSON at all already failed in `get_json`.
fn first_symbol_from_json(raw_json: Value) -> Option<String> {
    let parsed = match serde_json::from_value::<SearchResponse>(raw_json) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, "unexpected symbol search shape; treating as no match");
            return None;
        }
    };

    parsed
        .quotes
        .into_iter()
        .next()
        .and_then(|q| q.symbol)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
