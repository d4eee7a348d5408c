pub mod domain;
pub mod ingest;
pub mod lookup;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query2.finance.yahoo.com";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_USD_TO_INR_RATE: f64 = 83.0;
    // The provider rejects requests without a browser-like user agent.
    pub const DEFAULT_USER_AGENT: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub symbol_search_base_url: String,
        pub market_data_base_url: String,
        pub provider_timeout_secs: u64,
        pub provider_user_agent: String,
        pub usd_to_inr_rate: f64,
    }

    impl Default for Settings {
        fn default() -> Self {
            Self {
                sentry_dsn: None,
                symbol_search_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
                market_data_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
                provider_timeout_secs: DEFAULT_TIMEOUT_SECS,
                provider_user_agent: DEFAULT_USER_AGENT.to_string(),
                usd_to_inr_rate: DEFAULT_USD_TO_INR_RATE,
            }
        }
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let defaults = Self::default();

            let provider_timeout_secs = match non_empty_var("PROVIDER_TIMEOUT_SECS") {
                Some(s) => s
                    .parse::<u64>()
                    .with_context(|| format!("PROVIDER_TIMEOUT_SECS must be an integer (got {s})"))?,
                None => defaults.provider_timeout_secs,
            };

            let usd_to_inr_rate = match non_empty_var("USD_TO_INR_RATE") {
                Some(s) => s
                    .parse::<f64>()
                    .with_context(|| format!("USD_TO_INR_RATE must be a number (got {s})"))?,
                None => defaults.usd_to_inr_rate,
            };
            anyhow::ensure!(
                usd_to_inr_rate.is_finite() && usd_to_inr_rate > 0.0,
                "USD_TO_INR_RATE must be a positive number (got {usd_to_inr_rate})"
            );

            Ok(Self {
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                symbol_search_base_url: non_empty_var("SYMBOL_SEARCH_BASE_URL")
                    .unwrap_or(defaults.symbol_search_base_url),
                market_data_base_url: non_empty_var("MARKET_DATA_BASE_URL")
                    .unwrap_or(defaults.market_data_base_url),
                provider_timeout_secs,
                provider_user_agent: non_empty_var("PROVIDER_USER_AGENT")
                    .unwrap_or(defaults.provider_user_agent),
                usd_to_inr_rate,
            })
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

}
