use crate::config::Settings;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

/// Shared client for both market providers: same timeout, same user agent.
pub fn build_client(settings: &Settings) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&settings.provider_user_agent)
            .context("PROVIDER_USER_AGENT is not a valid header value")?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.provider_timeout_secs))
        .default_headers(headers)
        .build()
        .context("failed to build market data http client")
}

pub fn join_url(base_url: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Issues a GET and decodes the body as JSON. The status is handed back so callers can treat
/// provider-specific "not found" answers as data rather than failures.
pub async fn get_json(
    http: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<(StatusCode, Value)> {
    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("provider request failed: {url}"))?;

    let status = res.status();
    let text = res
        .text()
        .await
        .context("failed to read provider response")?;

    match serde_json::from_str::<Value>(&text) {
        Ok(raw_json) => Ok((status, raw_json)),
        Err(_) if !status.is_success() => anyhow::bail!("provider HTTP {status}: {text}"),
        Err(err) => Err(err).with_context(|| format!("provider response is not valid JSON: {text}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://example.test/", "/v1/finance/search"),
            "https://example.test/v1/finance/search"
        );
        assert_eq!(
            join_url("https://example.test", "v8/finance/chart/AAPL"),
            "https://example.test/v8/finance/chart/AAPL"
        );
    }

    #[test]
    fn build_client_rejects_bad_user_agent() {
        let settings = Settings {
            provider_user_agent: "bad\nagent".to_string(),
            ..Settings::default()
        };
        assert!(build_client(&settings).is_err());
        assert!(build_client(&Settings::default()).is_ok());
    }
}
