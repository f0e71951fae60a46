//! Timed-trading HTTP provider.
//!
//! Two read-only endpoints: the ticker universe and the per-ticker trail.
//! One blocking request at a time and no retries: a failed trail fetch is the
//! caller's skip, a failed universe fetch is the caller's fatal error.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use tracing::debug;

use super::provider::{DataError, DataSource, TrailProvider};
use super::wire::{parse_trail, parse_universe, RawTrailPoint};

/// Default service endpoint, overridable with `API_BASE`.
pub const DEFAULT_API_BASE: &str = "https://timed-trading-ingest.shashant.workers.dev";

/// HTTP trail provider.
pub struct TimedApiProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl TimedApiProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn universe_url(&self) -> String {
        format!("{}/timed/tickers", self.base_url)
    }

    fn trail_url(&self) -> String {
        format!("{}/timed/trail", self.base_url)
    }

    fn get_text(&self, url: &str, query: &[(&str, String)]) -> Result<String, DataError> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: resp.url().to_string(),
            });
        }

        resp.text()
            .map_err(|e| DataError::ResponseFormatChanged(format!("failed to read body: {e}")))
    }
}

impl TrailProvider for TimedApiProvider {
    fn name(&self) -> &str {
        "timed_api"
    }

    fn source(&self) -> DataSource {
        DataSource::TimedApi
    }

    fn fetch_universe(&self) -> Result<Vec<String>, DataError> {
        let body = self.get_text(&self.universe_url(), &[])?;
        parse_universe(&body)
    }

    fn fetch_trail(
        &self,
        ticker: &str,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<RawTrailPoint>, DataError> {
        let query = [
            ("ticker", ticker.to_string()),
            ("since", since_ms.to_string()),
            ("limit", limit.to_string()),
        ];
        let body = self.get_text(&self.trail_url(), &query)?;
        let trail = parse_trail(&body)?;
        debug!(ticker, records = trail.len(), "fetched trail");
        Ok(trail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let p = TimedApiProvider::new("https://example.test/").unwrap();
        assert_eq!(p.base_url(), "https://example.test");
        assert_eq!(p.universe_url(), "https://example.test/timed/tickers");
        assert_eq!(p.trail_url(), "https://example.test/timed/trail");
    }

    #[test]
    fn unreachable_host_is_a_network_error() {
        // Port 9 (discard) on localhost is closed in any sane test environment.
        let p = TimedApiProvider::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(
            p.fetch_trail("AAPL", 0, 10),
            Err(DataError::NetworkUnreachable(_))
        ));
    }
}
