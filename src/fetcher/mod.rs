pub mod quote_summary;

use crate::config::FetcherConfig;
use crate::error::{Error, Result};
use crate::models::{CompanyProfile, PriceHistory, PricePoint};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use self::quote_summary::{QuoteSummaryEnvelope, MODULES};

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable market-data source abstraction.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// One year of daily closes for the symbol, in provider order.
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory>;

    /// Company metadata record for the symbol.
    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile>;
}

// ── Yahoo source ──────────────────────────────────────────────────────────────

/// Fetches history through the yahoo_finance_api connector and metadata
/// through the quote-summary JSON endpoint. No retries, no caching: a
/// failed lookup surfaces as [`Error::Fetch`] and a re-run re-fetches.
pub struct YahooSource {
    http: reqwest::Client,
    config: FetcherConfig,
}

impl YahooSource {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn quote_summary_url(&self, symbol: &str) -> String {
        format!(
            "{}/{}",
            self.config.quote_summary_url.trim_end_matches('/'),
            symbol
        )
    }
}

/// Provider timestamps are unix seconds; out-of-range values are dropped.
pub fn timestamp_to_date(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

#[async_trait]
impl MarketDataSource for YahooSource {
    async fn fetch_price_history(&self, symbol: &str) -> Result<PriceHistory> {
        let provider =
            yahoo::YahooConnector::new().map_err(|e| Error::fetch(symbol, e))?;

        // Fixed trailing window: one year of daily bars, ending now.
        let end = Utc::now();
        let start = end - chrono::Duration::days(365);
        let start_odt = OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| Error::fetch(symbol, format!("invalid start timestamp: {e}")))?;
        let end_odt = OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| Error::fetch(symbol, format!("invalid end timestamp: {e}")))?;

        debug!("{}: fetching 1y of daily quotes", symbol);
        let response = provider
            .get_quote_history(symbol, start_odt, end_odt)
            .await
            .map_err(|e| Error::fetch(symbol, e))?;

        let quotes = response.quotes().map_err(|e| Error::fetch(symbol, e))?;

        let mut points = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            match timestamp_to_date(quote.timestamp as i64) {
                Some(date) => points.push(PricePoint {
                    date,
                    close: quote.close,
                }),
                None => warn!("{}: dropping quote with bad timestamp {}", symbol, quote.timestamp),
            }
        }

        debug!("{}: {} price points", symbol, points.len());
        Ok(PriceHistory::new(symbol, points))
    }

    async fn fetch_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let url = self.quote_summary_url(symbol);
        debug!("GET {} (modules: {})", url, MODULES);

        let response = self
            .http
            .get(&url)
            .query(&[("modules", MODULES)])
            .send()
            .await
            .map_err(|e| Error::fetch(symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(symbol, format!("HTTP {status}")));
        }

        let envelope: QuoteSummaryEnvelope = response
            .json()
            .await
            .map_err(|e| Error::fetch(symbol, e))?;

        if let Some(err) = envelope.quote_summary.error {
            if !err.is_null() {
                return Err(Error::fetch(symbol, err));
            }
        }

        let result = envelope
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
            .ok_or_else(|| Error::fetch(symbol, "empty quote-summary result"))?;

        Ok(result.into_profile(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_date() {
        // 2024-06-03 13:30:00 UTC
        assert_eq!(
            timestamp_to_date(1_717_421_400),
            NaiveDate::from_ymd_opt(2024, 6, 3)
        );
        assert_eq!(timestamp_to_date(0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(timestamp_to_date(i64::MAX), None);
    }

    #[test]
    fn test_quote_summary_url() {
        let source = YahooSource::new(&crate::config::AppConfig::default().fetcher).unwrap();
        assert_eq!(
            source.quote_summary_url("NEE"),
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/NEE"
        );
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_price_history_live() {
        let source = YahooSource::new(&crate::config::AppConfig::default().fetcher).unwrap();
        let history = source.fetch_price_history("AAPL").await.unwrap();
        assert!(!history.is_empty());
        assert!(history.latest_close().unwrap() > 0.0);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_profile_live() {
        let source = YahooSource::new(&crate::config::AppConfig::default().fetcher).unwrap();
        let profile = source.fetch_profile("AAPL").await.unwrap();
        assert!(profile.name.is_some());
    }
}
