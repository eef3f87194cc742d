//! CoinGecko market API client
//!
//! Fetches historical chart data and the current-market snapshot for a
//! token. Both endpoints are public and rate limited; HTTP 429 is mapped to
//! its own error variant so the history service can retry it.

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

use super::{MarketSnapshot, PricePoint, PriceSeries};

/// Base URL for the CoinGecko API
const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Errors that can occur when talking to the market API
#[derive(Debug, Error)]
pub enum MarketError {
    /// The API is rate limiting us (HTTP 429); retryable
    #[error("Rate limited by the market API")]
    RateLimited,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Non-success HTTP status other than 429
    #[error("Market API returned HTTP {0}")]
    BadStatus(u16),

    /// Missing expected field in response
    #[error("Missing expected field in response: {0}")]
    MissingField(String),
}

/// Client for the CoinGecko market-data API
#[derive(Debug, Clone)]
pub struct MarketClient {
    client: Client,
    base_url: String,
}

impl Default for MarketClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketClient {
    /// Create a new MarketClient with default settings
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: COINGECKO_BASE_URL.to_string(),
        }
    }

    /// Create a MarketClient pointed at a custom base URL (used in tests)
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the historical price chart for a token
    ///
    /// # Arguments
    /// * `token` - Token identifier (e.g. "ethereum")
    /// * `days` - Lookback duration in days
    /// * `currency` - Fiat currency the prices are quoted in (e.g. "usd")
    ///
    /// # Returns
    /// * `Ok(PriceSeries)` - Samples ascending by timestamp
    /// * `Err(MarketError)` - If the request, status, or parsing fails
    pub async fn market_chart(
        &self,
        token: &str,
        days: u32,
        currency: &str,
    ) -> Result<PriceSeries, MarketError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, token);
        let days = days.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("vs_currency", currency), ("days", days.as_str())])
            .send()
            .await?;

        let text = check_status(response.status())
            .map(|_| response)?
            .text()
            .await?;
        let raw: MarketChartResponse = serde_json::from_str(&text)?;

        Ok(parse_price_list(raw.prices))
    }

    /// Fetch the current price and 24-hour change for a token
    pub async fn coin_snapshot(
        &self,
        token: &str,
        currency: &str,
    ) -> Result<MarketSnapshot, MarketError> {
        let url = format!("{}/coins/{}?localization=false", self.base_url, token);
        let response = self.client.get(&url).send().await?;

        let text = check_status(response.status())
            .map(|_| response)?
            .text()
            .await?;
        let raw: CoinResponse = serde_json::from_str(&text)?;

        parse_snapshot(raw, currency)
    }
}

/// Maps an HTTP status to the market error taxonomy
fn check_status(status: StatusCode) -> Result<(), MarketError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Err(MarketError::RateLimited)
    } else if !status.is_success() {
        Err(MarketError::BadStatus(status.as_u16()))
    } else {
        Ok(())
    }
}

/// Converts the API's `[[timestamp, price], ...]` pairs into PricePoints
fn parse_price_list(prices: Vec<(i64, f64)>) -> PriceSeries {
    prices
        .into_iter()
        .map(|(timestamp_ms, price)| PricePoint {
            timestamp_ms,
            price,
        })
        .collect()
}

/// Extracts the snapshot fields for the requested currency
fn parse_snapshot(raw: CoinResponse, currency: &str) -> Result<MarketSnapshot, MarketError> {
    let current_price = raw
        .market_data
        .current_price
        .get(currency)
        .copied()
        .ok_or_else(|| MarketError::MissingField(format!("current_price.{}", currency)))?;

    let change_24h_pct = raw
        .market_data
        .price_change_percentage_24h_in_currency
        .get(currency)
        .copied()
        .ok_or_else(|| {
            MarketError::MissingField(format!(
                "price_change_percentage_24h_in_currency.{}",
                currency
            ))
        })?;

    Ok(MarketSnapshot {
        current_price,
        change_24h_pct,
        fetched_at: Utc::now(),
    })
}

/// Response shape of `GET /coins/{token}/market_chart`
#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(i64, f64)>,
}

/// Response shape of `GET /coins/{token}?localization=false`
#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: HashMap<String, f64>,
    price_change_percentage_24h_in_currency: HashMap<String, f64>,
}
