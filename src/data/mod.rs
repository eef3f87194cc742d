//! Core data models for coinlens
//!
//! Types shared across the fetch/cache/derive pipeline: historical price
//! samples, the current-market snapshot, and the derived headline summary.

pub mod history;
pub mod market;
pub mod summary;

pub use history::{FetchedSeries, PriceHistoryService, SeriesSource};
pub use market::{MarketClient, MarketError};
pub use summary::{derive_summary, range_label, Summary, Trend};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single historical price sample, immutable once fetched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Sample time in epoch milliseconds
    pub timestamp_ms: i64,
    /// Price in the requested fiat currency
    pub price: f64,
}

/// Ordered price samples, ascending by timestamp, as returned by the
/// market API for one `(token, days, currency)` request
pub type PriceSeries = Vec<PricePoint>;

/// Current market state for a token: spot price and 24-hour change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Current price in the requested fiat currency
    pub current_price: f64,
    /// 24-hour price change, in percent (signed)
    pub change_24h_pct: f64,
    /// When this data was fetched
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    /// Converts a token balance into its fiat value
    pub fn convert_balance(&self, balance: f64) -> f64 {
        balance * self.current_price
    }

    /// Fiat change of a converted balance over the last 24 hours
    pub fn balance_change(&self, balance: f64) -> f64 {
        self.convert_balance(balance) * self.change_24h_pct / 100.0
    }
}
