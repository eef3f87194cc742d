//! Command-line interface for coinlens
//!
//! Parses the token, fiat currency, optional wallet balance, and initial
//! chart range from CLI arguments using clap.

use clap::Parser;
use thiserror::Error;

use crate::range::RANGE_TABS;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified range label is not one of the fixed tab set
    #[error("Invalid range: '{0}'. Valid ranges: 1d, 3d, 1m, 6m, 1y, max")]
    InvalidRange(String),

    /// Balance must be a non-negative amount
    #[error("Invalid balance: '{0}'. Balance must be a non-negative number")]
    InvalidBalance(f64),
}

/// coinlens - token prices, balance conversion, and history charts in the terminal
#[derive(Parser, Debug)]
#[command(name = "coinlens")]
#[command(about = "Terminal dashboard for token prices and historical charts")]
#[command(version)]
pub struct Cli {
    /// Token identifier to track (CoinGecko id)
    #[arg(long, default_value = "ethereum")]
    pub token: String,

    /// Fiat currency prices are quoted in
    #[arg(long, default_value = "usd")]
    pub currency: String,

    /// Wallet balance in the token's native unit, shown converted to fiat
    #[arg(long)]
    pub balance: Option<f64>,

    /// Initial chart range (1d, 3d, 1m, 6m, 1y, max)
    #[arg(long, value_name = "RANGE")]
    pub range: Option<String>,

    /// Skip the on-disk response cache entirely
    #[arg(long)]
    pub no_cache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Token identifier to track
    pub token: String,
    /// Fiat currency, lowercased for API query parameters
    pub currency: String,
    /// Optional wallet balance in native units
    pub balance: Option<f64>,
    /// Initial range tab label
    pub initial_range: &'static str,
    /// Whether the response cache is enabled
    pub use_cache: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            token: "ethereum".to_string(),
            currency: "usd".to_string(),
            balance: None,
            initial_range: RANGE_TABS[0].id,
            use_cache: true,
        }
    }
}

impl StartupConfig {
    /// Validates parsed CLI arguments into a startup configuration
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_range = match &cli.range {
            None => RANGE_TABS[0].id,
            Some(label) => parse_range_arg(label)?,
        };

        if let Some(balance) = cli.balance {
            if !balance.is_finite() || balance < 0.0 {
                return Err(CliError::InvalidBalance(balance));
            }
        }

        Ok(Self {
            token: cli.token.to_lowercase(),
            currency: cli.currency.to_lowercase(),
            balance: cli.balance,
            initial_range,
            use_cache: !cli.no_cache,
        })
    }
}

/// Resolves a range label against the fixed tab set
pub fn parse_range_arg(label: &str) -> Result<&'static str, CliError> {
    RANGE_TABS
        .iter()
        .find(|tab| tab.id == label.to_lowercase())
        .map(|tab| tab.id)
        .ok_or_else(|| CliError::InvalidRange(label.to_string()))
}
