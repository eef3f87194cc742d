//! Disk-backed cache for market API responses
//!
//! Fetched price data is cached so that repeated requests within the TTL
//! window never hit the network, and stale data can still be shown when the
//! API is rate limiting us.

pub mod manager;

pub use manager::{CacheManager, CachedData};
