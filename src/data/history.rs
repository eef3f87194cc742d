//! Price history fetch pipeline: cache-or-network with bounded retry
//!
//! The service prefers a fresh cache entry over a network call, retries
//! rate-limited requests with exponential backoff, and falls back to a
//! stale cache entry when the API stays rate limited.

use std::time::Duration;

use crate::cache::CacheManager;
use crate::data::{MarketClient, MarketError, PriceSeries};

/// TTL for cached price series, in minutes
const SERIES_CACHE_TTL_MINUTES: u64 = 10;

/// Source of historical chart data, injectable so tests can script
/// responses without a network
#[allow(async_fn_in_trait)]
pub trait ChartSource {
    /// Fetch the price chart for `token` over `days`, quoted in `currency`
    async fn market_chart(
        &self,
        token: &str,
        days: u32,
        currency: &str,
    ) -> Result<PriceSeries, MarketError>;
}

impl ChartSource for MarketClient {
    async fn market_chart(
        &self,
        token: &str,
        days: u32,
        currency: &str,
    ) -> Result<PriceSeries, MarketError> {
        MarketClient::market_chart(self, token, days, currency).await
    }
}

/// Retry behavior for rate-limited requests
///
/// The delay doubles after each rate-limited attempt; after `max_attempts`
/// rate-limited responses the fetch gives up.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts before giving up
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(10),
        }
    }
}

/// Where a fetched series came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesSource {
    /// Served from a cache entry within its TTL, no network call made
    Cache,
    /// Fetched from the network and written through to the cache
    Network,
    /// Stale cache entry used as a fallback after retries were exhausted
    StaleCache,
}

/// A fetched series together with its provenance
#[derive(Debug, Clone)]
pub struct FetchedSeries {
    pub series: PriceSeries,
    pub source: SeriesSource,
}

/// Fetches price history, preferring cache over network
#[derive(Debug, Clone)]
pub struct PriceHistoryService<S> {
    source: S,
    cache: Option<CacheManager>,
    retry: RetryPolicy,
}

/// Cache key for a series request; the raw concatenation of the three
/// request parameters, so callers must pass canonical forms consistently
pub fn cache_key(token: &str, days: u32, currency: &str) -> String {
    format!("{}_{}_{}", token, days, currency)
}

impl<S: ChartSource> PriceHistoryService<S> {
    /// Creates a service around a chart source and an optional cache
    pub fn new(source: S, cache: Option<CacheManager>) -> Self {
        Self {
            source,
            cache,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy (used in tests)
    #[allow(dead_code)]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fetches the price series for `(token, days, currency)`
    ///
    /// A fresh cache entry short-circuits the network entirely. Otherwise
    /// the source is called, retrying on rate limits per the retry policy;
    /// a successful response is written through to the cache. When retries
    /// are exhausted a stale cache entry is returned instead if one exists.
    pub async fn fetch(
        &self,
        token: &str,
        days: u32,
        currency: &str,
    ) -> Result<FetchedSeries, MarketError> {
        self.fetch_with_interim(token, days, currency, |_| {}).await
    }

    /// Like [`fetch`](Self::fetch), but surfaces a stale cache entry to
    /// `on_interim` the first time the source reports a rate limit, so the
    /// caller can display something while the retry loop runs.
    pub async fn fetch_with_interim<F>(
        &self,
        token: &str,
        days: u32,
        currency: &str,
        mut on_interim: F,
    ) -> Result<FetchedSeries, MarketError>
    where
        F: FnMut(PriceSeries),
    {
        let key = cache_key(token, days, currency);

        if let Some(ref cache) = self.cache {
            if let Some(cached) = cache.read::<PriceSeries>(&key) {
                if !cached.is_expired {
                    return Ok(FetchedSeries {
                        series: cached.data,
                        source: SeriesSource::Cache,
                    });
                }
            }
        }

        let result = self.fetch_from_source(token, days, currency, &key, &mut on_interim).await;

        match result {
            Ok(series) => {
                // Write failures are non-fatal; the fetch still succeeded
                if let Some(ref cache) = self.cache {
                    let _ = cache.write(&key, &series, SERIES_CACHE_TTL_MINUTES);
                }
                Ok(FetchedSeries {
                    series,
                    source: SeriesSource::Network,
                })
            }
            Err(MarketError::RateLimited) => {
                // Stale fallback only applies to exhausted rate limits;
                // other failures surface to the user
                if let Some(ref cache) = self.cache {
                    if let Some(cached) = cache.read::<PriceSeries>(&key) {
                        return Ok(FetchedSeries {
                            series: cached.data,
                            source: SeriesSource::StaleCache,
                        });
                    }
                }
                Err(MarketError::RateLimited)
            }
            Err(e) => Err(e),
        }
    }

    /// Network fetch with bounded exponential backoff on rate limits
    async fn fetch_from_source<F>(
        &self,
        token: &str,
        days: u32,
        currency: &str,
        key: &str,
        on_interim: &mut F,
    ) -> Result<PriceSeries, MarketError>
    where
        F: FnMut(PriceSeries),
    {
        let mut delay = self.retry.initial_delay;
        let mut attempt = 0;

        loop {
            match self.source.market_chart(token, days, currency).await {
                Ok(series) => return Ok(series),
                Err(MarketError::RateLimited) => {
                    attempt += 1;
                    if attempt >= self.retry.max_attempts {
                        return Err(MarketError::RateLimited);
                    }
                    if attempt == 1 {
                        if let Some(ref cache) = self.cache {
                            if let Some(cached) = cache.read::<PriceSeries>(key) {
                                on_interim(cached.data);
                            }
                        }
                    }
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PricePoint;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn sample_series() -> PriceSeries {
        vec![
            PricePoint {
                timestamp_ms: 1_700_000_000_000,
                price: 100.0,
            },
            PricePoint {
                timestamp_ms: 1_700_003_600_000,
                price: 110.0,
            },
        ]
    }

    /// Chart source returning scripted responses and counting calls
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<PriceSeries, MarketError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<PriceSeries, MarketError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ChartSource for &ScriptedSource {
        async fn market_chart(
            &self,
            _token: &str,
            _days: u32,
            _currency: &str,
        ) -> Result<PriceSeries, MarketError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(MarketError::BadStatus(500)))
        }
    }

    fn temp_cache() -> (CacheManager, TempDir) {
        let dir = TempDir::new().expect("Failed to create temp directory");
        (CacheManager::with_dir(dir.path().to_path_buf()), dir)
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_hits_cache() {
        let (cache, _dir) = temp_cache();
        let source = ScriptedSource::new(vec![Ok(sample_series())]);
        let service = PriceHistoryService::new(&source, Some(cache));

        let first = service.fetch("ethereum", 1, "usd").await.unwrap();
        assert_eq!(first.source, SeriesSource::Network);

        let second = service.fetch("ethereum", 1, "usd").await.unwrap();
        assert_eq!(second.source, SeriesSource::Cache);
        assert_eq!(second.series, first.series, "Cached series is unchanged");
        assert_eq!(source.call_count(), 1, "At most one network call");
    }

    #[tokio::test]
    async fn test_expired_entry_forces_network_call() {
        let (cache, _dir) = temp_cache();
        // Pre-populate an already-expired entry for the same key
        cache
            .write(&cache_key("ethereum", 1, "usd"), &sample_series(), 0)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let fresh = vec![PricePoint {
            timestamp_ms: 1_700_010_000_000,
            price: 120.0,
        }];
        let source = ScriptedSource::new(vec![Ok(fresh.clone())]);
        let service = PriceHistoryService::new(&source, Some(cache));

        let result = service.fetch("ethereum", 1, "usd").await.unwrap();

        assert_eq!(source.call_count(), 1, "Stale entry must not skip the network");
        assert_eq!(result.source, SeriesSource::Network);
        assert_eq!(result.series, fresh);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_share_cache() {
        let (cache, _dir) = temp_cache();
        let source = ScriptedSource::new(vec![Ok(sample_series()), Ok(sample_series())]);
        let service = PriceHistoryService::new(&source, Some(cache));

        service.fetch("ethereum", 1, "usd").await.unwrap();
        service.fetch("ethereum", 30, "usd").await.unwrap();

        assert_eq!(source.call_count(), 2, "Each key fetches independently");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retries_then_succeeds() {
        let (cache, _dir) = temp_cache();
        let source = ScriptedSource::new(vec![
            Err(MarketError::RateLimited),
            Ok(sample_series()),
        ]);
        let service = PriceHistoryService::new(&source, Some(cache));

        let result = service.fetch("ethereum", 1, "usd").await.unwrap();

        assert_eq!(source.call_count(), 2);
        assert_eq!(result.source, SeriesSource::Network);
        assert_eq!(result.series, sample_series());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_attempt_writes_no_cache_entry() {
        let (cache, _dir) = temp_cache();
        let probe = cache.clone();
        let source = ScriptedSource::new(vec![
            Err(MarketError::RateLimited),
            Ok(sample_series()),
        ]);
        let service = PriceHistoryService::new(&source, Some(cache));

        service.fetch("ethereum", 1, "usd").await.unwrap();

        let cached = probe
            .read::<PriceSeries>(&cache_key("ethereum", 1, "usd"))
            .expect("Only the successful response should be cached");
        assert_eq!(cached.data, sample_series());
        assert!(!cached.is_expired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fall_back_to_stale_cache() {
        let (cache, _dir) = temp_cache();
        cache
            .write(&cache_key("ethereum", 1, "usd"), &sample_series(), 0)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let source = ScriptedSource::new(vec![
            Err(MarketError::RateLimited),
            Err(MarketError::RateLimited),
            Err(MarketError::RateLimited),
            Err(MarketError::RateLimited),
        ]);
        let service = PriceHistoryService::new(&source, Some(cache));

        let result = service.fetch("ethereum", 1, "usd").await.unwrap();

        assert_eq!(result.source, SeriesSource::StaleCache);
        assert_eq!(result.series, sample_series());
        assert_eq!(source.call_count(), 4, "Retries are bounded");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_without_cache_surface_rate_limit() {
        let source = ScriptedSource::new(vec![
            Err(MarketError::RateLimited),
            Err(MarketError::RateLimited),
            Err(MarketError::RateLimited),
            Err(MarketError::RateLimited),
        ]);
        let service = PriceHistoryService::new(&source, None);

        let result = service.fetch("ethereum", 1, "usd").await;

        assert!(matches!(result, Err(MarketError::RateLimited)));
        assert_eq!(source.call_count(), 4);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let source = ScriptedSource::new(vec![Err(MarketError::BadStatus(500))]);
        let service = PriceHistoryService::new(&source, None);

        let result = service.fetch("ethereum", 1, "usd").await;

        assert!(matches!(result, Err(MarketError::BadStatus(500))));
        assert_eq!(source.call_count(), 1, "Non-429 failures are terminal");
    }

    #[tokio::test(start_paused = true)]
    async fn test_interim_surfaces_stale_cache_during_retry() {
        let (cache, _dir) = temp_cache();
        cache
            .write(&cache_key("ethereum", 1, "usd"), &sample_series(), 0)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));

        let fresh = vec![PricePoint {
            timestamp_ms: 1_700_010_000_000,
            price: 130.0,
        }];
        let source = ScriptedSource::new(vec![
            Err(MarketError::RateLimited),
            Ok(fresh.clone()),
        ]);
        let service = PriceHistoryService::new(&source, Some(cache));

        let mut interim = Vec::new();
        let result = service
            .fetch_with_interim("ethereum", 1, "usd", |series| interim.push(series))
            .await
            .unwrap();

        assert_eq!(interim.len(), 1, "Stale entry surfaced once while waiting");
        assert_eq!(interim[0], sample_series());
        assert_eq!(result.series, fresh, "Final result comes from the retry");
    }

    #[test]
    fn test_cache_key_concatenates_parameters() {
        assert_eq!(cache_key("ethereum", 30, "usd"), "ethereum_30_usd");
    }
}
