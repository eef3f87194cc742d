//! Cache manager persisting market API responses to disk
//!
//! Stores serialized data as JSON files with expiry timestamps. Expired
//! entries are still readable (flagged as expired) so the UI can fall back
//! to stale data while the market API is rate limiting.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// On-disk envelope around a cached value
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// When the entry stops being fresh
    expires_at: DateTime<Utc>,
}

/// Result of a cache read, including freshness metadata
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    #[allow(dead_code)]
    pub cached_at: DateTime<Utc>,
    /// Whether the entry is past its TTL
    pub is_expired: bool,
}

/// Reads and writes cached values under an XDG-compliant cache directory
///
/// Entries live as individual JSON files (`~/.cache/coinlens/` on Linux).
/// An expired entry is returned with `is_expired = true` rather than
/// dropped, so callers can choose stale fallback over showing nothing.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager rooted at the platform cache directory
    ///
    /// Returns `None` if no cache directory can be determined (e.g. no home
    /// directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "coinlens")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a CacheManager rooted at a custom directory (used in tests)
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a value under `key` with a TTL in minutes, overwriting any
    /// previous entry for that key
    ///
    /// Callers treat write failures as non-fatal: a fetch that cannot be
    /// cached is still a successful fetch.
    pub fn write<T: Serialize>(
        &self,
        key: &str,
        data: &T,
        ttl_minutes: u64,
    ) -> std::io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + Duration::minutes(ttl_minutes as i64),
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` when the entry is missing or unparseable. A present
    /// but expired entry comes back with `is_expired = true`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        let is_expired = Utc::now() > entry.expires_at;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired,
        })
    }
}
