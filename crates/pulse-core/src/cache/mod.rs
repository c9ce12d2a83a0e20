//! Time-bound cache of analysis results.
//!
//! Entries are keyed by the normalized URL and expire one hour after they were
//! written. Expiry is checked on read: a stale entry is deleted the moment a
//! lookup finds it, and nothing sweeps the store in the background.
//!
//! The cache fails open. A store that cannot be read, or an entry that no
//! longer decodes, is reported through `tracing` and treated as a miss.
//!
//! ```rust
//! use pulse_core::cache::{ExpiringCache, MemoryStore};
//!
//! let cache = ExpiringCache::new(MemoryStore::new());
//! assert!(cache.get("https://example.com/").is_none());
//! ```

mod store;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use store::{FileStore, KeyValueStore, MemoryStore};

use crate::{AnalysisResult, Error, Result};

/// How long an entry stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Prefix applied to every cache key.
pub const KEY_PREFIX: &str = "pagespeed_";

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time in milliseconds.
    fn now_millis(&self) -> i64;
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Start the clock at `millis`.
    #[must_use]
    pub const fn new(millis: i64) -> Self {
        Self {
            now: AtomicI64::new(millis),
        }
    }

    /// Jump to `millis`.
    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    /// Move forward by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// What gets serialized into the store for each key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// The cached analysis.
    pub result: AnalysisResult,
}

/// Result cache with a single fixed time-to-live.
pub struct ExpiringCache<S> {
    store: S,
    clock: Arc<dyn Clock>,
    ttl_ms: i64,
}

impl<S: KeyValueStore> ExpiringCache<S> {
    /// Wrap `store` using the system clock and [`DEFAULT_TTL`].
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            ttl_ms: duration_millis(DEFAULT_TTL),
        }
    }

    /// Replace the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the time-to-live.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = duration_millis(ttl);
        self
    }

    /// Time-to-live in milliseconds.
    pub const fn ttl_millis(&self) -> i64 {
        self.ttl_ms
    }

    /// The backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Storage key for a normalized URL.
    #[must_use]
    pub fn key_for(url: &str) -> String {
        format!("{KEY_PREFIX}{url}")
    }

    /// Return the cached result for `url` if it is still fresh.
    ///
    /// Stale and undecodable entries are removed as a side effect.
    pub fn get(&self, url: &str) -> Option<AnalysisResult> {
        let key = Self::key_for(url);

        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache unavailable, treating {} as a miss: {}", url, e);
                return None;
            },
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                let err = Error::CacheRead(format!("entry for {url} is not parseable: {e}"));
                warn!("{}", err);
                self.evict(&key);
                return None;
            },
        };

        let age = self.clock.now_millis().saturating_sub(entry.timestamp);
        if age > self.ttl_ms {
            debug!("Cache entry for {} expired ({} ms old)", url, age);
            self.evict(&key);
            return None;
        }

        debug!("Cache hit for {} ({} ms old)", url, age);
        Some(entry.result)
    }

    /// Store `result` for `url`, stamped with the current time.
    ///
    /// Write failures are logged and otherwise ignored.
    pub fn put(&self, url: &str, result: &AnalysisResult) {
        let key = Self::key_for(url);
        let entry = CacheEntry {
            timestamp: self.clock.now_millis(),
            result: result.clone(),
        };

        let written = serde_json::to_string(&entry)
            .map_err(Error::from)
            .and_then(|json| self.store.set(&key, &json));

        if let Err(e) = written {
            warn!("Failed to cache result for {}: {}", url, e);
        }
    }

    /// Remove every entry.
    pub fn clear(&self) -> Result<usize> {
        self.store.clear()
    }

    fn evict(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("Failed to evict cache entry {}: {}", key, e);
        }
    }
}

fn duration_millis(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Audit, CategoryScore, LighthouseResult};
    use tempfile::TempDir;

    const T0: i64 = 1_700_000_000_000;
    const URL: &str = "https://example.com/";

    fn sample_result() -> AnalysisResult {
        let mut lighthouse = LighthouseResult::default();
        lighthouse.categories.performance = Some(CategoryScore {
            title: Some("Performance".into()),
            score: Some(0.42),
        });
        lighthouse.audits.insert(
            "speed-index".into(),
            Audit {
                title: "Speed Index".into(),
                description: "How quickly content is visibly populated.".into(),
                score: Some(0.31),
                ..Audit::default()
            },
        );
        AnalysisResult {
            id: Some(URL.into()),
            lighthouse_result: lighthouse,
            loading_experience: None,
            origin_loading_experience: None,
            analysis_utc_timestamp: None,
        }
    }

    fn cache_at(clock: &Arc<ManualClock>) -> ExpiringCache<MemoryStore> {
        ExpiringCache::new(MemoryStore::new()).with_clock(clock.clone())
    }

    #[test]
    fn test_put_then_get_returns_same_value() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        let result = sample_result();

        cache.put(URL, &result);
        assert_eq!(cache.get(URL), Some(result));
    }

    #[test]
    fn test_entry_valid_at_exact_ttl() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        cache.put(URL, &sample_result());

        clock.set(T0 + cache.ttl_millis());
        assert!(cache.get(URL).is_some());
    }

    #[test]
    fn test_entry_expires_one_ms_after_ttl_and_is_removed() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        cache.put(URL, &sample_result());

        clock.set(T0 + 3_600_000 + 1);
        assert!(cache.get(URL).is_none());
        assert!(cache.store().is_empty(), "stale entry should be deleted");

        // Going back in time must not resurrect it
        clock.set(T0);
        assert!(cache.get(URL).is_none());
    }

    #[test]
    fn test_put_overwrites_and_restamps() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        cache.put(URL, &sample_result());

        clock.advance(3_000_000);
        let mut newer = sample_result();
        newer.id = Some("https://example.com/v2".into());
        cache.put(URL, &newer);

        clock.advance(3_000_000);
        assert_eq!(cache.get(URL), Some(newer));
    }

    #[test]
    fn test_corrupt_entry_is_a_miss_and_evicted() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        cache
            .store()
            .set(&ExpiringCache::<MemoryStore>::key_for(URL), "{not json")
            .unwrap();

        assert!(cache.get(URL).is_none());
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_keys_are_per_url() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        cache.put(URL, &sample_result());
        assert!(cache.get("https://other.example/").is_none());
    }

    #[test]
    fn test_custom_ttl() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock).with_ttl(Duration::from_secs(5));
        cache.put(URL, &sample_result());

        clock.advance(5_001);
        assert!(cache.get(URL).is_none());
    }

    #[test]
    fn test_file_backed_cache_survives_reopen() {
        let temp = TempDir::new().unwrap();
        let clock = Arc::new(ManualClock::new(T0));
        let result = sample_result();

        ExpiringCache::new(FileStore::new(temp.path()))
            .with_clock(clock.clone())
            .put(URL, &result);

        let reopened = ExpiringCache::new(FileStore::new(temp.path())).with_clock(clock);
        assert_eq!(reopened.get(URL), Some(result));
    }

    #[test]
    fn test_unreadable_store_fails_open() {
        let temp = TempDir::new().unwrap();
        // A regular file where the cache directory should be makes writes fail
        let blocker = temp.path().join("cache");
        std::fs::write(&blocker, "not a directory").unwrap();

        let cache = ExpiringCache::new(FileStore::new(&blocker));
        cache.put(URL, &sample_result());
        assert!(cache.get(URL).is_none());
    }

    #[test]
    fn test_stored_format_is_timestamp_and_result() {
        let clock = Arc::new(ManualClock::new(T0));
        let cache = cache_at(&clock);
        cache.put(URL, &sample_result());

        let raw = cache
            .store()
            .get(&ExpiringCache::<MemoryStore>::key_for(URL))
            .unwrap()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["timestamp"], T0);
        assert!(value["result"]["lighthouseResult"].is_object());
        assert_eq!(
            ExpiringCache::<MemoryStore>::key_for(URL),
            "pagespeed_https://example.com/"
        );
    }
}
