//! Report caching, injected into the pipeline by the caller.
//!
//! Reports are keyed by the graph's content hash plus the configuration
//! fingerprint, so any change to either input misses the cache. The engine
//! never holds a cache of its own; callers pass one to [`crate::analyze`]
//! or pass `None`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pipeline::AnalysisReport;

/// Cache key derived from graph content and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn new(content_hash: &str, config_fingerprint: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(content_hash.as_bytes());
        hasher.update(b"\0");
        hasher.update(config_fingerprint.as_bytes());
        Self(format!("blake3:{}", hasher.finalize().to_hex()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for finished reports.
///
/// Implementations must be safe to share across worker threads; each
/// analysis run still operates on its own graph.
pub trait ReportCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisReport>>;

    fn put(&self, key: CacheKey, report: Arc<AnalysisReport>);

    /// Drop one entry. Returns whether it was present.
    fn invalidate(&self, key: &CacheKey) -> bool;
}

#[derive(Debug)]
struct Entry {
    report: Arc<AnalysisReport>,
    stored_at: Instant,
}

/// In-memory [`ReportCache`] whose entries expire after a fixed TTL.
///
/// Expired entries are never returned; they are removed lazily on lookup
/// or eagerly by [`TtlCache::purge_expired`].
#[derive(Debug)]
pub struct TtlCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl TtlCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry>> {
        // Entries are replaced whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lookup as of `now`.
    #[must_use]
    pub fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Arc<AnalysisReport>> {
        let mut entries = self.lock();
        let fresh = entries
            .get(key)
            .map(|entry| now.saturating_duration_since(entry.stored_at) < self.ttl)?;
        if fresh {
            entries.get(key).map(|entry| Arc::clone(&entry.report))
        } else {
            debug!(%key, "cache entry expired");
            entries.remove(key);
            None
        }
    }

    /// Insert as of `now`, replacing any previous entry.
    pub fn put_at(&self, key: CacheKey, report: Arc<AnalysisReport>, now: Instant) {
        self.lock().insert(
            key,
            Entry {
                report,
                stored_at: now,
            },
        );
    }

    /// Remove every entry older than the TTL as of `now`. Returns the
    /// number removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl ReportCache for TtlCache {
    fn get(&self, key: &CacheKey) -> Option<Arc<AnalysisReport>> {
        self.get_at(key, Instant::now())
    }

    fn put(&self, key: CacheKey, report: Arc<AnalysisReport>) {
        self.put_at(key, report, Instant::now());
    }

    fn invalidate(&self, key: &CacheKey) -> bool {
        self.lock().remove(key).is_some()
    }
}
