//! Per-validator result cache with a time-to-live

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::result::ValidationResult;

/// Default lifetime of a cached result
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug)]
struct CacheEntry {
    stored_at: Instant,
    result: Arc<ValidationResult>,
}

/// Results keyed by `ValidationContext::cache_key`.
///
/// Each validator owns its own cache, so validators never contend on a
/// shared map.
#[derive(Debug)]
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    /// Create a cache with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fetch a live entry; expired entries are evicted on access
    pub fn get(&self, key: &str) -> Option<Arc<ValidationResult>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => Some(Arc::clone(&entry.result)),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a result, dropping every entry that has already expired
    pub fn insert(&self, key: impl Into<String>, result: Arc<ValidationResult>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key.into(),
            CacheEntry {
                stored_at: Instant::now(),
                result,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}
