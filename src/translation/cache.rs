/*!
 * Translation caching functionality.
 *
 * Content-addressed store mapping (subtitle content, source language,
 * target language) to a previously rendered translated document, so an
 * identical request within the TTL window never re-invokes the model.
 */

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

/// Time source for TTL bookkeeping
///
/// The cache is handed a clock at construction so tests can drive expiry
/// deterministically instead of sleeping.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall clock used outside of tests
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One complete translated document plus its insertion time
struct CacheEntry {
    /// Fully rendered translated document text
    document: String,

    /// When the entry was written
    inserted_at: Instant,
}

/// Translation cache for storing and retrieving translated documents
pub struct TranslationCache {
    /// Internal cache storage, shared across clones
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,

    /// Entry lifetime; expired entries are evicted lazily on lookup
    ttl: Duration,

    /// Time source
    clock: Arc<dyn Clock>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled; a disabled cache is a pass-through miss
    enabled: bool,
}

impl TranslationCache {
    /// Default entry lifetime
    pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

    /// Create a new translation cache with the default TTL
    pub fn new(enabled: bool) -> Self {
        Self::with_ttl(enabled, Self::DEFAULT_TTL)
    }

    /// Create a new translation cache with a custom TTL
    pub fn with_ttl(enabled: bool, ttl: Duration) -> Self {
        Self::with_clock(enabled, ttl, Arc::new(SystemClock))
    }

    /// Create a new translation cache with a custom TTL and time source
    pub fn with_clock(enabled: bool, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Derive the cache key for a (content, source, target) triple
    ///
    /// SHA-256 over the raw content bytes and both language codes. The hash
    /// only deduplicates; collision resistance is not load-bearing here.
    pub fn key(content: &str, source_language: &str, target_language: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hasher.update(source_language.as_bytes());
        hasher.update(target_language.as_bytes());

        let digest = hasher.finalize();
        let mut key = String::with_capacity(digest.len() * 2);
        for byte in digest {
            let _ = write!(key, "{:02x}", byte);
        }
        key
    }

    /// Get a translated document from the cache
    ///
    /// An entry past its TTL is removed and reported as a miss, so nothing
    /// is observable after expiry.
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let now = self.clock.now();
        let mut expired = false;

        {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                    *self.hits.write() += 1;
                    debug!("Cache hit for key {}", &key[..12.min(key.len())]);
                    return Some(entry.document.clone());
                }
                Some(_) => expired = true,
                None => {}
            }
        }

        if expired {
            self.entries.write().remove(key);
            debug!("Cache entry expired for key {}", &key[..12.min(key.len())]);
        }

        *self.misses.write() += 1;
        None
    }

    /// Store a translated document in the cache; the TTL starts now
    pub fn put(&self, key: &str, document: &str) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            document: document.to_string(),
            inserted_at: self.clock.now(),
        };

        self.entries.write().insert(key.to_string(), entry);
        debug!("Cached translation under key {}", &key[..12.min(key.len())]);
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache and reset the counters
    pub fn clear(&self) {
        self.entries.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;
        debug!("Translation cache cleared");
    }

    /// Get the number of entries in the cache, including not-yet-evicted
    /// expired ones
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for TranslationCache {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
            clock: self.clock.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            enabled: self.enabled,
        }
    }
}
