//! The AST and DFA caches (`spec.md` §5/§6): `get/put/invalidate`, idempotent
//! writes, and a recoverable `CacheError` contract -- backend failures are
//! logged and treated as misses, never surfaced to callers.
//!
//! Grounded on `perl-workspace-index`'s `workspace::cache` bounded-cache
//! shape (get/insert/remove/clear plus stats), backed here by
//! `parking_lot::Mutex` so a `Pipeline` can be shared across threads, and
//! keyed with the teacher's own content-hash approach in
//! `pkg/crypto/src/sha256.rs` (substituted with the published `sha2` crate).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use crate::error::RegexRayError;
use crate::pattern::Flags;

/// `generateKey(pattern) -> string` (`spec.md` §6): content hash of the raw
/// source, stable across processes.
pub fn generate_key(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The DFA cache's key contract (`spec.md` §4.8): `hash(body,
/// effective_flags_excluding_useless)`. Callers strip useless flags (per the
/// lint engine's verdict) before calling this -- this function just folds
/// whatever flags it's given into the hash.
pub fn dfa_cache_key(body: &str, effective_flags: Flags) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hasher.update(effective_flags.bits().to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// A cache backend: the external contract hides filesystem/in-memory/
/// external-pool distinctions (`spec.md` §5). Implementations may fail with
/// `RegexRayError::Cache`; the core never lets that escape a `Cache::get`/
/// `put` call.
pub trait CacheBackend<V>: Send + Sync {
    fn get(&self, key: &str) -> std::result::Result<Option<V>, RegexRayError>;
    fn put(&self, key: &str, value: V) -> std::result::Result<(), RegexRayError>;
    fn invalidate(&self, key: Option<&str>) -> std::result::Result<(), RegexRayError>;
}

/// The default backend: a process-wide, mutex-guarded map. Writes are
/// idempotent -- `put(k, v)` followed by `put(k, v')` with `v' == v` is an
/// observable no-op (no stat is bumped on an unchanged value).
pub struct InMemoryBackend<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> InMemoryBackend<V> {
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

impl<V> Default for InMemoryBackend<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + PartialEq + Send + Sync> CacheBackend<V> for InMemoryBackend<V> {
    fn get(&self, key: &str) -> std::result::Result<Option<V>, RegexRayError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn put(&self, key: &str, value: V) -> std::result::Result<(), RegexRayError> {
        let mut entries = self.entries.lock();
        if entries.get(key) != Some(&value) {
            entries.insert(key.to_owned(), value);
        }
        Ok(())
    }

    fn invalidate(&self, key: Option<&str>) -> std::result::Result<(), RegexRayError> {
        let mut entries = self.entries.lock();
        match key {
            Some(k) => {
                entries.remove(k);
            }
            None => entries.clear(),
        }
        Ok(())
    }
}

/// A backend that never stores anything: every `get` misses. Matches
/// `SPEC_FULL.md`'s "null backend for tests" cache adapter.
pub struct NullBackend;

impl<V> CacheBackend<V> for NullBackend {
    fn get(&self, _key: &str) -> std::result::Result<Option<V>, RegexRayError> {
        Ok(None)
    }
    fn put(&self, _key: &str, _value: V) -> std::result::Result<(), RegexRayError> {
        Ok(())
    }
    fn invalidate(&self, _key: Option<&str>) -> std::result::Result<(), RegexRayError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct Cache<V> {
    backend: Box<dyn CacheBackend<V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone + PartialEq + Send + Sync + 'static> Cache<V> {
    pub fn new(backend: Box<dyn CacheBackend<V>>) -> Self {
        Self { backend, hits: AtomicU64::new(0), misses: AtomicU64::new(0) }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(InMemoryBackend::new()))
    }

    pub fn null() -> Self {
        Self::new(Box::new(NullBackend))
    }

    /// Never fails: a backend error is logged and treated as a miss, per
    /// `spec.md` §7's `CacheError` recoverability contract.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.backend.get(key) {
            Ok(Some(v)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(v)
            }
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, key, "cache backend read failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn put(&self, key: &str, value: V) {
        if let Err(e) = self.backend.put(key, value) {
            tracing::warn!(error = %e, key, "cache backend write failed, dropping entry");
        }
    }

    pub fn invalidate(&self, key: Option<&str>) {
        if let Err(e) = self.backend.invalidate(key) {
            tracing::warn!(error = %e, "cache backend invalidate failed");
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
