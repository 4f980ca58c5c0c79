//! Bounded cache of recovered transaction signers.
//!
//! Public-key recovery is the most expensive step of validating a
//! transaction, and the same transaction gets validated many times: once on
//! arrival, again when a block proposal includes it, again on import. The
//! cache maps a fingerprint of the *full* encoding (signature included) to
//! the recovered address, so a hit is only possible for byte-identical
//! transactions.
//!
//! ## Design
//!
//! - [`SignerCache`] is the seam: `get` + `insert`, `Send + Sync`. Tests and
//!   embedders can inject their own, or [`NoopSignerCache`] to disable caching.
//! - [`LruSignerCache`] wraps `lru::LruCache` in a `parking_lot::Mutex`. The
//!   critical section is a hash-map probe; recovery itself happens outside
//!   the lock.
//! - [`shared_signer_cache`] is the lazily created process-wide default used
//!   by [`super::Transaction::signer`].
//! - Only successful recoveries are ever inserted.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::OnceLock;

use alloy_primitives::{Address, B256};
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::SignerCacheConfig;

/// Capability to remember recovered signers by transaction fingerprint.
pub trait SignerCache: Send + Sync {
    /// Returns the signer recorded for `fingerprint`, marking it as recently
    /// used.
    fn get(&self, fingerprint: &B256) -> Option<Address>;

    /// Records a successfully recovered signer.
    fn insert(&self, fingerprint: B256, signer: Address);
}

// ---------------------------------------------------------------------------
// LruSignerCache
// ---------------------------------------------------------------------------

/// Fixed-capacity, least-recently-used signer cache.
pub struct LruSignerCache {
    inner: Mutex<LruCache<B256, Address>>,
}

impl LruSignerCache {
    /// Creates a cache holding at most `config.capacity` entries (minimum 1).
    pub fn new(config: SignerCacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Shorthand for a cache of the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(SignerCacheConfig { capacity })
    }

    /// Number of cached signers.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.inner.lock().cap().get()
    }

    /// `true` if `fingerprint` is cached. Does not touch recency.
    pub fn contains(&self, fingerprint: &B256) -> bool {
        self.inner.lock().contains(fingerprint)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for LruSignerCache {
    fn default() -> Self {
        Self::new(SignerCacheConfig::default())
    }
}

impl SignerCache for LruSignerCache {
    fn get(&self, fingerprint: &B256) -> Option<Address> {
        self.inner.lock().get(fingerprint).copied()
    }

    fn insert(&self, fingerprint: B256, signer: Address) {
        self.inner.lock().put(fingerprint, signer);
    }
}

impl fmt::Debug for LruSignerCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("LruSignerCache")
            .field("len", &cache.len())
            .field("capacity", &cache.cap())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NoopSignerCache
// ---------------------------------------------------------------------------

/// A cache that never remembers anything. Every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSignerCache;

impl SignerCache for NoopSignerCache {
    fn get(&self, _fingerprint: &B256) -> Option<Address> {
        None
    }

    fn insert(&self, _fingerprint: B256, _signer: Address) {}
}

// ---------------------------------------------------------------------------
// Process-wide default
// ---------------------------------------------------------------------------

static SHARED: OnceLock<LruSignerCache> = OnceLock::new();

/// The process-wide cache behind [`super::Transaction::signer`], created on
/// first use with [`SignerCacheConfig::default`].
pub fn shared_signer_cache() -> &'static LruSignerCache {
    SHARED.get_or_init(LruSignerCache::default)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
