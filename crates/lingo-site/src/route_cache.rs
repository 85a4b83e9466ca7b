//! Route map cache keyed by language and tree fingerprint.
//!
//! Two layers sit in front of a build:
//! - A per-process memo of `Arc<RouteMap>` per language
//! - A persistent [`CacheBucket`] (`route-maps`), keyed by language with the
//!   fingerprint as etag
//!
//! An entry is only served while its fingerprint equals the tree's current
//! one. Builds are serialized with double-checked locking, so concurrent
//! misses on the same key build once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use lingo_cache::{Cache, CacheBucket, CacheBucketExt};

use crate::route_map::RouteMap;
use crate::tree::Fingerprint;

/// Bucket name for persisted route maps.
pub const ROUTE_MAPS_BUCKET: &str = "route-maps";

/// Counters describing how lookups were served.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the in-process memo.
    pub hits: u64,
    /// Lookups that ran the build function.
    pub builds: u64,
    /// Lookups served from the persistent store.
    pub persisted_hits: u64,
}

struct CacheEntry {
    fingerprint: Fingerprint,
    map: Arc<RouteMap>,
}

/// One route map per language, rebuilt when the tree changes.
pub struct RouteCache {
    bucket: Box<dyn CacheBucket>,
    memo: RwLock<HashMap<String, CacheEntry>>,
    build_lock: Mutex<()>,
    hits: AtomicU64,
    builds: AtomicU64,
    persisted_hits: AtomicU64,
}

impl RouteCache {
    /// Create a cache persisting through the `route-maps` bucket of `cache`.
    #[must_use]
    pub fn new(cache: &dyn Cache) -> Self {
        Self {
            bucket: cache.bucket(ROUTE_MAPS_BUCKET),
            memo: RwLock::new(HashMap::new()),
            build_lock: Mutex::new(()),
            hits: AtomicU64::new(0),
            builds: AtomicU64::new(0),
            persisted_hits: AtomicU64::new(0),
        }
    }

    /// Return the route map of `language`, building it on a miss.
    ///
    /// `fingerprint` is read on entry and again once the build lock is held,
    /// so a caller that waited behind a rebuild works with the tree as it is
    /// now. When it returns `None` the map is built and returned without
    /// being stored anywhere. A failed build stores nothing.
    ///
    /// # Errors
    ///
    /// Propagates the error of `build`.
    pub fn get_or_build<E>(
        &self,
        language: &str,
        fingerprint: impl Fn() -> Option<Fingerprint>,
        build: impl FnOnce(&str) -> Result<RouteMap, E>,
    ) -> Result<Arc<RouteMap>, E> {
        let Some(seen) = fingerprint() else {
            return self.build_uncached(language, build);
        };

        // Fast path: memoized for this fingerprint
        if let Some(map) = self.memoized(language, &seen) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(map);
        }

        // Slow path: serialize builds, then check again
        let _guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(fingerprint) = fingerprint() else {
            return self.build_uncached(language, build);
        };

        if let Some(map) = self.memoized(language, &fingerprint) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(map);
        }

        if let Some(map) = self.persisted(language, &fingerprint) {
            self.persisted_hits.fetch_add(1, Ordering::Relaxed);
            let map = Arc::new(map);
            self.memoize(language, fingerprint, Arc::clone(&map));
            return Ok(map);
        }

        let map = build(language)?;
        self.builds.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            language,
            fingerprint = %fingerprint,
            pages = map.len(),
            "Caching route map"
        );

        self.bucket.set_json(language, fingerprint.as_str(), &map);
        let map = Arc::new(map);
        self.memoize(language, fingerprint, Arc::clone(&map));
        Ok(map)
    }

    /// Drop the memoized and persisted map of `language`.
    pub fn invalidate(&self, language: &str) {
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(language);
        self.bucket.remove(language);
    }

    /// Drop every memoized map.
    ///
    /// Persisted maps stay; they are only served again for a matching
    /// fingerprint.
    pub fn clear(&self) {
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            builds: self.builds.load(Ordering::Relaxed),
            persisted_hits: self.persisted_hits.load(Ordering::Relaxed),
        }
    }

    fn build_uncached<E>(
        &self,
        language: &str,
        build: impl FnOnce(&str) -> Result<RouteMap, E>,
    ) -> Result<Arc<RouteMap>, E> {
        tracing::debug!(language, "Fingerprint unavailable, building uncached");
        self.builds.fetch_add(1, Ordering::Relaxed);
        build(language).map(Arc::new)
    }

    fn memoized(&self, language: &str, fingerprint: &Fingerprint) -> Option<Arc<RouteMap>> {
        self.memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(language)
            .filter(|entry| entry.fingerprint == *fingerprint)
            .map(|entry| Arc::clone(&entry.map))
    }

    fn persisted(&self, language: &str, fingerprint: &Fingerprint) -> Option<RouteMap> {
        let map: RouteMap = self.bucket.get_json(language, fingerprint.as_str())?;
        if map.language != language {
            tracing::warn!(
                language,
                stored = %map.language,
                "Ignoring persisted route map for another language"
            );
            return None;
        }
        Some(map)
    }

    fn memoize(&self, language: &str, fingerprint: Fingerprint, map: Arc<RouteMap>) {
        self.memo
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(language.to_owned(), CacheEntry { fingerprint, map });
    }
}
