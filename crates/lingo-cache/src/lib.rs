//! Cache store abstraction for Lingo.
//!
//! Route maps are expensive to build, so they are persisted between
//! processes through a small key-value interface:
//!
//! - [`Cache`]: Factory for named buckets, one per kind of cached data
//! - [`CacheBucket`]: Key-value store where every entry carries an etag
//!
//! A route map is stored under its language code with the content tree
//! fingerprint as etag, so an entry written for an older tree is never
//! served after the content changes.
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: Store is unavailable (always miss)
//! - [`FileCache`]: Directory on disk, wiped when the build version changes
//!
//! # Example
//!
//! ```
//! use lingo_cache::{Cache, NullCache};
//!
//! let cache = NullCache;
//! let bucket = cache.bucket("route-maps");
//! bucket.set("fr", "3f2a", br#"{"01.home":"/fr"}"#);
//! assert_eq!(bucket.get("fr", "3f2a"), None); // NullCache always misses
//! ```

mod ext;
mod file;

pub use ext::CacheBucketExt;
pub use file::FileCache;

/// A named partition within a [`Cache`].
///
/// Values are opaque bytes. The etag is chosen by the caller; a lookup only
/// hits when the stored etag equals the requested one.
pub trait CacheBucket: Send + Sync {
    /// Fetch a stored value.
    ///
    /// Returns `None` when the key is absent, the etag differs, or the
    /// store cannot be read. An empty `etag` matches any stored etag.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Save a value, replacing whatever was stored under `key`.
    ///
    /// Write failures are not reported: a cache that cannot persist behaves
    /// like one that always misses.
    fn set(&self, key: &str, etag: &str, value: &[u8]);

    /// Drop the entry stored under `key`, if any.
    fn remove(&self, key: &str);
}

/// Factory for named [`CacheBucket`]s.
///
/// Buckets with different names never see each other's keys, which keeps
/// unrelated users of one cache root from colliding.
pub trait Cache: Send + Sync {
    /// Open a named bucket (e.g., "route-maps").
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// [`CacheBucket`] that stores nothing.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}

    fn remove(&self, _key: &str) {}
}

/// [`Cache`] used when persistence is disabled.
///
/// Every lookup misses, so callers fall back to rebuilding.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_cache_never_returns_saved_route_map() {
        let cache = NullCache;
        let bucket = cache.bucket("route-maps");

        assert_eq!(bucket.get("fr", "abc"), None);

        bucket.set("fr", "abc", b"{}");
        assert_eq!(bucket.get("fr", "abc"), None);
        assert_eq!(bucket.get("fr", ""), None);
    }

    #[test]
    fn test_null_cache_remove_is_noop() {
        let bucket = NullCache.bucket("route-maps");
        bucket.remove("de");
        assert_eq!(bucket.get("de", ""), None);
    }
}
