//! Typed access to [`CacheBucket`] values.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// JSON helpers layered over the raw byte interface.
///
/// Kept out of [`CacheBucket`] so the base trait stays object-safe and
/// implementors only deal with bytes.
///
/// ```
/// use std::collections::BTreeMap;
/// use lingo_cache::{Cache, CacheBucketExt, NullCache};
///
/// let bucket = NullCache.bucket("route-maps");
/// let routes = BTreeMap::from([("01.home".to_owned(), "/fr".to_owned())]);
/// bucket.set_json("fr", "3f2a", &routes);
/// let cached: Option<BTreeMap<String, String>> = bucket.get_json("fr", "3f2a");
/// assert!(cached.is_none());
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Fetch and decode a JSON value.
    ///
    /// A value that no longer decodes (e.g., written by an older format) is
    /// treated as a miss.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Encode a value as JSON and save it.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, etag, &bytes),
            Err(e) => tracing::debug!(key, error = %e, "Failed to encode cache entry"),
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}
