//! Directory-backed cache store.
//!
//! Each bucket is a subdirectory of the cache root and each entry a single
//! file laid out as:
//!
//! ```text
//! [etag_len: u32 LE][etag bytes][data bytes]
//! ```
//!
//! Lookups read the header first and stop on etag mismatch, so stale route
//! maps are rejected without reading their payload.
//!
//! The root holds a `VERSION` file. When it does not match the version the
//! cache was opened with, the whole directory is wiped, since entries written
//! by another build may use a different serialized form.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{Cache, CacheBucket};

/// Longest etag an entry may carry. Longer headers are treated as corrupt.
const MAX_ETAG_LEN: usize = 1024;

/// [`Cache`] rooted at a directory on disk.
///
/// ```text
/// {root}/
/// +-- VERSION
/// +-- route-maps/
///     +-- en
///     +-- fr
/// ```
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, wiping it if its `VERSION` differs.
    ///
    /// Failures while preparing the directory are logged; the resulting cache
    /// then simply misses.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        validate_version(&root, version);
        Self { root }
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(FileCacheBucket {
            dir: self.root.join(name),
        })
    }
}

struct FileCacheBucket {
    dir: PathBuf,
}

impl FileCacheBucket {
    fn read_entry(path: &Path, etag: &str) -> std::io::Result<Option<Vec<u8>>> {
        let mut file = File::open(path)?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf)?;
        let etag_len = u32::from_le_bytes(len_buf) as usize;
        if etag_len > MAX_ETAG_LEN {
            return Ok(None);
        }

        let mut stored_etag = vec![0u8; etag_len];
        file.read_exact(&mut stored_etag)?;

        if !etag.is_empty() && stored_etag != etag.as_bytes() {
            return Ok(None);
        }

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(Some(data))
    }
}

impl CacheBucket for FileCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let path = self.dir.join(key);
        match Self::read_entry(&path, etag) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Failed to read cache entry");
                None
            }
        }
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let path = self.dir.join(key);

        let Some(parent) = path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::debug!(error = %e, "Failed to create cache bucket directory");
            return;
        }

        let etag_bytes = etag.as_bytes();
        if etag_bytes.len() > MAX_ETAG_LEN {
            tracing::debug!(key, "Etag too long, not caching entry");
            return;
        }
        let Ok(etag_len) = u32::try_from(etag_bytes.len()) else {
            return;
        };
        let mut buf = Vec::with_capacity(4 + etag_bytes.len() + value.len());
        buf.extend_from_slice(&etag_len.to_le_bytes());
        buf.extend_from_slice(etag_bytes);
        buf.extend_from_slice(value);

        if let Err(e) = fs::write(&path, &buf) {
            tracing::debug!(path = %path.display(), error = %e, "Failed to write cache entry");
        }
    }

    fn remove(&self, key: &str) {
        let path = self.dir.join(key);
        if let Err(e) = fs::remove_file(&path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::debug!(path = %path.display(), error = %e, "Failed to remove cache entry");
        }
    }
}

/// Wipe `root` unless its `VERSION` file holds `version`.
fn validate_version(root: &Path, version: &str) {
    let version_file = root.join("VERSION");

    match fs::read_to_string(&version_file) {
        Ok(stored) if stored == version => {
            tracing::debug!(version, "Cache version matches");
            return;
        }
        Ok(stored) => {
            tracing::info!(stored, current = version, "Cache version changed, wiping cache");
        }
        Err(_) => {
            tracing::info!("No cache VERSION file found, initializing cache");
        }
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        tracing::warn!(error = %e, "Failed to remove cache directory");
    }
    if let Err(e) = fs::create_dir_all(root) {
        tracing::warn!(error = %e, "Failed to create cache directory");
        return;
    }
    if let Err(e) = fs::write(&version_file, version) {
        tracing::warn!(error = %e, "Failed to write cache VERSION file");
    }
}
