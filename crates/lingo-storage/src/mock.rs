//! In-memory storage for tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::storage::{ContentFile, Storage, StorageError, StorageErrorKind};

const BACKEND: &str = "Mock";

#[derive(Debug, Clone)]
struct MockFile {
    content: String,
    mtime: Option<f64>,
}

/// Mock storage holding files in memory.
///
/// Files can be added or changed after construction to simulate content
/// edits; every write bumps the file's mtime so fingerprints change.
///
/// ```ignore
/// use lingo_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("01.home/default.md", "# Home")
///     .with_file("01.home/default.fr.md", "---\nslug: accueil\n---\n");
/// assert_eq!(storage.list().unwrap().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, MockFile>>,
    clock: RwLock<f64>,
    unavailable: AtomicBool,
}

impl MockStorage {
    /// Create an empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.write(path, content);
        self
    }

    /// Add a file whose modification time cannot be reported.
    #[must_use]
    pub fn with_file_without_mtime(
        self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.into(),
                MockFile {
                    content: content.into(),
                    mtime: None,
                },
            );
        self
    }

    /// Create or overwrite a file, advancing its mtime.
    pub fn write(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        let mtime = {
            let mut clock = self.clock.write().unwrap_or_else(PoisonError::into_inner);
            *clock += 1.0;
            *clock
        };
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                path.into(),
                MockFile {
                    content: content.into(),
                    mtime: Some(mtime),
                },
            );
    }

    /// Delete a file.
    pub fn remove(&self, path: &Path) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
    }

    /// Make every operation fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::new(StorageErrorKind::Unavailable).with_backend(BACKEND));
        }
        Ok(())
    }
}

impl Storage for MockStorage {
    fn list(&self) -> Result<Vec<ContentFile>, StorageError> {
        self.check_available()?;
        Ok(self
            .files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(path, file)| ContentFile {
                path: path.clone(),
                mtime: file.mtime,
            })
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        self.check_available().is_ok()
            && self
                .files
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(path)
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        self.check_available()?;
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|file| file.content.clone())
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_advances_mtime() {
        let storage = MockStorage::new().with_file("a/default.md", "one");
        let before = storage.list().unwrap()[0].mtime;

        storage.write("a/default.md", "two");
        let after = storage.list().unwrap()[0].mtime;

        assert!(after > before);
        assert_eq!(storage.read(Path::new("a/default.md")).unwrap(), "two");
    }

    #[test]
    fn test_file_without_mtime() {
        let storage = MockStorage::new().with_file_without_mtime("a/default.md", "x");

        assert_eq!(storage.list().unwrap()[0].mtime, None);
    }

    #[test]
    fn test_remove() {
        let storage = MockStorage::new().with_file("a/default.md", "x");

        storage.remove(Path::new("a/default.md"));

        assert!(!storage.exists(Path::new("a/default.md")));
        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_unavailable_backend_fails() {
        let storage = MockStorage::new().with_file("a/default.md", "x");
        storage.set_unavailable(true);

        assert_eq!(storage.list().unwrap_err().kind, StorageErrorKind::Unavailable);
        assert!(!storage.exists(Path::new("a/default.md")));
        assert!(storage.read(Path::new("a/default.md")).is_err());
    }
}
