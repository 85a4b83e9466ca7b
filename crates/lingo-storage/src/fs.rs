//! Filesystem storage implementation.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::storage::{ContentFile, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Default content file extension.
const DEFAULT_EXTENSION: &str = "md";

/// Content files in a local directory tree.
///
/// Hidden files and directories (leading `.`) are skipped.
pub struct FsStorage {
    /// Root directory of the page tree.
    source_dir: PathBuf,
    /// Extension of content files, without the dot.
    extension: String,
}

impl FsStorage {
    /// Create storage for markdown pages under `source_dir`.
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self::with_extension(source_dir, DEFAULT_EXTENSION)
    }

    /// Create storage listing files with a custom extension (without the dot).
    #[must_use]
    pub fn with_extension(source_dir: PathBuf, extension: &str) -> Self {
        Self {
            source_dir,
            extension: extension.trim_start_matches('.').to_owned(),
        }
    }

    /// Root directory of the page tree.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Reject paths that could escape the source directory.
    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(self.source_dir.join(path))
    }

    fn walk(&self, dir: &Path, rel: &Path, files: &mut Vec<ContentFile>) -> std::io::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }

            let rel_path = rel.join(&name);
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                self.walk(&entry.path(), &rel_path, files)?;
            } else if rel_path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
            {
                let mtime = entry
                    .metadata()
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs_f64());
                files.push(ContentFile {
                    path: rel_path,
                    mtime,
                });
            }
        }
        Ok(())
    }
}

impl Storage for FsStorage {
    fn list(&self) -> Result<Vec<ContentFile>, StorageError> {
        let mut files = Vec::new();
        self.walk(&self.source_dir, Path::new(""), &mut files)
            .map_err(|e| StorageError::io(e, &self.source_dir).with_backend(BACKEND))?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_ok_and(|full| full.is_file())
    }

    fn read(&self, path: &Path) -> Result<String, StorageError> {
        let full = self.resolve(path)?;
        fs::read_to_string(&full).map_err(|e| StorageError::io(e, path).with_backend(BACKEND))
    }
}
