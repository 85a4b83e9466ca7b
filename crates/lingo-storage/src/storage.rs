//! Storage trait and error types.
//!
//! All paths are relative to the storage root and use the on-disk names,
//! ordering prefixes included (e.g., `01.home/02.about/default.fr.md`).

use std::path::{Path, PathBuf};

use crate::front_matter::FrontMatter;

/// A content file returned by [`Storage::list`].
#[derive(Clone, Debug, PartialEq)]
pub struct ContentFile {
    /// Path relative to the storage root.
    pub path: PathBuf,
    /// Modification time as seconds since the Unix epoch, when the backend
    /// can report one.
    pub mtime: Option<f64>,
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// File does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Path escapes the storage root or is otherwise unusable.
    InvalidPath,
    /// Backend cannot be reached.
    Unavailable,
    /// Anything else.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: &Path) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            _ => StorageErrorKind::Other,
        };
        Self::new(kind).with_path(path).with_source(err)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // "[Backend] Kind: source (path: a/b.md)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::Unavailable => "Unavailable",
            StorageErrorKind::Other => "Error",
        };
        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Read access to the content files of a site.
pub trait Storage: Send + Sync {
    /// List every content file, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be enumerated.
    fn list(&self) -> Result<Vec<ContentFile>, StorageError>;

    /// Check whether a file exists. Errors count as "doesn't exist".
    fn exists(&self, path: &Path) -> bool;

    /// Read a file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file is missing or unreadable.
    fn read(&self, path: &Path) -> Result<String, StorageError>;

    /// Read and parse the front matter of a file.
    ///
    /// Malformed front matter yields an empty [`FrontMatter`] rather than an
    /// error; only failing to read the file is reported.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the file cannot be read.
    fn front_matter(&self, path: &Path) -> Result<FrontMatter, StorageError> {
        let content = self.read(path)?;
        Ok(FrontMatter::parse(&content))
    }
}
