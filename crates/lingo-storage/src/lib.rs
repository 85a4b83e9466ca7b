//! Content file store for Lingo.
//!
//! Page translations live next to each other as files in one folder per
//! page (`02.about/default.md`, `02.about/default.fr.md`). Route resolution
//! only needs a handful of operations on those files, captured by the
//! [`Storage`] trait:
//!
//! - list every content file with its modification time
//! - check whether a given variant file exists
//! - read a file and its front matter (for `slug` overrides)
//!
//! # Backends
//!
//! - [`FsStorage`]: local directory tree
//! - [`MockStorage`]: in-memory files for tests (behind the `mock` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::{Path, PathBuf};
//! use lingo_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("pages"));
//! for file in storage.list()? {
//!     println!("{}", file.path.display());
//! }
//! let front_matter = storage.front_matter(Path::new("02.about/default.fr.md"))?;
//! # Ok::<(), lingo_storage::StorageError>(())
//! ```

mod front_matter;
mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use front_matter::FrontMatter;
pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{ContentFile, Storage, StorageError, StorageErrorKind};
