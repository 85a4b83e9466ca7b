//! Error types shared by the content tree and the resolution engine.

use lingo_storage::StorageError;

/// Failure to resolve the localized route of one page.
///
/// Route map builds drop the affected page and carry on; the switcher falls
/// back to the raw route.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The node has no name a slug could be derived from.
    #[error("Page {path:?} has no derivable slug")]
    NoSlug {
        /// Canonical path of the page.
        path: String,
    },
    /// The ancestor chain is longer than the configured bound (or cyclic).
    #[error("Ancestor chain of {path:?} exceeds {max_depth} levels")]
    DepthExceeded {
        /// Canonical path of the page being composed.
        path: String,
        /// Configured bound.
        max_depth: usize,
    },
    /// A parent link points at a node the tree does not know.
    #[error("Parent {parent:?} of page {path:?} not found")]
    MissingParent {
        /// Canonical path of the child.
        path: String,
        /// Dangling parent path.
        parent: String,
    },
    /// A variant file could not be read.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure of a content tree operation.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    /// The language is not configured for this site.
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
    /// The tree could not be re-initialized after a language switch.
    #[error("Failed to reset content tree: {0}")]
    Reset(String),
    /// Scanning the content store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use lingo_storage::StorageErrorKind;

    use super::*;

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::DepthExceeded {
            path: "01.a/02.b".to_owned(),
            max_depth: 1,
        };

        assert_eq!(
            err.to_string(),
            "Ancestor chain of \"01.a/02.b\" exceeds 1 levels"
        );
    }

    #[test]
    fn test_tree_error_wraps_storage_error() {
        let err = TreeError::from(
            StorageError::new(StorageErrorKind::Unavailable).with_backend("Mock"),
        );

        assert_eq!(err.to_string(), "[Mock] Unavailable");
    }
}
