//! Scoped active-language switching on a shared content tree.
//!
//! The active language of a [`ContentTree`] is global to every request that
//! shares the tree. [`LanguageContext`] serializes language switches through
//! the tree's own [`language_lock`](ContentTree::language_lock), so every
//! context on one tree excludes the others, and puts the previous language
//! back on every exit path, panics included.

use std::sync::{Arc, MutexGuard, PoisonError};

use crate::error::TreeError;
use crate::tree::ContentTree;

/// Error entering or leaving a language scope.
#[derive(Debug, thiserror::Error)]
pub enum LanguageScopeError {
    /// Switching to the target language failed. The previous language was
    /// restored.
    #[error("Failed to enter language {language:?}: {source}")]
    Enter {
        /// Target language.
        language: String,
        /// Underlying tree error.
        #[source]
        source: TreeError,
    },
    /// Restoring the previous language failed. The tree may be left in the
    /// wrong language.
    #[error("Failed to restore language {language:?}: {source}")]
    Restore {
        /// Language that should have been restored.
        language: String,
        /// Underlying tree error.
        #[source]
        source: TreeError,
    },
}

/// Exclusive access to a tree's active-language state.
///
/// # Example
///
/// ```ignore
/// let context = LanguageContext::new(tree);
/// let paths = context.with_language("fr", |tree| tree.all_paths())?;
/// ```
pub struct LanguageContext {
    tree: Arc<dyn ContentTree>,
}

impl LanguageContext {
    #[must_use]
    pub fn new(tree: Arc<dyn ContentTree>) -> Self {
        Self { tree }
    }

    /// Run `f` with the tree switched to `language`.
    ///
    /// Holds the tree's language lock for the whole switch, run and restore
    /// sequence. `f` must not open another scope on the same tree.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageScopeError::Enter`] if the switch fails (after
    /// restoring), and [`LanguageScopeError::Restore`] if the previous
    /// language cannot be put back.
    pub fn with_language<T>(
        &self,
        language: &str,
        f: impl FnOnce(&dyn ContentTree) -> T,
    ) -> Result<T, LanguageScopeError> {
        let tree = self.tree.as_ref();
        let _lock = lock(tree);

        let mut guard = RestoreGuard {
            tree,
            previous: Some(tree.active_language()),
        };

        if let Err(source) = switch(tree, language) {
            guard.restore()?;
            return Err(LanguageScopeError::Enter {
                language: language.to_owned(),
                source,
            });
        }

        let value = f(tree);
        guard.restore()?;
        Ok(value)
    }

    /// Run `f` against the tree in its current language.
    ///
    /// Waits for any scoped switch in progress to finish.
    pub fn current<T>(&self, f: impl FnOnce(&dyn ContentTree) -> T) -> T {
        let tree = self.tree.as_ref();
        let _lock = lock(tree);
        f(tree)
    }
}

fn lock(tree: &dyn ContentTree) -> MutexGuard<'_, ()> {
    tree.language_lock()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn switch(tree: &dyn ContentTree, language: &str) -> Result<(), TreeError> {
    tree.set_active_language(language)?;
    tree.reset_after_language_change()
}

/// Puts the previous language back when dropped without an explicit restore.
struct RestoreGuard<'a> {
    tree: &'a dyn ContentTree,
    previous: Option<String>,
}

impl RestoreGuard<'_> {
    fn restore(&mut self) -> Result<(), LanguageScopeError> {
        let Some(language) = self.previous.take() else {
            return Ok(());
        };
        switch(self.tree, &language)
            .map_err(|source| LanguageScopeError::Restore { language, source })
    }
}

impl Drop for RestoreGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            tracing::error!(error = %e, "Content tree left in the wrong language");
        }
    }
}
