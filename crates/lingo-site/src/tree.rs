//! Content tree accessor interface.
//!
//! The resolution engine never walks storage directly. It reads page nodes
//! through [`ContentTree`], which also owns the "active language" mode that
//! decides which pages exist and how their URLs are composed.

use std::fmt;
use std::sync::{LazyLock, Mutex};

use regex::Regex;

use crate::error::{ResolveError, TreeError};

static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.").expect("invalid order prefix regex"));

/// Strip a leading numeric ordering prefix (`01.`) from a folder name.
#[must_use]
pub fn strip_order_prefix(name: &str) -> &str {
    match ORDER_PREFIX.find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}

/// A page in the content tree.
///
/// Nodes reference each other by canonical path only; the tree owns them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageNode {
    /// Canonical path: storage-relative folder path (e.g., `01.home/02.about`).
    pub path: String,
    /// Stem of the page file (`default` for `default.fr.md`).
    pub file_stem: String,
    /// Extension of the page file, without the dot.
    pub extension: String,
    /// Language-independent route (e.g., `/home/about`).
    pub raw_route: String,
    /// Whether this page is the site home page.
    pub home: bool,
    /// Canonical path of the parent page.
    pub parent: Option<String>,
    /// Canonical paths of child pages, in folder order.
    pub children: Vec<String>,
}

impl PageNode {
    /// Last segment of the canonical path.
    #[must_use]
    pub fn folder_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Folder name without its ordering prefix.
    #[must_use]
    pub fn default_slug(&self) -> &str {
        strip_order_prefix(self.folder_name())
    }
}

/// Structural fingerprint of a content tree.
///
/// Two equal fingerprints mean no page was added, removed or edited in
/// between.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read access to a site's page hierarchy plus its active-language mode.
///
/// Implementations are shared between requests, so the language mode is
/// global state. Callers that switch it must go through
/// [`LanguageContext`](crate::LanguageContext).
pub trait ContentTree: Send + Sync {
    /// Lock held for every switch of this tree's active language.
    ///
    /// Shared by every [`LanguageContext`](crate::LanguageContext) built on
    /// the tree.
    fn language_lock(&self) -> &Mutex<()>;

    /// Look up a page by canonical path.
    fn get(&self, path: &str) -> Option<PageNode>;

    /// Canonical paths of every page that exists in the active language.
    fn all_paths(&self) -> Vec<String>;

    /// Currently active language code.
    fn active_language(&self) -> String;

    /// Switch the active language.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::UnsupportedLanguage`] for unknown codes.
    fn set_active_language(&self, code: &str) -> Result<(), TreeError>;

    /// Drop state derived from the previous language.
    ///
    /// Called after every [`set_active_language`](Self::set_active_language).
    fn reset_after_language_change(&self) -> Result<(), TreeError>;

    /// Fingerprint of the current tree, or `None` when it cannot be computed.
    fn fingerprint(&self) -> Option<Fingerprint>;

    /// Externally visible URL of `node` in the active language.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] when the route cannot be composed.
    fn url(&self, node: &PageNode) -> Result<String, ResolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str) -> PageNode {
        PageNode {
            path: path.to_owned(),
            file_stem: "default".to_owned(),
            extension: "md".to_owned(),
            raw_route: String::new(),
            home: false,
            parent: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_strip_order_prefix() {
        assert_eq!(strip_order_prefix("01.home"), "home");
        assert_eq!(strip_order_prefix("123.blog"), "blog");
        assert_eq!(strip_order_prefix("home"), "home");
        assert_eq!(strip_order_prefix("v1.2"), "v1.2");
        assert_eq!(strip_order_prefix("01."), "");
    }

    #[test]
    fn test_folder_name_and_default_slug() {
        let page = node("01.home/02.about");

        assert_eq!(page.folder_name(), "02.about");
        assert_eq!(page.default_slug(), "about");
    }

    #[test]
    fn test_top_level_folder_name() {
        assert_eq!(node("03.contact").folder_name(), "03.contact");
    }
}
