//! Per-language route maps and how they are built.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::scope::{LanguageContext, LanguageScopeError};

/// Canonical page path to localized URL, for one language.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMap {
    /// Language the URLs were composed in.
    pub language: String,
    /// URL per canonical page path.
    pub routes: BTreeMap<String, String>,
}

impl RouteMap {
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            routes: BTreeMap::new(),
        }
    }

    /// URL of the page at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.routes.get(path).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Build the route map of `language`.
///
/// Runs inside a language scope: every page that exists in `language` is
/// resolved with the tree switched to it. Pages that fail to resolve are
/// logged and left out.
///
/// # Errors
///
/// Returns [`LanguageScopeError`] if the tree cannot enter `language` or
/// cannot be switched back afterwards.
pub fn build_route_map(
    context: &LanguageContext,
    language: &str,
) -> Result<RouteMap, LanguageScopeError> {
    context.with_language(language, |tree| {
        let mut map = RouteMap::new(language);
        let mut skipped = 0usize;

        for path in tree.all_paths() {
            let Some(node) = tree.get(&path) else {
                continue;
            };
            match tree.url(&node) {
                Ok(url) => {
                    map.routes.insert(path, url);
                }
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(language, path = %path, error = %e, "Skipping unresolvable page");
                }
            }
        }

        tracing::debug!(language, pages = map.len(), skipped, "Built route map");
        map
    })
}
