//! Language switcher data for the page being rendered.
//!
//! [`Switcher::assemble`] is the single entry point for the presentation
//! layer. It links the current page to its equivalent in every configured
//! language:
//!
//! 1. The active language gets the page's own URL.
//! 2. Every other language gets the URL from its cached [`RouteMap`].
//! 3. A language without an entry gets the raw route of the current page.
//!
//! Only a failure to restore the tree's language is reported to the caller;
//! everything else degrades to the raw route and is logged.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use lingo_cache::Cache;
use serde::Serialize;

use crate::language::Languages;
use crate::locator::{Located, Locator};
use crate::route_cache::{CacheStats, RouteCache};
use crate::route_map::{RouteMap, build_route_map};
use crate::scope::{LanguageContext, LanguageScopeError};
use crate::tree::{ContentTree, PageNode};

/// Exposure of per-language page references.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UntranslatedPages {
    /// No page references.
    #[default]
    None,
    /// A reference only where a variant file exists.
    Translated,
    /// Languages without a variant get the default-language page.
    Default,
}

/// Switcher behavior.
#[derive(Clone, Debug)]
pub struct SwitcherOptions {
    /// Resolve translated URLs. When off, `translated_routes` is omitted.
    pub translated_urls: bool,
    /// Page reference policy.
    pub untranslated_pages: UntranslatedPages,
    /// Whether the bundled stylesheet should be emitted.
    pub built_in_css: bool,
}

impl Default for SwitcherOptions {
    fn default() -> Self {
        Self {
            translated_urls: true,
            untranslated_pages: UntranslatedPages::None,
            built_in_css: true,
        }
    }
}

/// Reference to the variant file of a page in one language.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TranslatedPage {
    /// Language of the variant file.
    pub language: String,
    /// Storage path of the variant file.
    pub file: PathBuf,
    /// Slug of the page in that language.
    pub slug: String,
    /// Title from the variant's front matter.
    pub title: Option<String>,
}

/// Everything a language switcher widget needs to render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SwitcherData {
    /// Raw route of the current page (`/` for the home page).
    pub page_route: String,
    /// Configured languages, in order.
    pub languages: Vec<String>,
    /// URL of the current page per language.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_routes: Option<BTreeMap<String, String>>,
    /// Page reference per language (`None` where there is nothing to link).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_pages: Option<BTreeMap<String, Option<TranslatedPage>>>,
    /// Active language.
    pub current: String,
    /// Whether the bundled stylesheet should be emitted.
    pub built_in_css: bool,
}

/// Error assembling switcher data.
#[derive(Debug, thiserror::Error)]
pub enum SwitcherError {
    /// The content tree could not be put back into its previous language.
    #[error(transparent)]
    Restore(LanguageScopeError),
}

/// Assembles [`SwitcherData`] from a shared content tree.
pub struct Switcher {
    context: LanguageContext,
    cache: RouteCache,
    locator: Locator,
    options: SwitcherOptions,
}

impl Switcher {
    /// Create a switcher.
    ///
    /// Route maps are persisted through `cache` (use
    /// [`NullCache`](lingo_cache::NullCache) to keep them in memory only).
    #[must_use]
    pub fn new(
        tree: Arc<dyn ContentTree>,
        cache: &dyn Cache,
        locator: Locator,
        options: SwitcherOptions,
    ) -> Self {
        Self {
            context: LanguageContext::new(tree),
            cache: RouteCache::new(cache),
            locator,
            options,
        }
    }

    #[must_use]
    pub fn context(&self) -> &LanguageContext {
        &self.context
    }

    #[must_use]
    pub fn languages(&self) -> &Languages {
        self.locator.languages()
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop the cached route map of `language`.
    pub fn invalidate(&self, language: &str) {
        self.cache.invalidate(language);
    }

    /// Drop every in-memory route map.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Route map of `language`, from cache or freshly built.
    ///
    /// # Errors
    ///
    /// Returns [`LanguageScopeError`] if the build could not enter or leave
    /// the language.
    pub fn route_map(&self, language: &str) -> Result<Arc<RouteMap>, LanguageScopeError> {
        self.cache.get_or_build(
            language,
            || self.context.current(|tree| tree.fingerprint()),
            |language| build_route_map(&self.context, language),
        )
    }

    /// Assemble switcher data for `current_page` rendered in `active_language`.
    ///
    /// # Errors
    ///
    /// Returns [`SwitcherError::Restore`] if the tree was left in the wrong
    /// language. No other failure is reported.
    pub fn assemble(
        &self,
        current_page: &PageNode,
        active_language: &str,
    ) -> Result<SwitcherData, SwitcherError> {
        let page_route = if current_page.home {
            "/".to_owned()
        } else {
            current_page.raw_route.clone()
        };

        let translated_routes = if self.options.translated_urls {
            Some(self.translated_routes(current_page, active_language, &page_route)?)
        } else {
            None
        };

        let translated_pages = match self.options.untranslated_pages {
            UntranslatedPages::None => None,
            policy => Some(self.translated_pages(current_page, policy)),
        };

        Ok(SwitcherData {
            page_route,
            languages: self.languages().codes().to_vec(),
            translated_routes,
            translated_pages,
            current: active_language.to_owned(),
            built_in_css: self.options.built_in_css,
        })
    }

    fn translated_routes(
        &self,
        page: &PageNode,
        active_language: &str,
        page_route: &str,
    ) -> Result<BTreeMap<String, String>, SwitcherError> {
        let mut routes = BTreeMap::new();

        for language in self.languages().codes() {
            let url = if language == active_language {
                self.own_url(page, active_language)?
            } else {
                match self.route_map(language) {
                    Ok(map) => map.get(&page.path).map(str::to_owned),
                    Err(e @ LanguageScopeError::Restore { .. }) => {
                        return Err(SwitcherError::Restore(e));
                    }
                    Err(e) => {
                        tracing::warn!(language = %language, error = %e, "Route map unavailable");
                        None
                    }
                }
            };

            routes.insert(
                language.clone(),
                url.unwrap_or_else(|| page_route.to_owned()),
            );
        }

        Ok(routes)
    }

    /// URL of `page` in the language it is being rendered in.
    fn own_url(
        &self,
        page: &PageNode,
        active_language: &str,
    ) -> Result<Option<String>, SwitcherError> {
        let in_active = self.context.current(|tree| {
            (tree.active_language() == active_language).then(|| tree.url(page))
        });

        let result = match in_active {
            Some(result) => result,
            None => match self
                .context
                .with_language(active_language, |tree| tree.url(page))
            {
                Ok(result) => result,
                Err(e @ LanguageScopeError::Restore { .. }) => {
                    return Err(SwitcherError::Restore(e));
                }
                Err(e) => {
                    tracing::warn!(language = active_language, error = %e, "Cannot enter active language");
                    return Ok(None);
                }
            },
        };

        match result {
            Ok(url) => Ok(Some(url)),
            Err(e) => {
                tracing::warn!(path = %page.path, error = %e, "Cannot resolve current page URL");
                Ok(None)
            }
        }
    }

    fn translated_pages(
        &self,
        page: &PageNode,
        policy: UntranslatedPages,
    ) -> BTreeMap<String, Option<TranslatedPage>> {
        let languages = self.languages();
        let default_page = if policy == UntranslatedPages::Default {
            self.translated_page(page, languages.default_language())
        } else {
            None
        };

        languages
            .codes()
            .iter()
            .map(|language| {
                let reference = self
                    .translated_page(page, language)
                    .or_else(|| default_page.clone());
                (language.clone(), reference)
            })
            .collect()
    }

    fn translated_page(&self, page: &PageNode, language: &str) -> Option<TranslatedPage> {
        match self.locator.locate(page, language) {
            Ok(Located {
                slug,
                exists: true,
                file: Some(file),
                title,
            }) => Some(TranslatedPage {
                language: language.to_owned(),
                file,
                slug,
                title,
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %page.path, language, error = %e, "Cannot locate variant");
                None
            }
        }
    }
}
