//! Translation variant lookup.
//!
//! A page folder holds one file per language: `default.fr.md`,
//! `default.de.md`, and so on. For the site default language the
//! un-suffixed `default.md` doubles as its variant.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lingo_storage::Storage;

use crate::error::ResolveError;
use crate::language::Languages;
use crate::tree::PageNode;

/// Handling of a variant whose front matter sets `slug` to an empty string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptySlugPolicy {
    /// Use the slug derived from the folder name.
    #[default]
    Fallback,
    /// Contribute no segment to the composed route.
    Omit,
}

/// Result of [`Locator::locate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Located {
    /// Route segment for the page in the requested language.
    ///
    /// Only empty under [`EmptySlugPolicy::Omit`].
    pub slug: String,
    /// Whether a variant file exists for the language.
    pub exists: bool,
    /// Storage path of the variant file.
    pub file: Option<PathBuf>,
    /// Title from the variant's front matter.
    pub title: Option<String>,
}

/// Finds the variant file of a page in a language and reads its slug.
#[derive(Clone)]
pub struct Locator {
    storage: Arc<dyn Storage>,
    languages: Arc<Languages>,
    empty_slug: EmptySlugPolicy,
}

impl Locator {
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        languages: Arc<Languages>,
        empty_slug: EmptySlugPolicy,
    ) -> Self {
        Self {
            storage,
            languages,
            empty_slug,
        }
    }

    #[must_use]
    pub fn languages(&self) -> &Languages {
        &self.languages
    }

    /// Storage path of the variant file of `node` in `language`, if any.
    #[must_use]
    pub fn variant_file(&self, node: &PageNode, language: &str) -> Option<PathBuf> {
        let dir = Path::new(&node.path);

        let suffixed = dir.join(format!(
            "{}.{language}.{}",
            node.file_stem, node.extension
        ));
        if self.storage.exists(&suffixed) {
            return Some(suffixed);
        }

        if self.languages.is_default(language) {
            let plain = dir.join(format!("{}.{}", node.file_stem, node.extension));
            if self.storage.exists(&plain) {
                return Some(plain);
            }
        }

        None
    }

    /// Resolve the slug of `node` in `language`.
    ///
    /// Without a variant, or when the variant sets no usable slug, the slug is
    /// the folder name with its ordering prefix stripped.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NoSlug`] if no slug can be derived and
    /// [`ResolveError::Storage`] if the variant exists but cannot be read.
    pub fn locate(&self, node: &PageNode, language: &str) -> Result<Located, ResolveError> {
        let derived = || {
            let slug = node.default_slug();
            if slug.is_empty() {
                Err(ResolveError::NoSlug {
                    path: node.path.clone(),
                })
            } else {
                Ok(slug.to_owned())
            }
        };

        let Some(file) = self.variant_file(node, language) else {
            return Ok(Located {
                slug: derived()?,
                exists: false,
                file: None,
                title: None,
            });
        };

        let front_matter = self.storage.front_matter(&file)?;
        let slug = match front_matter.slug {
            Some(slug) if !slug.is_empty() => slug,
            Some(_) if self.empty_slug == EmptySlugPolicy::Omit => String::new(),
            _ => derived()?,
        };

        Ok(Located {
            slug,
            exists: true,
            file: Some(file),
            title: front_matter.title,
        })
    }
}
