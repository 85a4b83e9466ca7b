//! Localized route composition.

use crate::error::ResolveError;
use crate::locator::Locator;
use crate::tree::{ContentTree, PageNode};

/// Route composition settings.
#[derive(Clone, Debug)]
pub struct RouteOptions {
    /// Route of the home page, served at the site root.
    pub home_alias: String,
    /// Drop the home page segment from the routes of its descendants.
    pub hide_home_in_urls: bool,
    /// Lowercase composed routes.
    pub force_lowercase: bool,
    /// Maximum number of nodes walked from a page up to the root.
    pub max_depth: usize,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            home_alias: "/home".to_owned(),
            hide_home_in_urls: false,
            force_lowercase: true,
            max_depth: 64,
        }
    }
}

/// Joins the language-specific slugs of a page and its ancestors.
#[derive(Clone)]
pub struct Composer {
    locator: Locator,
    options: RouteOptions,
}

impl Composer {
    #[must_use]
    pub fn new(locator: Locator, options: RouteOptions) -> Self {
        Self { locator, options }
    }

    #[must_use]
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    #[must_use]
    pub fn options(&self) -> &RouteOptions {
        &self.options
    }

    /// Compose the route of `node` in `language`.
    ///
    /// Returns `""` for the site root and `/seg/seg` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::DepthExceeded`] when the ancestor chain is
    /// longer than `max_depth` (a cycle always is), and propagates locator
    /// failures for any level.
    pub fn compose(
        &self,
        tree: &dyn ContentTree,
        node: &PageNode,
        language: &str,
    ) -> Result<String, ResolveError> {
        let mut segments = Vec::new();
        let mut current = node.clone();
        let mut depth = 0;

        loop {
            depth += 1;
            if depth > self.options.max_depth {
                return Err(ResolveError::DepthExceeded {
                    path: node.path.clone(),
                    max_depth: self.options.max_depth,
                });
            }

            let hidden_home =
                self.options.hide_home_in_urls && current.home && current.parent.is_none();
            if !hidden_home {
                let located = self.locator.locate(&current, language)?;
                if !located.slug.is_empty() {
                    segments.push(located.slug);
                }
            }

            let Some(parent) = current.parent.take() else {
                break;
            };
            current = tree.get(&parent).ok_or_else(|| ResolveError::MissingParent {
                path: current.path.clone(),
                parent,
            })?;
        }

        segments.reverse();
        let mut route = segments.join("/");

        if route == self.options.home_alias.trim_matches('/') {
            route.clear();
        }
        if self.options.force_lowercase {
            route = route.to_lowercase();
        }

        if route.is_empty() {
            Ok(route)
        } else {
            Ok(format!("/{route}"))
        }
    }
}
