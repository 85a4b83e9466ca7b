//! Localized route resolution for multi-language content sites.
//!
//! This crate provides:
//! - [`SiteTree`]: Page hierarchy scanned from a [`Storage`](lingo_storage::Storage)
//! - [`Locator`] and [`Composer`]: Per-language slugs joined into routes
//! - [`LanguageContext`]: Scoped switching of the tree's active language
//! - [`RouteCache`]: Per-language route maps keyed by tree fingerprint
//! - [`Switcher`]: Language switcher data for the page being rendered
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::PathBuf;
//! use std::sync::Arc;
//! use lingo_cache::NullCache;
//! use lingo_site::{ContentTree, Languages, SiteTree, Switcher, SwitcherOptions, TreeOptions};
//! use lingo_storage::FsStorage;
//!
//! let storage = Arc::new(FsStorage::new(PathBuf::from("pages")));
//! let languages = Arc::new(Languages::new(["en", "fr"], Some("en"))?);
//! let tree = Arc::new(SiteTree::load(storage, languages, TreeOptions::default())?);
//! let switcher = Switcher::new(
//!     Arc::clone(&tree) as Arc<dyn ContentTree>,
//!     &NullCache,
//!     tree.locator().clone(),
//!     SwitcherOptions::default(),
//! );
//!
//! let page = tree.find("/home/about").ok_or("page not found")?;
//! let data = switcher.assemble(&page, "en")?;
//! # Ok(())
//! # }
//! ```

mod composer;
mod error;
mod language;
mod locator;
mod route_cache;
mod route_map;
mod scope;
mod site_tree;
mod switcher;
mod tree;
mod url;

pub use composer::{Composer, RouteOptions};
pub use error::{ResolveError, TreeError};
pub use language::{LanguageCode, LanguageError, Languages};
pub use locator::{EmptySlugPolicy, Located, Locator};
pub use route_cache::{CacheStats, ROUTE_MAPS_BUCKET, RouteCache};
pub use route_map::{RouteMap, build_route_map};
pub use scope::{LanguageContext, LanguageScopeError};
pub use site_tree::{SiteTree, TreeOptions};
pub use switcher::{
    Switcher, SwitcherData, SwitcherError, SwitcherOptions, TranslatedPage, UntranslatedPages,
};
pub use tree::{ContentTree, Fingerprint, PageNode, strip_order_prefix};
pub use url::{UrlOptions, UrlPolicy};
