//! Storage-backed content tree.
//!
//! Provides [`SiteTree`], the [`ContentTree`] implementation used by the CLI
//! and by tests. Pages are folders; the files inside a folder are the page's
//! language variants:
//!
//! ```text
//! 01.home/default.md            -> page "01.home", default language
//! 01.home/02.about/default.md   -> page "01.home/02.about", default language
//! 01.home/02.about/default.fr.md                              French variant
//! ```
//!
//! # Thread Safety
//!
//! - Readers get the current snapshot through an `Arc` clone
//! - `reload()` serializes rescans with a dedicated lock and swaps the snapshot
//! - The active language is global to the tree; switch it through
//!   [`LanguageContext`](crate::LanguageContext)

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Component, Path};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, RwLock};

use lingo_storage::{ContentFile, Storage};
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::composer::{Composer, RouteOptions};
use crate::error::{ResolveError, TreeError};
use crate::language::Languages;
use crate::locator::{EmptySlugPolicy, Locator};
use crate::tree::{ContentTree, Fingerprint, PageNode, strip_order_prefix};
use crate::url::{UrlOptions, UrlPolicy};

/// Stem used for folders that hold no content file.
const DEFAULT_STEM: &str = "default";

/// Extension used for folders that hold no content file.
const DEFAULT_EXTENSION: &str = "md";

/// File name suffix that reads as a language code (`default.it.md`).
static LANGUAGE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}$").expect("invalid language suffix regex"));

/// Configuration for [`SiteTree`].
#[derive(Clone, Debug, Default)]
pub struct TreeOptions {
    /// Route composition settings.
    pub routes: RouteOptions,
    /// URL policy settings.
    pub urls: UrlOptions,
    /// Handling of empty explicit slugs.
    pub empty_slug: EmptySlugPolicy,
}

/// Immutable snapshot of the scanned page hierarchy.
#[derive(Debug, Default)]
struct TreeState {
    nodes: BTreeMap<String, PageNode>,
    /// Languages with a variant file, per canonical path.
    variants: HashMap<String, BTreeSet<String>>,
    fingerprint: Option<Fingerprint>,
}

/// Page hierarchy scanned from a [`Storage`] backend.
pub struct SiteTree {
    storage: Arc<dyn Storage>,
    languages: Arc<Languages>,
    composer: Composer,
    url_policy: UrlPolicy,
    state: RwLock<Arc<TreeState>>,
    reload_lock: Mutex<()>,
    active: RwLock<String>,
    language_lock: Mutex<()>,
    /// Composed URLs by language, then canonical path.
    urls: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl SiteTree {
    /// Create an empty tree. Call [`reload`](Self::reload) to scan storage.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, languages: Arc<Languages>, options: TreeOptions) -> Self {
        let locator = Locator::new(
            Arc::clone(&storage),
            Arc::clone(&languages),
            options.empty_slug,
        );
        let composer = Composer::new(locator, options.routes);
        let url_policy = UrlPolicy::new(options.urls, Arc::clone(&languages));
        let active = languages.default_language().to_owned();

        Self {
            storage,
            languages,
            composer,
            url_policy,
            state: RwLock::new(Arc::new(TreeState::default())),
            reload_lock: Mutex::new(()),
            active: RwLock::new(active),
            language_lock: Mutex::new(()),
            urls: Mutex::new(HashMap::new()),
        }
    }

    /// Create a tree and scan storage.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Storage`] if storage cannot be listed.
    pub fn load(
        storage: Arc<dyn Storage>,
        languages: Arc<Languages>,
        options: TreeOptions,
    ) -> Result<Self, TreeError> {
        let tree = Self::new(storage, languages, options);
        tree.reload()?;
        Ok(tree)
    }

    /// Rescan storage and replace the current snapshot.
    ///
    /// On failure the previous snapshot stays in place.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Storage`] if storage cannot be listed.
    pub fn reload(&self) -> Result<(), TreeError> {
        let _guard = self
            .reload_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let files = self.storage.list()?;
        let state = self.scan(&files);
        tracing::debug!(
            pages = state.nodes.len(),
            files = files.len(),
            fingerprint = ?state.fingerprint.as_ref().map(Fingerprint::as_str),
            "Scanned content tree"
        );

        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(state);
        self.clear_urls();
        Ok(())
    }

    /// Locator sharing this tree's storage and languages.
    #[must_use]
    pub fn locator(&self) -> &Locator {
        self.composer.locator()
    }

    #[must_use]
    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    #[must_use]
    pub fn languages(&self) -> &Arc<Languages> {
        &self.languages
    }

    /// Number of pages, folders without content included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().nodes.is_empty()
    }

    /// Find a page by canonical path or by raw route (`/home/about`, `/`).
    #[must_use]
    pub fn find(&self, path_or_route: &str) -> Option<PageNode> {
        let state = self.snapshot();
        if let Some(node) = state.nodes.get(path_or_route.trim_matches('/')) {
            return Some(node.clone());
        }

        let route = path_or_route.trim_end_matches('/');
        if route.is_empty() {
            return state.nodes.values().find(|n| n.home).cloned();
        }
        state
            .nodes
            .values()
            .find(|n| n.raw_route == route || n.raw_route.trim_start_matches('/') == route)
            .cloned()
    }

    fn snapshot(&self) -> Arc<TreeState> {
        Arc::clone(&self.state.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn clear_urls(&self) {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn scan(&self, files: &[ContentFile]) -> TreeState {
        let home = self
            .composer
            .options()
            .home_alias
            .trim_matches('/')
            .to_owned();

        // Page files grouped by folder.
        let mut folders: BTreeMap<String, Vec<PageFile>> = BTreeMap::new();
        for file in files {
            let Some((folder, page_file)) = self.page_file(&file.path) else {
                continue;
            };
            folders.entry(folder).or_default().push(page_file);
        }

        let mut state = TreeState {
            fingerprint: fingerprint(files),
            ..TreeState::default()
        };

        for (folder, page_files) in &folders {
            // The plainest un-suffixed file names the page; otherwise the first variant.
            let Some(primary) = page_files
                .iter()
                .filter(|f| f.language.is_none())
                .min_by_key(|f| f.stem.matches('.').count())
                .or_else(|| page_files.first())
            else {
                continue;
            };

            let languages: BTreeSet<String> = page_files
                .iter()
                .filter(|f| f.stem == primary.stem && f.extension == primary.extension)
                .map(|f| {
                    f.language
                        .clone()
                        .unwrap_or_else(|| self.languages.default_language().to_owned())
                })
                .collect();
            state.variants.insert(folder.clone(), languages);

            insert_node(&mut state.nodes, folder, &primary.stem, &primary.extension, &home);
        }

        // Link children after every folder, content-less ancestors included, exists.
        let links: Vec<(String, String)> = state
            .nodes
            .values()
            .filter_map(|n| n.parent.clone().map(|p| (p, n.path.clone())))
            .collect();
        for (parent, child) in links {
            if let Some(node) = state.nodes.get_mut(&parent) {
                node.children.push(child);
            }
        }

        state
    }

    /// Split a storage path into its folder and page file details.
    fn page_file(&self, path: &Path) -> Option<(String, PageFile)> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_str()?),
                _ => return None,
            }
        }
        let (name, dirs) = parts.split_last()?;
        if dirs.is_empty() {
            return None;
        }

        let (base, extension) = name.rsplit_once('.')?;
        let (stem, language) = match base.rsplit_once('.') {
            Some((stem, code)) if self.languages.contains(code) => (stem, Some(code.to_owned())),
            Some((_, code)) if LANGUAGE_SUFFIX.is_match(code) => {
                tracing::debug!(path = %path.display(), language = code, "Skipping unsupported language variant");
                return None;
            }
            _ => (base, None),
        };

        Some((
            dirs.join("/"),
            PageFile {
                stem: stem.to_owned(),
                extension: extension.to_owned(),
                language,
            },
        ))
    }
}

#[derive(Debug)]
struct PageFile {
    stem: String,
    extension: String,
    language: Option<String>,
}

/// Insert the node for `folder` plus any missing ancestor folders.
fn insert_node(
    nodes: &mut BTreeMap<String, PageNode>,
    folder: &str,
    stem: &str,
    extension: &str,
    home: &str,
) {
    let mut prefix = String::new();
    let mut raw_route = String::new();
    let mut parent: Option<String> = None;

    for part in folder.split('/') {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        raw_route.push('/');
        raw_route.push_str(strip_order_prefix(part));

        let is_target = prefix == folder;
        let node = nodes.entry(prefix.clone()).or_insert_with(|| PageNode {
            path: prefix.clone(),
            file_stem: DEFAULT_STEM.to_owned(),
            extension: DEFAULT_EXTENSION.to_owned(),
            raw_route: raw_route.clone(),
            home: raw_route.trim_matches('/') == home,
            parent: parent.clone(),
            children: Vec::new(),
        });
        if is_target {
            stem.clone_into(&mut node.file_stem);
            extension.clone_into(&mut node.extension);
        }

        parent = Some(prefix.clone());
    }
}

/// SHA-256 over the sorted `(path, mtime)` listing.
///
/// `None` when any file lacks an mtime.
fn fingerprint(files: &[ContentFile]) -> Option<Fingerprint> {
    let mut entries: Vec<(&Path, f64)> = Vec::with_capacity(files.len());
    for file in files {
        entries.push((file.path.as_path(), file.mtime?));
    }
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut hasher = Sha256::new();
    for (path, mtime) in entries {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(mtime.to_bits().to_le_bytes());
    }
    Some(Fingerprint::new(hex::encode(hasher.finalize())))
}

impl ContentTree for SiteTree {
    fn language_lock(&self) -> &Mutex<()> {
        &self.language_lock
    }

    fn get(&self, path: &str) -> Option<PageNode> {
        self.snapshot().nodes.get(path).cloned()
    }

    fn all_paths(&self) -> Vec<String> {
        let active = self.active_language();
        let state = self.snapshot();
        state
            .nodes
            .keys()
            .filter(|path| {
                state
                    .variants
                    .get(path.as_str())
                    .is_some_and(|languages| languages.contains(&active))
            })
            .cloned()
            .collect()
    }

    fn active_language(&self) -> String {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_active_language(&self, code: &str) -> Result<(), TreeError> {
        if !self.languages.contains(code) {
            return Err(TreeError::UnsupportedLanguage(code.to_owned()));
        }
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = code.to_owned();
        Ok(())
    }

    fn reset_after_language_change(&self) -> Result<(), TreeError> {
        self.clear_urls();
        Ok(())
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.snapshot().fingerprint.clone()
    }

    fn url(&self, node: &PageNode) -> Result<String, ResolveError> {
        let language = self.active_language();
        if let Some(url) = self
            .urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&language)
            .and_then(|urls| urls.get(&node.path))
        {
            return Ok(url.clone());
        }

        let route = self.composer.compose(self, node, &language)?;
        let url = self.url_policy.url(&route, &language);

        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(language)
            .or_default()
            .insert(node.path.clone(), url.clone());
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use lingo_storage::MockStorage;
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(super::SiteTree: Send, Sync);

    fn storage() -> MockStorage {
        MockStorage::new()
            .with_file("01.home/default.md", "# Home")
            .with_file("01.home/default.fr.md", "---\nslug: accueil\n---\n")
            .with_file("01.home/02.about/default.md", "# About")
            .with_file("01.home/02.about/default.fr.md", "---\nslug: a-propos\n---\n")
            .with_file("02.blog/03.archive/2024/item.md", "# Archive")
    }

    fn load(storage: MockStorage) -> SiteTree {
        let languages = Languages::new(["en", "fr", "de"], Some("en")).unwrap();
        SiteTree::load(Arc::new(storage), Arc::new(languages), TreeOptions::default()).unwrap()
    }

    #[test]
    fn test_load_builds_nodes() {
        let tree = load(storage());

        let about = tree.get("01.home/02.about").unwrap();
        assert_eq!(
            about,
            PageNode {
                path: "01.home/02.about".to_owned(),
                file_stem: "default".to_owned(),
                extension: "md".to_owned(),
                raw_route: "/home/about".to_owned(),
                home: false,
                parent: Some("01.home".to_owned()),
                children: Vec::new(),
            }
        );

        let home = tree.get("01.home").unwrap();
        assert!(home.home);
        assert_eq!(home.parent, None);
        assert_eq!(home.children, vec!["01.home/02.about".to_owned()]);
    }

    #[test]
    fn test_load_creates_contentless_ancestors() {
        let tree = load(storage());

        let blog = tree.get("02.blog").unwrap();
        assert_eq!(blog.raw_route, "/blog");
        assert_eq!(blog.children, vec!["02.blog/03.archive".to_owned()]);

        let item = tree.get("02.blog/03.archive/2024").unwrap();
        assert_eq!(item.file_stem, "item");
        assert_eq!(item.raw_route, "/blog/archive/2024");
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_root_level_files_are_not_pages() {
        let tree = load(MockStorage::new().with_file("README.md", "x"));

        assert!(tree.is_empty());
    }

    #[test]
    fn test_all_paths_follow_active_language() {
        let tree = load(storage());

        assert_eq!(
            tree.all_paths(),
            vec![
                "01.home".to_owned(),
                "01.home/02.about".to_owned(),
                "02.blog/03.archive/2024".to_owned(),
            ]
        );

        tree.set_active_language("fr").unwrap();
        assert_eq!(
            tree.all_paths(),
            vec!["01.home".to_owned(), "01.home/02.about".to_owned()]
        );

        tree.set_active_language("de").unwrap();
        assert!(tree.all_paths().is_empty());
    }

    #[test]
    fn test_unknown_suffix_is_part_of_stem() {
        let tree = load(MockStorage::new().with_file("05.docs/guide.v2.md", "x"));

        assert_eq!(tree.get("05.docs").unwrap().file_stem, "guide.v2");
        assert_eq!(tree.all_paths(), vec!["05.docs".to_owned()]);
    }

    #[test]
    fn test_unsupported_language_variant_is_skipped() {
        let languages = Languages::new(["en", "fr"], Some("en")).unwrap();
        let storage = MockStorage::new()
            .with_file("01.blog/default.md", "---\nslug: blog\n---\n")
            .with_file("01.blog/default.fr.md", "---\nslug: nouvelles\n---\n")
            .with_file("01.blog/default.it.md", "---\nslug: notizie\n---\n");
        let tree =
            SiteTree::load(Arc::new(storage), Arc::new(languages), TreeOptions::default()).unwrap();
        let blog = tree.get("01.blog").unwrap();

        assert_eq!(blog.file_stem, "default");
        assert_eq!(tree.url(&blog).unwrap(), "/blog");
        tree.set_active_language("fr").unwrap();
        assert_eq!(tree.all_paths(), vec!["01.blog".to_owned()]);
        assert_eq!(tree.url(&blog).unwrap(), "/fr/nouvelles");
    }

    #[test]
    fn test_plain_file_names_the_page() {
        let tree = load(
            MockStorage::new()
                .with_file("05.docs/default.draft.md", "x")
                .with_file("05.docs/default.md", "x"),
        );

        assert_eq!(tree.get("05.docs").unwrap().file_stem, "default");
    }

    #[test]
    fn test_page_with_only_translations() {
        let tree = load(MockStorage::new().with_file("04.news/default.fr.md", "x"));

        assert!(tree.all_paths().is_empty());
        tree.set_active_language("fr").unwrap();
        assert_eq!(tree.all_paths(), vec!["04.news".to_owned()]);
    }

    #[test]
    fn test_set_unknown_language_fails() {
        let tree = load(storage());

        let err = tree.set_active_language("it").unwrap_err();

        assert!(matches!(err, TreeError::UnsupportedLanguage(code) if code == "it"));
        assert_eq!(tree.active_language(), "en");
    }

    #[test]
    fn test_url_follows_active_language() {
        let tree = load(storage());
        let about = tree.get("01.home/02.about").unwrap();

        assert_eq!(tree.url(&about).unwrap(), "/home/about");

        tree.set_active_language("fr").unwrap();
        assert_eq!(tree.url(&about).unwrap(), "/fr/accueil/a-propos");
        tree.set_active_language("en").unwrap();
        assert_eq!(tree.url(&about).unwrap(), "/home/about");
    }

    #[test]
    fn test_find_by_path_or_route() {
        let tree = load(storage());

        assert_eq!(tree.find("01.home/02.about").unwrap().path, "01.home/02.about");
        assert_eq!(tree.find("/home/about").unwrap().path, "01.home/02.about");
        assert_eq!(tree.find("home/about/").unwrap().path, "01.home/02.about");
        assert_eq!(tree.find("/").unwrap().path, "01.home");
        assert!(tree.find("/missing").is_none());
    }

    #[test]
    fn test_fingerprint_changes_on_edit() {
        let storage = Arc::new(storage());
        let languages = Arc::new(Languages::new(["en", "fr"], None).unwrap());
        let tree = SiteTree::load(
            Arc::clone(&storage) as Arc<dyn Storage>,
            languages,
            TreeOptions::default(),
        )
        .unwrap();
        let before = tree.fingerprint().unwrap();

        tree.reload().unwrap();
        assert_eq!(tree.fingerprint().unwrap(), before);

        storage.write("01.home/02.about/default.fr.md", "---\nslug: qui\n---\n");
        tree.reload().unwrap();

        let after = tree.fingerprint().unwrap();
        assert_ne!(after, before);
        assert_eq!(after.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_unavailable_without_mtime() {
        let tree = load(storage().with_file_without_mtime("03.contact/default.md", "x"));

        assert_eq!(tree.fingerprint(), None);
    }

    #[test]
    fn test_failed_reload_keeps_snapshot() {
        let storage = Arc::new(storage());
        let languages = Arc::new(Languages::new(["en"], None).unwrap());
        let tree = SiteTree::load(
            Arc::clone(&storage) as Arc<dyn Storage>,
            languages,
            TreeOptions::default(),
        )
        .unwrap();

        storage.set_unavailable(true);

        assert!(matches!(tree.reload(), Err(TreeError::Storage(_))));
        assert_eq!(tree.len(), 5);
    }
}
