//! Wiring of configuration, content tree and switcher.

use std::path::Path;
use std::sync::Arc;

use lingo_cache::{Cache, FileCache, NullCache};
use lingo_config::{Config, EmptySlug, UntranslatedPages as ConfigUntranslatedPages};
use lingo_site::{
    ContentTree, EmptySlugPolicy, Languages, RouteOptions, SiteTree, Switcher, SwitcherOptions,
    TreeOptions, UntranslatedPages, UrlOptions,
};
use lingo_storage::{FsStorage, Storage};

use crate::error::CliError;

/// A loaded site ready to answer switcher queries.
pub(crate) struct Engine {
    pub(crate) tree: Arc<SiteTree>,
    pub(crate) switcher: Switcher,
}

impl Engine {
    /// Scan the configured page tree and set up route map caching.
    pub(crate) fn open(config: &Config, version: &str) -> Result<Self, CliError> {
        let languages = Arc::new(Languages::new(
            config.languages.supported.iter().cloned(),
            config.languages.default.as_deref(),
        )?);

        let source_dir = &config.content_resolved.source_dir;
        if !source_dir.is_dir() {
            return Err(CliError::Validation(format!(
                "Source directory not found: {}",
                source_dir.display()
            )));
        }
        let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(source_dir.clone()));
        let tree = Arc::new(SiteTree::load(
            storage,
            Arc::clone(&languages),
            tree_options_from_config(config),
        )?);
        tracing::info!(
            pages = tree.len(),
            source_dir = %source_dir.display(),
            "Loaded content tree"
        );

        let cache: Box<dyn Cache> = if config.content_resolved.cache_enabled {
            ensure_project_dir(&config.content_resolved.project_dir)?;
            Box::new(FileCache::new(config.content_resolved.cache_dir(), version))
        } else {
            Box::new(NullCache)
        };

        let switcher = Switcher::new(
            Arc::clone(&tree) as Arc<dyn ContentTree>,
            cache.as_ref(),
            tree.locator().clone(),
            switcher_options_from_config(config),
        );

        Ok(Self { tree, switcher })
    }

    /// Validate a `--lang` value, defaulting to the site default language.
    pub(crate) fn language(&self, requested: Option<&str>) -> Result<String, CliError> {
        let languages = self.switcher.languages();
        match requested {
            Some(code) if languages.contains(code) => Ok(code.to_owned()),
            Some(code) => Err(CliError::Validation(format!(
                "Unsupported language {code:?} (configured: {})",
                languages.codes().join(", ")
            ))),
            None => Ok(languages.default_language().to_owned()),
        }
    }
}

/// Build content tree options from configuration.
pub(crate) fn tree_options_from_config(config: &Config) -> TreeOptions {
    let urls = &config.urls;
    TreeOptions {
        routes: RouteOptions {
            home_alias: urls.home_alias.clone(),
            hide_home_in_urls: urls.hide_home_in_urls,
            force_lowercase: urls.force_lowercase,
            max_depth: urls.max_depth,
        },
        urls: UrlOptions {
            absolute: urls.absolute,
            base_url: urls.base_url.clone(),
            root: urls.root.clone(),
            include_default_lang: config.languages.include_default_lang,
            extension: urls.append_extension.then(|| urls.extension.clone()),
        },
        empty_slug: match urls.empty_slug {
            EmptySlug::Fallback => EmptySlugPolicy::Fallback,
            EmptySlug::Omit => EmptySlugPolicy::Omit,
        },
    }
}

/// Build switcher options from configuration.
pub(crate) fn switcher_options_from_config(config: &Config) -> SwitcherOptions {
    SwitcherOptions {
        translated_urls: config.switcher.translated_urls,
        untranslated_pages: match config.switcher.untranslated_pages {
            ConfigUntranslatedPages::None => UntranslatedPages::None,
            ConfigUntranslatedPages::Translated => UntranslatedPages::Translated,
            ConfigUntranslatedPages::Default => UntranslatedPages::Default,
        },
        built_in_css: config.switcher.built_in_css,
    }
}

/// Ensure the `.lingo/` project directory exists with a `.gitignore`.
fn ensure_project_dir(project_dir: &Path) -> Result<(), CliError> {
    std::fs::create_dir_all(project_dir)?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        let _ = std::fs::write(&gitignore_path, "# Automatically created by lingo\n*\n");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write_site(root: &Path, config: &str) -> Config {
        let pages = root.join("pages");
        fs::create_dir_all(pages.join("01.home/02.about")).unwrap();
        fs::write(pages.join("01.home/default.md"), "# Home").unwrap();
        fs::write(pages.join("01.home/02.about/default.md"), "# About").unwrap();
        fs::write(
            pages.join("01.home/02.about/default.fr.md"),
            "---\nslug: a-propos\n---\n",
        )
        .unwrap();

        let config_path = root.join("lingo.toml");
        fs::write(&config_path, config).unwrap();
        Config::load(Some(&config_path), None).unwrap()
    }

    const SITE_CONFIG: &str = r#"
[languages]
supported = ["en", "fr", "de"]

[urls]
hide_home_in_urls = true
"#;

    #[test]
    fn test_tree_options_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(
            tmp.path(),
            r#"
[languages]
supported = ["en", "fr"]
include_default_lang = true

[urls]
home_alias = "/start"
append_extension = true
extension = "htm"
max_depth = 9
empty_slug = "omit"
"#,
        );

        let options = tree_options_from_config(&config);

        assert_eq!(options.routes.home_alias, "/start");
        assert_eq!(options.routes.max_depth, 9);
        assert!(options.urls.include_default_lang);
        assert_eq!(options.urls.extension.as_deref(), Some("htm"));
        assert_eq!(options.empty_slug, EmptySlugPolicy::Omit);
    }

    #[test]
    fn test_extension_only_when_appending() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(tmp.path(), SITE_CONFIG);

        assert_eq!(tree_options_from_config(&config).urls.extension, None);
    }

    #[test]
    fn test_switcher_options_from_config() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(
            tmp.path(),
            "[switcher]\ntranslated_urls = false\nuntranslated_pages = \"translated\"\nbuilt_in_css = false\n",
        );

        let options = switcher_options_from_config(&config);

        assert!(!options.translated_urls);
        assert_eq!(options.untranslated_pages, UntranslatedPages::Translated);
        assert!(!options.built_in_css);
    }

    #[test]
    fn test_open_and_assemble() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(tmp.path(), SITE_CONFIG);

        let engine = Engine::open(&config, "test").unwrap();
        let about = engine.tree.find("/home/about").unwrap();
        let data = engine.switcher.assemble(&about, "en").unwrap();

        let routes = data.translated_routes.unwrap();
        assert_eq!(routes["en"], "/about");
        assert_eq!(routes["fr"], "/fr/a-propos");
        assert_eq!(routes["de"], "/home/about");
        assert!(tmp.path().join(".lingo/.gitignore").exists());
    }

    #[test]
    fn test_open_without_cache_creates_no_project_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(tmp.path(), &format!("{SITE_CONFIG}\n[content]\ncache_enabled = false\n"));

        Engine::open(&config, "test").unwrap();

        assert!(!tmp.path().join(".lingo").exists());
    }

    #[test]
    fn test_open_missing_source_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(tmp.path(), "[content]\nsource_dir = \"missing\"\n");

        let err = Engine::open(&config, "test").err().unwrap();

        assert!(err.to_string().contains("Source directory not found"));
    }

    #[test]
    fn test_language_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let config = write_site(tmp.path(), SITE_CONFIG);
        let engine = Engine::open(&config, "test").unwrap();

        assert_eq!(engine.language(None).unwrap(), "en");
        assert_eq!(engine.language(Some("fr")).unwrap(), "fr");
        assert!(matches!(
            engine.language(Some("it")),
            Err(CliError::Validation(_))
        ));
    }
}
