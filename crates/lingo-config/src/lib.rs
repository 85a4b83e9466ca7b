//! Configuration management for Lingo.
//!
//! Parses `lingo.toml` with serde and discovers the file in the current
//! directory or any parent. CLI flags are applied on top through
//! [`CliSettings`].
//!
//! ```toml
//! [content]
//! source_dir = "pages"
//! cache_enabled = true
//!
//! [languages]
//! supported = ["en", "fr", "de"]
//! default = "en"
//! include_default_lang = false
//!
//! [urls]
//! home_alias = "/home"
//! hide_home_in_urls = true
//! force_lowercase = true
//! absolute = false
//! base_url = "${SITE_URL:-https://example.com}"
//! root = ""
//! append_extension = false
//! extension = "html"
//!
//! [switcher]
//! translated_urls = true
//! untranslated_pages = "none"
//! built_in_css = true
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `urls.base_url` supports `${VAR}` (error if unset) and `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the page tree directory.
    pub source_dir: Option<PathBuf>,
    /// Override the cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "lingo.toml";

/// Upper bound accepted for `urls.max_depth`.
const MAX_DEPTH_LIMIT: usize = 1024;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content configuration as written in TOML (paths are relative strings).
    content: ContentConfigRaw,
    /// Site languages.
    pub languages: LanguagesConfig,
    /// URL composition policy.
    pub urls: UrlsConfig,
    /// Language switcher behavior.
    pub switcher: SwitcherConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
    cache_enabled: Option<bool>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Root of the page tree.
    pub source_dir: PathBuf,
    /// Project data directory (`.lingo/`).
    pub project_dir: PathBuf,
    /// Whether route maps are persisted between runs.
    pub cache_enabled: bool,
}

impl ContentConfig {
    /// Cache directory (`.lingo/cache/`).
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.project_dir.join("cache")
    }
}

/// Site languages.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// Supported language codes, in switcher order.
    pub supported: Vec<String>,
    /// Default language. Falls back to the first supported language.
    pub default: Option<String>,
    /// Prefix default-language URLs with the language code too.
    pub include_default_lang: bool,
}

impl Default for LanguagesConfig {
    fn default() -> Self {
        Self {
            supported: vec!["en".to_owned()],
            default: None,
            include_default_lang: false,
        }
    }
}

impl LanguagesConfig {
    /// Effective default language.
    #[must_use]
    pub fn default_language(&self) -> Option<&str> {
        self.default
            .as_deref()
            .or_else(|| self.supported.first().map(String::as_str))
    }
}

/// What to do with an explicit `slug` front matter value that is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySlug {
    /// Use the slug derived from the folder name.
    #[default]
    Fallback,
    /// Leave the segment out of the route.
    Omit,
}

/// URL composition policy.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UrlsConfig {
    /// Route of the home page (served at the site root).
    pub home_alias: String,
    /// Drop the home page segment from the routes of its descendants.
    pub hide_home_in_urls: bool,
    /// Lowercase every composed route.
    pub force_lowercase: bool,
    /// Emit absolute URLs using `base_url`.
    pub absolute: bool,
    /// Scheme and host used for absolute URLs.
    pub base_url: Option<String>,
    /// Path prefix for relative URLs (e.g., "/site").
    pub root: String,
    /// Append `.{extension}` to every URL.
    pub append_extension: bool,
    /// Extension appended when `append_extension` is set.
    pub extension: String,
    /// Maximum ancestor chain length walked while composing a route.
    pub max_depth: usize,
    /// Handling of empty explicit slugs.
    pub empty_slug: EmptySlug,
}

impl Default for UrlsConfig {
    fn default() -> Self {
        Self {
            home_alias: "/home".to_owned(),
            hide_home_in_urls: false,
            force_lowercase: true,
            absolute: false,
            base_url: None,
            root: String::new(),
            append_extension: false,
            extension: "html".to_owned(),
            max_depth: 64,
            empty_slug: EmptySlug::default(),
        }
    }
}

/// Exposure of per-language page references in switcher data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UntranslatedPages {
    /// Do not expose page references.
    #[default]
    None,
    /// Expose a reference only when a translated file exists.
    Translated,
    /// Expose the default-language page where no translation exists.
    Default,
}

/// Language switcher behavior.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SwitcherConfig {
    /// Resolve translated URLs instead of reusing the current route.
    pub translated_urls: bool,
    /// Page reference exposure policy.
    pub untranslated_pages: UntranslatedPages,
    /// Whether the bundled switcher stylesheet should be emitted.
    pub built_in_css: bool,
}

impl Default for SwitcherConfig {
    fn default() -> Self {
        Self {
            translated_urls: true,
            untranslated_pages: UntranslatedPages::default(),
            built_in_css: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`urls.base_url`").
        field: String,
        /// Error message (e.g., "${`SITE_URL`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Language codes double as URL segments and cache keys.
fn is_valid_language_code(code: &str) -> bool {
    (2..=8).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !code.starts_with('-')
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise, searches
    /// for `lingo.toml` in the current directory and its parents, falling back
    /// to defaults.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, or if parsing,
    /// expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(cache_enabled) = settings.cache_enabled {
            self.content_resolved.cache_enabled = cache_enabled;
        }
    }

    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            languages: LanguagesConfig::default(),
            urls: UrlsConfig::default(),
            switcher: SwitcherConfig::default(),
            content_resolved: ContentConfig {
                source_dir: base.join("pages"),
                project_dir: base.join(".lingo"),
                cache_enabled: true,
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` describing the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_languages()?;
        self.validate_urls()?;
        Ok(())
    }

    fn validate_languages(&self) -> Result<(), ConfigError> {
        let languages = &self.languages;
        if languages.supported.is_empty() {
            return Err(ConfigError::Validation(
                "languages.supported cannot be empty".to_owned(),
            ));
        }

        for (i, code) in languages.supported.iter().enumerate() {
            if !is_valid_language_code(code) {
                return Err(ConfigError::Validation(format!(
                    "languages.supported contains invalid code {code:?}"
                )));
            }
            if languages.supported[..i].contains(code) {
                return Err(ConfigError::Validation(format!(
                    "languages.supported lists {code:?} twice"
                )));
            }
        }

        if let Some(default) = &languages.default
            && !languages.supported.contains(default)
        {
            return Err(ConfigError::Validation(format!(
                "languages.default {default:?} is not in languages.supported"
            )));
        }

        Ok(())
    }

    fn validate_urls(&self) -> Result<(), ConfigError> {
        let urls = &self.urls;

        if urls.absolute {
            let base_url = urls.base_url.as_deref().ok_or_else(|| {
                ConfigError::Validation("urls.absolute requires urls.base_url".to_owned())
            })?;
            require_non_empty(base_url, "urls.base_url")?;
            require_http_url(base_url, "urls.base_url")?;
        }

        if urls.append_extension {
            require_non_empty(urls.extension.trim_start_matches('.'), "urls.extension")?;
        }

        if urls.max_depth == 0 {
            return Err(ConfigError::Validation(
                "urls.max_depth must be greater than 0".to_owned(),
            ));
        }
        if urls.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Validation(format!(
                "urls.max_depth cannot exceed {MAX_DEPTH_LIMIT}"
            )));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.urls.base_url {
            self.urls.base_url = Some(expand::expand_env(url, "urls.base_url")?);
        }
        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        self.content_resolved = ContentConfig {
            source_dir: config_dir.join(self.content.source_dir.as_deref().unwrap_or("pages")),
            project_dir: config_dir.join(".lingo"),
            cache_enabled: self.content.cache_enabled.unwrap_or(true),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/site"));

        assert_eq!(config.content_resolved.source_dir, PathBuf::from("/site/pages"));
        assert_eq!(
            config.content_resolved.cache_dir(),
            PathBuf::from("/site/.lingo/cache")
        );
        assert!(config.content_resolved.cache_enabled);
        assert_eq!(config.languages.supported, vec!["en".to_owned()]);
        assert_eq!(config.languages.default_language(), Some("en"));
        assert_eq!(config.urls.home_alias, "/home");
        assert!(config.urls.force_lowercase);
        assert_eq!(config.urls.max_depth, 64);
        assert!(config.switcher.translated_urls);
        assert_eq!(config.switcher.untranslated_pages, UntranslatedPages::None);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let config = parse(
            r#"
[languages]
supported = ["en", "fr", "de"]
default = "fr"
include_default_lang = true

[urls]
home_alias = "/start"
hide_home_in_urls = true
force_lowercase = false
absolute = true
base_url = "https://example.com"
append_extension = true
extension = "htm"
max_depth = 8
empty_slug = "omit"

[switcher]
translated_urls = false
untranslated_pages = "default"
built_in_css = false
"#,
        );

        assert_eq!(config.languages.default_language(), Some("fr"));
        assert!(config.languages.include_default_lang);
        assert_eq!(config.urls.home_alias, "/start");
        assert!(config.urls.hide_home_in_urls);
        assert!(!config.urls.force_lowercase);
        assert!(config.urls.absolute);
        assert_eq!(config.urls.base_url.as_deref(), Some("https://example.com"));
        assert!(config.urls.append_extension);
        assert_eq!(config.urls.extension, "htm");
        assert_eq!(config.urls.max_depth, 8);
        assert_eq!(config.urls.empty_slug, EmptySlug::Omit);
        assert!(!config.switcher.translated_urls);
        assert_eq!(config.switcher.untranslated_pages, UntranslatedPages::Default);
        assert!(!config.switcher.built_in_css);
        config.validate().unwrap();
    }

    #[test]
    fn test_default_language_falls_back_to_first_supported() {
        let config = parse("[languages]\nsupported = [\"de\", \"en\"]\n");

        assert_eq!(config.languages.default_language(), Some("de"));
    }

    #[test]
    fn test_unknown_untranslated_pages_value_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[switcher]\nuntranslated_pages = \"all\"\n");

        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_languages() {
        let config = parse("[languages]\nsupported = []\n");

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("languages.supported"));
    }

    #[test]
    fn test_validate_rejects_invalid_code() {
        let config = parse("[languages]\nsupported = [\"en\", \"../x\"]\n");

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("invalid code"));
    }

    #[test]
    fn test_validate_rejects_duplicate_code() {
        let config = parse("[languages]\nsupported = [\"en\", \"fr\", \"en\"]\n");

        assert!(config.validate().unwrap_err().to_string().contains("twice"));
    }

    #[test]
    fn test_validate_rejects_unsupported_default() {
        let config = parse("[languages]\nsupported = [\"en\"]\ndefault = \"fr\"\n");

        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("languages.default")
        );
    }

    #[test]
    fn test_validate_absolute_requires_base_url() {
        let config = parse("[urls]\nabsolute = true\n");

        assert!(config.validate().unwrap_err().to_string().contains("base_url"));
    }

    #[test]
    fn test_validate_absolute_requires_http_base_url() {
        let config = parse("[urls]\nabsolute = true\nbase_url = \"example.com\"\n");

        assert!(
            config
                .validate()
                .unwrap_err()
                .to_string()
                .contains("http://")
        );
    }

    #[test]
    fn test_validate_rejects_zero_max_depth() {
        let config = parse("[urls]\nmax_depth = 0\n");

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_extension_when_appending() {
        let config = parse("[urls]\nappend_extension = true\nextension = \".\"\n");

        assert!(config.validate().unwrap_err().to_string().contains("urls.extension"));
    }

    #[test]
    fn test_resolve_paths() {
        let mut config = parse("[content]\nsource_dir = \"user/pages\"\ncache_enabled = false\n");

        config.resolve_paths(Path::new("/project"));

        assert_eq!(
            config.content_resolved.source_dir,
            PathBuf::from("/project/user/pages")
        );
        assert_eq!(config.content_resolved.project_dir, PathBuf::from("/project/.lingo"));
        assert!(!config.content_resolved.cache_enabled);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/site"));

        config.apply_cli_settings(&CliSettings {
            source_dir: Some(PathBuf::from("/elsewhere")),
            cache_enabled: Some(false),
        });

        assert_eq!(config.content_resolved.source_dir, PathBuf::from("/elsewhere"));
        assert!(!config.content_resolved.cache_enabled);
    }

    #[test]
    fn test_apply_empty_cli_settings_keeps_values() {
        let mut config = Config::default_with_base(Path::new("/site"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.content_resolved.source_dir, PathBuf::from("/site/pages"));
        assert!(config.content_resolved.cache_enabled);
    }

    #[test]
    fn test_load_from_file_resolves_and_validates() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("lingo.toml");
        std::fs::write(
            &path,
            "[languages]\nsupported = [\"en\", \"fr\"]\n\n[urls]\nabsolute = true\nbase_url = \"${LINGO_TEST_UNSET_URL:-https://docs.test}\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.urls.base_url.as_deref(), Some("https://docs.test"));
        assert_eq!(config.content_resolved.source_dir, tmp.path().join("pages"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("lingo.toml");
        std::fs::write(&path, "[languages]\nsupported = []\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = Config::load(Some(Path::new("/nonexistent/lingo.toml")), None).unwrap_err();

        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
