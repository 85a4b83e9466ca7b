//! Site-wide URL policy applied on top of composed routes.

use std::sync::Arc;

use crate::language::Languages;

/// URL settings.
#[derive(Clone, Debug, Default)]
pub struct UrlOptions {
    /// Emit absolute URLs starting with `base_url`.
    pub absolute: bool,
    /// Scheme and host (e.g., `https://example.com`).
    pub base_url: Option<String>,
    /// Path prefix of the site (e.g., `/site`).
    pub root: String,
    /// Prefix default-language URLs with the language code.
    pub include_default_lang: bool,
    /// Extension appended to every URL, without the dot.
    pub extension: Option<String>,
}

/// Turns a composed route into the externally visible URL of a language.
///
/// `url = base + lang_prefix + "/" + route + ext`, where the route part is
/// left out for the site root.
#[derive(Clone, Debug)]
pub struct UrlPolicy {
    base: String,
    include_default_lang: bool,
    extension: Option<String>,
    languages: Arc<Languages>,
}

impl UrlPolicy {
    #[must_use]
    pub fn new(options: UrlOptions, languages: Arc<Languages>) -> Self {
        let root = options.root.trim_matches('/');
        let root = if root.is_empty() {
            String::new()
        } else {
            format!("/{root}")
        };

        let base = match options.base_url.as_deref() {
            Some(base_url) if options.absolute => {
                format!("{}{root}", base_url.trim_end_matches('/'))
            }
            _ => root,
        };

        let extension = options
            .extension
            .map(|ext| ext.trim_start_matches('.').to_owned())
            .filter(|ext| !ext.is_empty());

        Self {
            base,
            include_default_lang: options.include_default_lang,
            extension,
            languages,
        }
    }

    /// Language prefix (`/fr`), empty for an unprefixed default language.
    #[must_use]
    pub fn language_prefix(&self, language: &str) -> String {
        if self.include_default_lang || !self.languages.is_default(language) {
            format!("/{language}")
        } else {
            String::new()
        }
    }

    /// URL of `route` in `language`.
    ///
    /// `route` is either empty (site root) or starts with `/`. The bare site
    /// root is always `/`, without extension.
    #[must_use]
    pub fn url(&self, route: &str, language: &str) -> String {
        let mut url = self.base.clone();
        url.push_str(&self.language_prefix(language));
        if !route.is_empty() {
            if !route.starts_with('/') {
                url.push('/');
            }
            url.push_str(route);
        }
        if url.is_empty() {
            return "/".to_owned();
        }
        if let Some(ext) = &self.extension {
            url.push('.');
            url.push_str(ext);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(options: UrlOptions) -> UrlPolicy {
        let languages = Languages::new(["en", "fr"], Some("en")).unwrap();
        UrlPolicy::new(options, Arc::new(languages))
    }

    #[test]
    fn test_default_language_has_no_prefix() {
        let policy = policy(UrlOptions::default());

        assert_eq!(policy.url("/about", "en"), "/about");
        assert_eq!(policy.url("/a-propos", "fr"), "/fr/a-propos");
    }

    #[test]
    fn test_include_default_lang() {
        let policy = policy(UrlOptions {
            include_default_lang: true,
            ..UrlOptions::default()
        });

        assert_eq!(policy.url("/about", "en"), "/en/about");
        assert_eq!(policy.url("", "en"), "/en");
    }

    #[test]
    fn test_site_root() {
        let policy = policy(UrlOptions::default());

        assert_eq!(policy.url("", "en"), "/");
        assert_eq!(policy.url("", "fr"), "/fr");
    }

    #[test]
    fn test_absolute_urls() {
        let policy = policy(UrlOptions {
            absolute: true,
            base_url: Some("https://example.com/".to_owned()),
            root: "/site/".to_owned(),
            ..UrlOptions::default()
        });

        assert_eq!(policy.url("/about", "en"), "https://example.com/site/about");
        assert_eq!(policy.url("", "fr"), "https://example.com/site/fr");
    }

    #[test]
    fn test_base_url_ignored_when_relative() {
        let policy = policy(UrlOptions {
            base_url: Some("https://example.com".to_owned()),
            root: "site".to_owned(),
            ..UrlOptions::default()
        });

        assert_eq!(policy.url("/about", "en"), "/site/about");
    }

    #[test]
    fn test_extension() {
        let policy = policy(UrlOptions {
            extension: Some(".html".to_owned()),
            ..UrlOptions::default()
        });

        assert_eq!(policy.url("/about", "en"), "/about.html");
        assert_eq!(policy.url("/a-propos", "fr"), "/fr/a-propos.html");
        assert_eq!(policy.url("", "fr"), "/fr.html");
        assert_eq!(policy.url("", "en"), "/");
    }

    #[test]
    fn test_route_without_leading_slash() {
        let policy = policy(UrlOptions::default());

        assert_eq!(policy.url("blog/post", "fr"), "/fr/blog/post");
    }
}
