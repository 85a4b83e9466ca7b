//! Configured site languages.

/// A language code with its default-language flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LanguageCode<'a> {
    /// Short identifier (e.g., "fr").
    pub code: &'a str,
    /// Whether this is the site default language.
    pub is_default: bool,
}

/// Error building a [`Languages`] set.
#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    /// No languages configured.
    #[error("At least one language must be configured")]
    Empty,
    /// The default language is not one of the supported languages.
    #[error("Default language {0:?} is not supported")]
    UnknownDefault(String),
}

/// Ordered, immutable set of supported languages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Languages {
    codes: Vec<String>,
    default: String,
}

impl Languages {
    /// Create the language set.
    ///
    /// `default` falls back to the first code when `None`. Duplicate codes are
    /// dropped, keeping the first occurrence.
    pub fn new<I, S>(codes: I, default: Option<&str>) -> Result<Self, LanguageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into();
            if !unique.contains(&code) {
                unique.push(code);
            }
        }

        let default = match default {
            Some(code) if unique.iter().any(|c| c == code) => code.to_owned(),
            Some(code) => return Err(LanguageError::UnknownDefault(code.to_owned())),
            None => unique.first().cloned().ok_or(LanguageError::Empty)?,
        };

        Ok(Self {
            codes: unique,
            default,
        })
    }

    /// Site default language.
    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default
    }

    #[must_use]
    pub fn is_default(&self, code: &str) -> bool {
        self.default == code
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// Codes in configuration order.
    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn iter(&self) -> impl Iterator<Item = LanguageCode<'_>> {
        self.codes.iter().map(|code| LanguageCode {
            code,
            is_default: *code == self.default,
        })
    }
}
