//! CLI error types.

use lingo_config::ConfigError;
use lingo_site::{LanguageError, LanguageScopeError, SwitcherError, TreeError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Language(#[from] LanguageError),

    #[error("{0}")]
    Tree(#[from] TreeError),

    #[error("{0}")]
    Scope(#[from] LanguageScopeError),

    #[error("{0}")]
    Switcher(#[from] SwitcherError),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("{0}")]
    Validation(String),
}
