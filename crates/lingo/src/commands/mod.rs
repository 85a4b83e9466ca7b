//! CLI command implementations.

pub(crate) mod routes;
pub(crate) mod switcher;

use std::path::PathBuf;

use clap::Args;
use lingo_config::{CliSettings, Config};

use crate::engine::Engine;
use crate::error::CliError;
use crate::output::Output;

pub(crate) use routes::RoutesArgs;
pub(crate) use switcher::SwitcherArgs;

/// Site options shared by every command.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover lingo.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Page tree directory (overrides config).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Enable caching (default: enabled).
    #[arg(long)]
    cache: Option<bool>,

    /// Disable caching.
    #[arg(long, conflicts_with = "cache")]
    no_cache: bool,

    /// Enable verbose output (show cache statistics and build logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    /// Load configuration and open the site it describes.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the page tree cannot be
    /// scanned.
    pub(crate) fn open(&self, version: &str, output: &Output) -> Result<Engine, CliError> {
        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            cache_enabled: self.resolve_cache_enabled(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if self.verbose {
            output.info(&format!(
                "Source directory: {}",
                config.content_resolved.source_dir.display()
            ));
            if config.content_resolved.cache_enabled {
                output.info(&format!(
                    "Cache directory: {}",
                    config.content_resolved.cache_dir().display()
                ));
            } else {
                output.info("Cache: disabled");
            }
        }

        Engine::open(&config, version)
    }

    /// Resolve `cache_enabled` from --cache/--no-cache flags.
    fn resolve_cache_enabled(&self) -> Option<bool> {
        self.no_cache.then_some(false).or(self.cache)
    }
}

/// Print cache statistics of a finished command.
pub(crate) fn report_cache_stats(engine: &Engine, output: &Output) {
    let stats = engine.switcher.cache_stats();
    output.highlight(&format!(
        "Route maps: {} built, {} cached, {} from disk",
        stats.builds, stats.hits, stats.persisted_hits
    ));
}
