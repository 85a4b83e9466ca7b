//! `lingo switcher` command implementation.

use clap::Args;

use super::{SiteArgs, report_cache_stats};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the switcher command.
#[derive(Args)]
pub(crate) struct SwitcherArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Page to render, as a canonical path (`01.home/02.about`) or a
    /// default-language route (`/home/about`).
    page: String,

    /// Active language (default: the site default language).
    #[arg(short, long)]
    lang: Option<String>,
}

impl SwitcherArgs {
    /// Execute the switcher command.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be opened, the page or language
    /// is unknown, or the tree cannot be restored after switching.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let engine = self.site.open(version, &output)?;

        let active = engine.language(self.lang.as_deref())?;
        let page = engine
            .tree
            .find(&self.page)
            .ok_or_else(|| CliError::PageNotFound(self.page.clone()))?;

        let data = engine.switcher.assemble(&page, &active)?;
        output.data(&serde_json::to_string_pretty(&data)?)?;

        if self.site.verbose {
            report_cache_stats(&engine, &output);
        }

        Ok(())
    }
}
