//! `lingo routes` command implementation.

use std::collections::BTreeMap;

use clap::Args;

use super::{SiteArgs, report_cache_stats};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the routes command.
#[derive(Args)]
pub(crate) struct RoutesArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Only print the route map of this language.
    #[arg(short, long)]
    lang: Option<String>,
}

impl RoutesArgs {
    /// Execute the routes command.
    ///
    /// Prints a JSON object of language code to route map, in configured
    /// language order.
    ///
    /// # Errors
    ///
    /// Returns an error if the site cannot be opened, the language is
    /// unknown, or a route map cannot be built.
    pub(crate) fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();
        let engine = self.site.open(version, &output)?;

        let languages = match self.lang.as_deref() {
            Some(code) => vec![engine.language(Some(code))?],
            None => engine.switcher.languages().codes().to_vec(),
        };

        let mut maps = BTreeMap::new();
        for language in languages {
            let map = engine.switcher.route_map(&language)?;
            if self.site.verbose {
                output.info(&format!("{language}: {} pages", map.len()));
            }
            maps.insert(language, map.routes.clone());
        }

        output.data(&serde_json::to_string_pretty(&maps)?)?;

        if self.site.verbose {
            report_cache_stats(&engine, &output);
        }

        Ok(())
    }
}
