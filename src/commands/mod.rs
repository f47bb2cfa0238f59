//! Top-level subcommand orchestration.
pub mod check;
pub mod completions;
pub mod install;
pub mod version;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::validation::ValidationWarning;
use crate::logging::Log;

/// Load the configuration named on the command line.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or invalid.
pub fn load_config(global: &GlobalOpts, log: &dyn Log) -> Result<Config> {
    log.debug(&format!("loading {}", global.config.display()));
    let config = Config::load(&global.config).context("loading configuration")?;
    log.debug(&format!(
        "{} directories, {} packages, {} apps",
        config.dirs.len(),
        config.packages.len(),
        config.apps.len()
    ));
    Ok(config)
}

/// Log every configuration warning.
pub fn report_warnings(warnings: &[ValidationWarning], log: &dyn Log) {
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in warnings {
            log.warn(&format!("  {warning}"));
        }
    }
}
