//! Command: validate the configuration without changing anything.
use anyhow::{Result, bail};

use crate::cli::GlobalOpts;
use crate::config::validation::validate_all;
use crate::logging::Log;

/// Load and validate the configuration, logging every warning.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or produced any
/// validation warning.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    log.stage("Checking configuration");
    let config = super::load_config(global, log)?;
    let warnings = validate_all(&config);
    super::report_warnings(&warnings, log);
    if !warnings.is_empty() {
        bail!(
            "{} has {} warning(s)",
            global.config.display(),
            warnings.len()
        );
    }
    log.info(&format!("{} is valid", global.config.display()));
    Ok(())
}
