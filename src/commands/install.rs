//! Command: provision this machine.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::validation::validate_all;
use crate::error::StepError;
use crate::logging::{Log, Logger};
use crate::platform::{Platform, documents_dir};
use crate::tasks::restart::{self, RestartOutcome, RestartPolicy};
use crate::tasks::{self, Context};

/// Run the install command against the real system.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the documents
/// folder cannot be located, or a fatal step fails.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Arc<Logger>) -> Result<()> {
    let config = super::load_config(global, &**log)?;
    let documents = documents_dir(global.documents.as_deref())?;
    let ctx = Context::new(
        Arc::new(config),
        Arc::new(Platform::detect()),
        Arc::clone(log) as Arc<dyn Log>,
        documents,
    );
    provision(&ctx, opts)?;
    Ok(())
}

/// Run the install pipeline and the restart step with an injected context.
///
/// The clone directory is removed and the summary printed whether or not
/// the pipeline succeeds.  The restart step only runs after a successful
/// pipeline.
///
/// # Errors
///
/// Returns the [`StepError`] of the first fatal step that failed.
pub fn provision(ctx: &Context, opts: &InstallOpts) -> Result<RestartOutcome, StepError> {
    ctx.log
        .info(&format!("pixie {} started", crate::version()));
    super::report_warnings(&validate_all(&ctx.config), &*ctx.log);

    let result = tasks::run_pipeline(&tasks::install_pipeline(), ctx);

    if let Err(e) = ctx.release_clone() {
        ctx.log
            .warn(&format!("could not remove the repository clone: {e}"));
    }
    ctx.log.print_summary();
    result?;

    ctx.log.info("pixie completed successfully");
    let policy = RestartPolicy::resolve(opts.no_restart, opts.unattended, ctx.config.unattended);
    Ok(restart::complete(ctx, policy))
}
