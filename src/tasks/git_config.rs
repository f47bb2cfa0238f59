//! Global git identity, applied right after git is installed.
use anyhow::Result;

use super::{Context, TaskStats, log_output};
use crate::resources::ResourceState;
use crate::resources::git_config::{GitConfigResource, find_git};

/// Set `user.name` and `user.email` globally.  Does nothing when neither is
/// configured.
///
/// # Errors
///
/// Returns an error if git cannot be found or a `git config` call fails.
pub fn configure_identity(ctx: &Context) -> Result<()> {
    let settings = ctx.config.git.settings();
    if settings.is_empty() {
        ctx.log.debug("no git identity configured");
        return Ok(());
    }

    let env = ctx.env();
    let git = find_git(&*ctx.executor, &env)?;
    ctx.log.debug(&format!("using git at {}", git.display()));

    let mut stats = TaskStats::new();
    for (key, value) in settings {
        let resource = GitConfigResource::new(key, value, &git, &*ctx.executor, &env);
        if resource.current_state()? == ResourceState::Correct {
            ctx.log.debug(&format!("ok: {}", resource.description()));
            stats.already_ok += 1;
            continue;
        }
        let output = resource.set()?;
        log_output(ctx, &format!("git config {key}"), &output);
        ctx.log.info(&format!("set {}", resource.description()));
        stats.changed += 1;
    }
    ctx.log.info(&format!("git identity: {}", stats.summary()));
    Ok(())
}
