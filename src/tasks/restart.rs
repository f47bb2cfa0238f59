//! Startup-folder cleanup and the final restart.
use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};

use super::{Context, soft};
use crate::environment::ProcessEnv;
use crate::prompt::confirm;

/// Question asked before an interactive restart.
pub const RESTART_QUESTION: &str = "Do you want to restart now? (y/n)";

/// Variables naming the roots of the per-user and all-users startup folders.
const STARTUP_ROOTS: &[&str] = &["APPDATA", "ProgramData"];

/// How the run ends once the pipeline has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Never restart.
    Skip,
    /// Restart without asking.
    Unattended,
    /// Ask on the terminal.
    Prompt,
}

impl RestartPolicy {
    /// Combine the command-line flags with the configured `unattended` flag.
    /// `--no-restart` wins over everything else.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixie::tasks::restart::RestartPolicy;
    ///
    /// assert_eq!(RestartPolicy::resolve(true, true, true), RestartPolicy::Skip);
    /// assert_eq!(RestartPolicy::resolve(false, false, true), RestartPolicy::Unattended);
    /// assert_eq!(RestartPolicy::resolve(false, false, false), RestartPolicy::Prompt);
    /// ```
    #[must_use]
    pub const fn resolve(no_restart: bool, unattended_flag: bool, unattended_config: bool) -> Self {
        if no_restart {
            Self::Skip
        } else if unattended_flag || unattended_config {
            Self::Unattended
        } else {
            Self::Prompt
        }
    }
}

/// What the restart step ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartOutcome {
    /// Restart disabled for this run.
    Skipped,
    /// The user declined the restart.
    Declined,
    /// A restart was requested from the OS.
    Restarted,
    /// The OS refused the restart request.
    RestartFailed,
}

/// The startup folder under the directory named by the variable `root`.
///
/// # Errors
///
/// Returns an error if `root` is unset or empty.
pub fn startup_folder(env: &ProcessEnv, root: &str) -> Result<PathBuf> {
    env.get(root)
        .filter(|value| !value.is_empty())
        .map(|dir| {
            ["Microsoft", "Windows", "Start Menu", "Programs", "Startup"]
                .iter()
                .fold(PathBuf::from(dir), |path, part| path.join(part))
        })
        .ok_or_else(|| anyhow!("environment variable {root} is not set"))
}

/// Remove every entry from the per-user, then the all-users startup folder.
/// Returns the number of entries removed.
///
/// # Errors
///
/// Returns an error at the first folder that cannot be located or listed;
/// folders before it have already been cleared.  Entries that cannot be
/// removed are logged and skipped.
pub fn clear_startup_folders(ctx: &Context) -> Result<usize> {
    let env = ctx.env();
    let mut removed = 0;
    for root in STARTUP_ROOTS {
        let folder = startup_folder(&env, root)?;
        let entries = ctx
            .fs_ops
            .read_dir(&folder)
            .with_context(|| format!("listing {}", folder.display()))?;
        for entry in entries {
            match ctx.fs_ops.remove(&entry) {
                Ok(()) => {
                    ctx.log.debug(&format!("removed {}", entry.display()));
                    removed += 1;
                }
                Err(e) => ctx
                    .log
                    .error(&format!("could not remove {}: {e}", entry.display())),
            }
        }
    }
    ctx.log.info(&format!("removed {removed} startup entries"));
    Ok(removed)
}

/// Ask the OS to restart immediately.  A failure is logged and reported as
/// `false`.
pub fn reboot(ctx: &Context) -> bool {
    ctx.log.info("restarting");
    match ctx.executor.run("shutdown", &["/r", "/t", "0"], &ctx.env()) {
        Ok(_) => true,
        Err(e) => {
            ctx.log.error(&format!("restart failed: {e:#}"));
            false
        }
    }
}

/// Run the restart step according to `policy`.
#[must_use]
pub fn complete(ctx: &Context, policy: RestartPolicy) -> RestartOutcome {
    match policy {
        RestartPolicy::Skip => {
            ctx.log.debug("restart disabled");
            RestartOutcome::Skipped
        }
        RestartPolicy::Unattended => restart(ctx),
        RestartPolicy::Prompt => {
            if confirm(&*ctx.prompter, RESTART_QUESTION) {
                restart(ctx)
            } else {
                ctx.log.info("restart declined");
                RestartOutcome::Declined
            }
        }
    }
}

fn restart(ctx: &Context) -> RestartOutcome {
    soft(ctx, "clearing startup folders", clear_startup_folders(ctx));
    if reboot(ctx) {
        RestartOutcome::Restarted
    } else {
        RestartOutcome::RestartFailed
    }
}
