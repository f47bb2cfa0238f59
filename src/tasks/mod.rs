//! Named pipeline steps that orchestrate resource changes.
pub mod apps;
pub mod chocolatey;
pub mod context;
pub mod directories;
pub mod environment;
pub mod git_config;
pub mod packages;
pub mod preflight;
mod processing;
pub mod repository;
pub mod restart;
pub mod vscode;

pub use context::Context;
pub use processing::{TaskResult, TaskStats, log_output, process_resource, soft};

use anyhow::Result;

use crate::error::{Severity, StepError};
use crate::logging::TaskStatus;

/// A named, executable pipeline step.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// How a failure of this task affects the run.  Fatal unless overridden.
    fn severity(&self) -> Severity {
        Severity::Fatal
    }

    /// Whether this task has anything to do for this run.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails, a file operation is not
    /// permitted, or a precondition does not hold.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// The install pipeline, in execution order.
#[must_use]
pub fn install_pipeline() -> Vec<Box<dyn Task>> {
    vec![
        Box::new(preflight::CheckPlatform),
        Box::new(preflight::CheckPrivileges),
        Box::new(chocolatey::BootstrapChocolatey),
        Box::new(directories::CreateDirectories),
        Box::new(repository::FetchRepository),
        Box::new(repository::CopyAssets),
        Box::new(packages::InstallPackages),
        Box::new(apps::ConfigureApps),
    ]
}

/// Execute a task, recording the result in the logger.
///
/// Soft failures are logged and recorded as warnings.  Fatal failures are
/// recorded and returned for the caller to report.
///
/// # Errors
///
/// Returns a [`StepError`] naming the task when a fatal task fails.
pub fn execute(task: &dyn Task, ctx: &Context) -> Result<(), StepError> {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return Ok(());
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
        }
        Ok(TaskResult::Degraded(summary)) => {
            ctx.log
                .warn(&format!("{} completed with errors: {summary}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Warned, Some(&summary));
        }
        Err(e) if !task.severity().is_fatal() => {
            ctx.log
                .error(&format!("{} failed (continuing): {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Warned, Some(&format!("{e:#}")));
        }
        Err(e) => {
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            return Err(StepError::new(task.name(), e));
        }
    }
    Ok(())
}

/// Execute `tasks` in order, stopping at the first fatal failure.
///
/// # Errors
///
/// Returns the [`StepError`] of the first fatal task that failed.
pub fn run_pipeline(tasks: &[Box<dyn Task>], ctx: &Context) -> Result<(), StepError> {
    for task in tasks {
        execute(&**task, ctx)?;
    }
    Ok(())
}
