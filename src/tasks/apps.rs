//! Per-application configuration files.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats, process_resource};
use crate::config::apps::AppEntry;
use crate::error::Severity;
use crate::resources::ResourceChange;
use crate::resources::fs::FileCopyResource;

/// Copy each application's configuration file out of the clone.  One app
/// failing does not stop the others.
#[derive(Debug)]
pub struct ConfigureApps;

impl Task for ConfigureApps {
    fn name(&self) -> &str {
        "Configure applications"
    }

    fn severity(&self) -> Severity {
        Severity::Soft
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.apps.is_empty() && ctx.clone_dir().is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(clone) = ctx.clone_dir() else {
            return Ok(TaskResult::Skipped("no repository was fetched".to_string()));
        };

        let mut stats = TaskStats::new();
        for (name, app) in &ctx.config.apps {
            match configure_app(ctx, &clone, app) {
                Ok(change) => {
                    ctx.log.info(&format!("{name} configured"));
                    stats.record(&change);
                }
                Err(e) => {
                    ctx.log.error(&format!("{name}: {e:#}"));
                    stats.failed += 1;
                }
            }
        }
        Ok(stats.finish(ctx))
    }
}

fn configure_app(ctx: &Context, clone: &std::path::Path, app: &AppEntry) -> Result<ResourceChange> {
    let destination = PathBuf::from(ctx.env().expand(&app.destination)?);
    let resource = FileCopyResource::new(clone.join(&app.source), destination);
    process_resource(ctx, &resource, "copied")
}
