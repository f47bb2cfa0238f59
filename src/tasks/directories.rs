use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult, TaskStats};

/// Create the configured directories under Documents.
#[derive(Debug)]
pub struct CreateDirectories;

impl Task for CreateDirectories {
    fn name(&self) -> &str {
        "Create directories"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.dirs.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut stats = TaskStats::new();
        for dir in &ctx.config.dirs {
            let path = ctx.documents.join(dir);
            if path.is_dir() {
                ctx.log.debug(&format!("ok: {}", path.display()));
                stats.already_ok += 1;
                continue;
            }
            std::fs::create_dir_all(&path)
                .with_context(|| format!("creating directory {}", path.display()))?;
            ctx.log.info(&format!("created {}", path.display()));
            stats.changed += 1;
        }
        Ok(stats.finish(ctx))
    }
}
