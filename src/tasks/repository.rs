//! Fetching the configuration repository and copying its asset tree.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::repository::clone_to_temp;
use crate::resources::fs::copy_tree;

/// Clone the configuration repository into a temporary directory held by the
/// context until the run ends.
#[derive(Debug)]
pub struct FetchRepository;

impl Task for FetchRepository {
    fn name(&self) -> &str {
        "Fetch repository"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.repo_url.trim().is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let url = ctx.config.repo_url.trim();
        ctx.log.info(&format!("cloning {url}"));
        let dir = clone_to_temp(&*ctx.cloner, url)?;
        ctx.log.debug(&format!("cloned into {}", dir.path().display()));
        ctx.hold_clone(dir);
        Ok(TaskResult::Ok)
    }
}

/// Copy the asset tree from the clone into Documents.
#[derive(Debug)]
pub struct CopyAssets;

impl Task for CopyAssets {
    fn name(&self) -> &str {
        "Copy assets"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.clone_dir().is_some()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let Some(clone) = ctx.clone_dir() else {
            return Ok(TaskResult::Skipped("no repository was fetched".to_string()));
        };
        let src = clone.join(&ctx.config.assets.source);
        let dst = ctx.documents.join(&ctx.config.assets.destination);

        let copied = copy_tree(&src, &dst, &mut |file| {
            ctx.log.debug(&format!("copied {}", file.display()));
        })?;
        ctx.log
            .info(&format!("copied {copied} files to {}", dst.display()));
        Ok(TaskResult::Ok)
    }
}
