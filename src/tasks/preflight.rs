//! Preconditions checked before anything is changed.
use anyhow::Result;

use super::{Context, Task, TaskResult};
use crate::error::PlatformError;
use crate::platform::is_elevated;

/// Refuse to run anywhere but Windows.
#[derive(Debug)]
pub struct CheckPlatform;

impl Task for CheckPlatform {
    fn name(&self) -> &str {
        "Check platform"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        ctx.platform.require_windows()?;
        ctx.log.debug(&format!("platform: {}", ctx.platform.os));
        Ok(TaskResult::Ok)
    }
}

/// Refuse to run without administrative rights.
#[derive(Debug)]
pub struct CheckPrivileges;

impl Task for CheckPrivileges {
    fn name(&self) -> &str {
        "Check privileges"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !is_elevated(&*ctx.executor, &ctx.env()) {
            return Err(PlatformError::NotElevated.into());
        }
        ctx.log.debug("running with administrator privileges");
        Ok(TaskResult::Ok)
    }
}
