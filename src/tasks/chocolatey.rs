use anyhow::{Context as _, Result};

use super::environment::refresh_environment;
use super::{Context, Task, TaskResult, log_output};
use crate::resources::chocolatey::{ChocolateyBootstrap, bin_dir};

/// Install Chocolatey unless it is already on `PATH`.
#[derive(Debug)]
pub struct BootstrapChocolatey;

impl Task for BootstrapChocolatey {
    fn name(&self) -> &str {
        "Bootstrap Chocolatey"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let env = ctx.env();
        let choco = ChocolateyBootstrap::new(&*ctx.executor, &env);
        if choco.is_installed() {
            return Ok(TaskResult::Skipped("Chocolatey is already installed".to_string()));
        }

        ctx.log.info("installing Chocolatey");
        let output = choco.bootstrap()?;
        log_output(ctx, "Chocolatey install script", &output);

        refresh_environment(ctx);

        let mut env = ctx.env();
        let version = ChocolateyBootstrap::new(&*ctx.executor, &env)
            .version()
            .context("Chocolatey was installed but cannot be run")?;
        let bin = bin_dir(&env);
        env.append_path(&bin);
        ctx.set_env(env);

        ctx.log.info(&format!("Chocolatey {version} installed"));
        Ok(TaskResult::Ok)
    }
}
