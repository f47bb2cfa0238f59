//! Chocolatey package installation, git and the editor first.
use anyhow::Result;

use super::environment::refresh_environment;
use super::{Context, Task, TaskResult, git_config, log_output, vscode};
use crate::resources::chocolatey::ChocolateyBootstrap;
use crate::resources::package::{ChocolateyPackage, InstallOutcome};

/// Install every configured package.
///
/// Git is installed first and configured immediately, then the editor and
/// its extensions and settings, then the remaining packages in the order
/// given.  Every install is followed by an environment refresh.
#[derive(Debug)]
pub struct InstallPackages;

impl Task for InstallPackages {
    fn name(&self) -> &str {
        "Install packages"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let config = &ctx.config;

        install_package(ctx, &config.git.package)?;
        git_config::configure_identity(ctx)?;

        install_package(ctx, &config.vscode.package)?;
        vscode::configure_editor(ctx)?;

        let remaining = config.remaining_packages();
        for name in &remaining {
            install_package(ctx, name)?;
        }

        ctx.log
            .info(&format!("{} packages installed", remaining.len() + 2));
        Ok(TaskResult::Ok)
    }
}

/// Install one package and refresh the environment so its executables
/// resolve for the next step.
///
/// # Errors
///
/// Returns an error if `choco install` fails.
pub fn install_package(ctx: &Context, name: &str) -> Result<()> {
    let env = ctx.env();
    let choco = ChocolateyBootstrap::new(&*ctx.executor, &env).executable();
    let package = ChocolateyPackage::new(name, &choco, &*ctx.executor, &env)
        .ignore_checksums(ctx.config.chocolatey.ignore_checksums);

    ctx.log.debug(&format!("installing {name}"));
    let report = package.install()?;
    log_output(ctx, &format!("{name} installation"), &report.output);
    match report.outcome {
        InstallOutcome::Confirmed => ctx.log.info(&format!("installed {name}")),
        InstallOutcome::Ambiguous => ctx.log.warn(&format!(
            "{name}: choco exited successfully but did not confirm the install"
        )),
    }

    refresh_environment(ctx);
    Ok(())
}
