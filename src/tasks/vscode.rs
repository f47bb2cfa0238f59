//! Editor extensions and settings, applied right after the editor is
//! installed.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, TaskStats, log_output, process_resource};
use crate::resources::ResourceState;
use crate::resources::fs::FileCopyResource;
use crate::resources::vscode_extension::{
    VsCodeExtensionResource, find_code, installed_extensions,
};

/// Install the configured extensions, then copy the settings file out of
/// the clone.
///
/// # Errors
///
/// Returns an error if the editor cannot be found, any extension fails to
/// install, the settings path cannot be expanded or the copy fails.
pub fn configure_editor(ctx: &Context) -> Result<()> {
    install_extensions(ctx)?;
    copy_settings(ctx)
}

fn install_extensions(ctx: &Context) -> Result<()> {
    let extensions = &ctx.config.vscode.extensions;
    if extensions.is_empty() {
        ctx.log.debug("no editor extensions configured");
        return Ok(());
    }

    let env = ctx.env();
    let code = find_code(&*ctx.executor, &env)?;
    let installed = installed_extensions(&code, &*ctx.executor, &env)?;

    let mut stats = TaskStats::new();
    for id in extensions {
        let resource = VsCodeExtensionResource::new(id, &code, &*ctx.executor, &env);
        if resource.state_from_installed(&installed) == ResourceState::Correct {
            ctx.log.debug(&format!("ok: {id} (already installed)"));
            stats.already_ok += 1;
            continue;
        }
        let output = resource.install()?;
        log_output(ctx, &format!("{id} installation"), &output);
        ctx.log.info(&format!("installed extension {id}"));
        stats.changed += 1;
    }
    ctx.log.info(&format!("editor extensions: {}", stats.summary()));
    Ok(())
}

fn copy_settings(ctx: &Context) -> Result<()> {
    let editor = &ctx.config.vscode;
    if editor.settings_path.trim().is_empty() {
        ctx.log.debug("no editor settings path configured");
        return Ok(());
    }
    let Some(clone) = ctx.clone_dir() else {
        ctx.log
            .debug("no repository was fetched, skipping editor settings");
        return Ok(());
    };

    let destination = PathBuf::from(ctx.env().expand(&editor.settings_path)?);
    let resource = FileCopyResource::new(clone.join(&editor.settings_source), destination);
    process_resource(ctx, &resource, "copied")?;
    Ok(())
}
