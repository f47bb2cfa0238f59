//! Windows provisioning engine.
//!
//! Turns a fresh Windows installation into a configured workstation:
//! bootstraps Chocolatey, clones a configuration repository, creates
//! folders under Documents, copies assets, installs packages and applies
//! per-application configuration, all driven by one `pixie.toml`.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]** parse and validate `pixie.toml`
//! - **[`resources`]** idempotent `check + apply` primitives (packages, git config, files)
//! - **[`tasks`]** the named pipeline steps wired to resources
//! - **[`commands`]** top-level subcommand orchestration (`install`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod prompt;
pub mod repository;
pub mod resources;
pub mod tasks;

/// The version string: `PIXIE_VERSION` when embedded at build time, the
/// crate version otherwise.
#[must_use]
pub fn version() -> &'static str {
    option_env!("PIXIE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}
