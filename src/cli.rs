//! Command-line interface (clap derive).
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Default configuration file, resolved against the working directory.
pub const DEFAULT_CONFIG: &str = "pixie.toml";

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "pixie",
    about = "Provision a fresh Windows machine from a configuration repository",
    version
)]
pub struct Cli {
    /// Subcommand to run; `install` when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// The subcommand to run, defaulting to `install`.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Install(InstallOpts::default()))
    }
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Override the documents folder (default: <USERPROFILE>/Documents)
    #[arg(long, global = true)]
    pub documents: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Provision this machine
    Install(InstallOpts),
    /// Validate the configuration file without changing anything
    Check,
    /// Print a shell completion script
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Restart without asking once provisioning succeeds
    #[arg(long, conflicts_with = "no_restart")]
    pub unattended: bool,

    /// Finish without restarting or asking to restart
    #[arg(long)]
    pub no_restart: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        <Cli as CommandFactory>::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_install() {
        let cli = Cli::parse_from(["pixie"]);
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command(),
            Command::Install(InstallOpts {
                unattended: false,
                no_restart: false
            })
        ));
    }

    #[test]
    fn default_config_path() {
        let cli = Cli::parse_from(["pixie", "install"]);
        assert_eq!(cli.global.config, PathBuf::from("pixie.toml"));
        assert!(cli.global.documents.is_none());
    }

    #[test]
    fn parse_config_short_and_documents() {
        let cli = Cli::parse_from(["pixie", "-c", "C:/setup/pixie.toml", "--documents", "D:/Docs", "check"]);
        assert_eq!(cli.global.config, PathBuf::from("C:/setup/pixie.toml"));
        assert_eq!(cli.global.documents, Some(PathBuf::from("D:/Docs")));
        assert!(matches!(cli.command(), Command::Check));
    }

    #[test]
    fn parse_install_flags() {
        let cli = Cli::parse_from(["pixie", "install", "--unattended"]);
        assert!(matches!(
            cli.command(),
            Command::Install(InstallOpts {
                unattended: true,
                no_restart: false
            })
        ));

        let cli = Cli::parse_from(["pixie", "install", "--no-restart"]);
        assert!(matches!(
            cli.command(),
            Command::Install(InstallOpts {
                no_restart: true,
                ..
            })
        ));
    }

    #[test]
    fn unattended_conflicts_with_no_restart() {
        let result = Cli::try_parse_from(["pixie", "install", "--unattended", "--no-restart"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["pixie", "completions", "powershell"]);
        assert!(matches!(
            cli.command(),
            Command::Completions {
                shell: Shell::PowerShell
            }
        ));
    }

    #[test]
    fn parse_verbose_after_subcommand() {
        let cli = Cli::parse_from(["pixie", "install", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["pixie", "version"]);
        assert!(matches!(cli.command(), Command::Version));
    }
}
