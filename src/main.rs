use std::io::Write as _;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use pixie::cli::{Cli, Command};
use pixie::commands;
use pixie::error::StepError;
use pixie::logging::{Logger, init_subscriber, log_file_path};
use pixie::platform::documents_dir;

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match args.command() {
        Command::Completions { shell } => {
            commands::completions::run(shell);
            ExitCode::SUCCESS
        }
        Command::Version => exit_code(commands::version::run()),
        command => run_logged(&args, &command),
    }
}

/// Run a command that writes the run log under the documents folder.
fn run_logged(args: &Cli, command: &Command) -> ExitCode {
    let log_path = match documents_dir(args.global.documents.as_deref()) {
        Ok(documents) => log_file_path(&documents),
        Err(e) => return report_setup_failure(&e.to_string()),
    };
    let Ok(_guard) = init_subscriber(args.verbose, Some(&log_path)) else {
        return report_setup_failure(&format!("cannot open {}", log_path.display()));
    };
    let log = Arc::new(Logger::new(Some(log_path)));

    let result = match command {
        Command::Install(opts) => commands::install::run(&args.global, opts, &log),
        Command::Check => commands::check::run(&args.global, &*log),
        Command::Completions { .. } | Command::Version => Ok(()),
    };

    result.map_or_else(
        |e| {
            // A step error already renders its whole cause chain.
            let message = e
                .downcast_ref::<StepError>()
                .map_or_else(|| format!("{e:#}"), ToString::to_string);
            log.error(&message);
            ExitCode::FAILURE
        },
        |()| ExitCode::SUCCESS,
    )
}

fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Logging is not available yet, so write straight to stderr.
fn report_setup_failure(detail: &str) -> ExitCode {
    let _ = writeln!(
        std::io::stderr().lock(),
        "failed to set up logging: {detail}"
    );
    ExitCode::FAILURE
}
