//! Command: print a shell completion script.
use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;

/// Write the completion script for `shell` to stdout.
pub fn run(shell: Shell) {
    let mut command = <Cli as CommandFactory>::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout().lock());
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn powershell_script_names_subcommands() {
        let mut command = <Cli as CommandFactory>::command();
        let mut out = Vec::new();
        clap_complete::generate(Shell::PowerShell, &mut command, "pixie", &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("pixie"));
        assert!(script.contains("install"));
        assert!(script.contains("completions"));
    }
}
