//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Run scripts and follow their output live.
#[derive(Parser)]
#[command(name = "logcast")]
#[command(about = "Run scripts and tail their logs live")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_verbose_after_subcommand() {
        let cli = Cli::parse_from(["logcast", "scripts", "--verbose"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Scripts { .. })));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["logcast"]);
        assert!(cli.command.is_none());
    }
}
