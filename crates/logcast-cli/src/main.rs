//! CLI entry point - the composition root.
//!
//! Parses arguments, sets up logging and dispatches to the handlers.
//! Errors are printed once here and mapped to the process exit code.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use logcast_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Serve(args) => handlers::serve::execute(&args).await,
        Commands::Tail(args) => handlers::tail::execute(&args).await,
        Commands::Run { script, scripts } => {
            let ctx = bootstrap(&CliConfig::from(&scripts))?;
            handlers::run::execute(&ctx, &script).await.map(|_| ())
        }
        Commands::Scripts { scripts } => {
            let ctx = bootstrap(&CliConfig::from(&scripts))?;
            handlers::scripts::execute(&ctx);
            Ok(())
        }
    }
}
