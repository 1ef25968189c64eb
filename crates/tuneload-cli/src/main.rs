//! CLI entry point - the composition root.
//!
//! Parses arguments, installs logging, bootstraps the context and routes
//! each subcommand to its handler. Errors are mapped to exit codes here.

use std::process::ExitCode;

use clap::Parser;

use tuneload_cli::bootstrap::CliConfig;
use tuneload_cli::handlers::{self, fetch::FetchArgs};
use tuneload_cli::{Cli, CliError, Commands, bootstrap, logging};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            eprintln!("Error: {err:#}");
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig {
        data_dir: cli.data_dir,
    };

    match cli.command {
        Commands::Fetch {
            tracks,
            concurrency,
            force,
        } => {
            let ctx = bootstrap(config).await?;
            let args = FetchArgs {
                tracks,
                concurrency,
                force,
            };
            handlers::fetch::execute(&ctx, args).await?.ensure_success()?;
        }
        Commands::List { json } => {
            let ctx = bootstrap(config).await?;
            handlers::list::execute(&ctx, json).await?;
        }
        Commands::Remove { id, keep_file } => {
            let ctx = bootstrap(config).await?;
            handlers::remove::execute(&ctx, &id, keep_file).await?;
        }
        // No database needed
        Commands::Paths => handlers::paths::execute(config.data_dir.as_deref())?,
    }

    Ok(())
}
