//! CLI entry point - the composition root.
//!
//! Tracing and settings are set up here; commands are dispatched to
//! handlers, which receive the composed `CliContext`.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use ralph_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(0);
    };

    let config = CliConfig::load(cli.config)?;
    let ctx = bootstrap(config);

    match command {
        Commands::Run(args) => return handlers::run::execute(&ctx, args).await,
        Commands::Tail { file } => handlers::tail::execute(&ctx, &file).await?,
        Commands::Logs(args) => handlers::logs::execute(args).await?,
        Commands::Parse { source } => handlers::parse::execute(&source).await?,
        Commands::Config { path, init } => handlers::config::execute(&ctx, path, init)?,
    }

    Ok(0)
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            e.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
        }
    };

    std::process::exit(code);
}
