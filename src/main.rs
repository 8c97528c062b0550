//! BrainSAIT journey CLI entry point.

use clap::Parser;

use brainsait_journey::cli::{commands, handle_error, load_config, Cli, Commands};
use brainsait_journey::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::execute(args, &config, cli.json).await,
        Commands::Replay(args) => commands::replay::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
