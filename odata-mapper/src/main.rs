mod cli;
mod config;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let config = config::Config::load(cli.config.as_deref(), cli.service_root.as_deref())?;

    match cli.command {
        Commands::Metadata { pretty } => cli::commands::handle_metadata(&config, pretty),
        Commands::Get { path } => cli::commands::handle_get(&config, &path),
        Commands::Count { entity, filter } => cli::commands::handle_count(&config, &entity, &filter),
    }
}
