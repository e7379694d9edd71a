//! Rodeo CLI - catalog directory trees into table schemas.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Wrangle { root, json, out } => {
            commands::wrangle::run(root, json, out, cli.verbose)
        }

        Commands::Schema { file } => commands::schema::run(file, cli.verbose),

        Commands::Sample {
            root,
            table,
            no_vision,
            cache,
            out_dir,
            rows,
        } => commands::sample::run(root, table, no_vision, cache, out_dir, rows, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
