// lodestar/src/main.rs

mod cli;
mod commands;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug lodestar run ... to see the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { project_dir } => commands::run::execute(project_dir).await,
        Commands::Clean { project_dir } => commands::clean::execute(project_dir),
        Commands::Query { query, db_path } => commands::query::execute(query, db_path).await,
        Commands::Inspect {
            db_path,
            table,
            limit,
        } => commands::inspect::execute(db_path, table, limit).await,
        Commands::Report { project_dir } => commands::report::execute(project_dir).await,
    }
}
