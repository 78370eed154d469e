// lodestar/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lodestar")]
#[command(about = "Star-schema ETL for short-term rental listings", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 🚀 Runs the ETL pipeline (clean -> star schema -> checks -> load)
    Run {
        /// Project directory (holds lodestar.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🧹 Cleans build artifacts (target/ folder)
    Clean {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// ⚡ Executes a raw SQL query against the store (Ad-hoc)
    Query {
        query: String,
        #[arg(long, default_value = "target/lodestar.duckdb")]
        db_path: String,
    },

    /// 🔍 Inspects a store table (schema + sample rows)
    Inspect {
        /// Path to the store file
        #[arg(long, default_value = "target/lodestar.duckdb")]
        db_path: String,

        /// Table name to inspect
        #[arg(long, short)]
        table: String,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// 📊 Runs the report battery (and the project's report SQL, if any)
    Report {
        /// Project directory (holds lodestar.yaml)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_run_defaults() -> Result<()> {
        let args = Cli::parse_from(["lodestar", "run"]);
        match args.command {
            Commands::Run { project_dir } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                Ok(())
            }
            _ => bail!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_parse_query() -> Result<()> {
        let args = Cli::parse_from([
            "lodestar",
            "query",
            "SELECT 1",
            "--db-path",
            "/tmp/store.duckdb",
        ]);
        match args.command {
            Commands::Query { query, db_path } => {
                assert_eq!(query, "SELECT 1");
                assert_eq!(db_path, "/tmp/store.duckdb");
                Ok(())
            }
            _ => bail!("Expected Query command"),
        }
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from(["lodestar", "inspect", "--table", "dim_host", "--limit", "10"]);
        match args.command {
            Commands::Inspect {
                table,
                limit,
                db_path,
            } => {
                assert_eq!(table, "dim_host");
                assert_eq!(limit, 10);
                assert_eq!(db_path, "target/lodestar.duckdb");
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_cli_parse_report() -> Result<()> {
        let args = Cli::parse_from(["lodestar", "report", "--project-dir", "/tmp/project"]);
        match args.command {
            Commands::Report { project_dir } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp/project");
                Ok(())
            }
            _ => bail!("Expected Report command"),
        }
    }
}
