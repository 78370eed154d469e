// lodestar/src/commands/run.rs
//
// USE CASE: Run the ETL pipeline.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use lodestar_core::application::run_pipeline;
use lodestar_core::infrastructure::adapters::duckdb::DuckDbStore;
use lodestar_core::infrastructure::config::load_pipeline_config;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    // A. Load the Config (Infra)
    println!("⚙️  Loading configuration...");
    let config = load_pipeline_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    println!("   Project: {} (v{})", config.name, config.version);

    // B. Instantiate the store adapter. The store file lives under target/,
    // which may not exist yet on a first run.
    let db_path = project_dir.join(&config.db_path);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let connector = DuckDbStore::new(&db_path.to_string_lossy())
        .with_context(|| format!("Failed to initialize DuckDB at {:?}", db_path))?;

    // C. Run the Pipeline (Application Layer)
    let result = run_pipeline(&project_dir, &config, &connector).await;

    match result {
        Ok(run_res) => {
            if run_res.success {
                println!("\n✨ SUCCESS! Pipeline finished in {:.2?}", start.elapsed());
            } else {
                eprintln!("\n❌ FAILURE. {} errors.", run_res.errors.len());
                std::process::exit(1);
            }
        }
        Err(e) => {
            // Rendered as a miette report so the check codes and help text
            // written in the core reach the operator.
            eprintln!("\n💥 CRITICAL PIPELINE ERROR: {:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }

    Ok(())
}
