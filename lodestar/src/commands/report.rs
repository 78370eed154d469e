// lodestar/src/commands/report.rs
//
// USE CASE: Run the report battery over the loaded star schema, then the
// project's operator SQL file if one is configured. Battery failure aborts;
// a failing operator statement is reported and the rest still run.

use std::path::PathBuf;

use anyhow::Context;
use lodestar_core::application::{run_battery, run_sql_file};
use lodestar_core::infrastructure::adapters::duckdb::DuckDbStore;
use lodestar_core::infrastructure::config::load_pipeline_config;

use super::render_table;

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let config = load_pipeline_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;

    let db_path = project_dir.join(&config.db_path);
    if !db_path.exists() {
        anyhow::bail!(
            "❌ Store not found at: {:?}\n👉 Have you run 'lodestar run'?",
            db_path
        );
    }
    let connector = DuckDbStore::new(&db_path.to_string_lossy())?;

    println!("📊 Report battery ({})...", config.name);
    for (title, output) in run_battery(&connector).await? {
        println!("\n── {} ──", title);
        println!("{}", render_table(&output));
    }

    let Some(report_sql) = &config.report_sql else {
        return Ok(());
    };

    let sql_path = project_dir.join(report_sql);
    println!("\n📄 Operator SQL: {:?}", sql_path);

    let mut failed = 0usize;
    for outcome in run_sql_file(&connector, &sql_path).await? {
        match outcome.result {
            Ok(output) => {
                println!("\n✅ {}", outcome.sql);
                println!("{}", render_table(&output));
            }
            Err(message) => {
                failed += 1;
                eprintln!("\n❌ {}\n   {}", outcome.sql, message);
            }
        }
    }

    if failed > 0 {
        eprintln!("\n❌ {} operator statement(s) failed.", failed);
        std::process::exit(1);
    }

    Ok(())
}
