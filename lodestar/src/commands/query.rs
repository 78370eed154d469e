// lodestar/src/commands/query.rs
//
// USE CASE: Execute a raw SQL query against the store (ad-hoc).

use std::path::Path;

use lodestar_core::application::execute_query;
use lodestar_core::infrastructure::adapters::duckdb::DuckDbStore;

use super::render_table;

pub async fn execute(query: String, db_path: String) -> anyhow::Result<()> {
    if !Path::new(&db_path).exists() {
        anyhow::bail!(
            "❌ Store not found at: {}\n👉 Have you run 'lodestar run'?",
            db_path
        );
    }

    let connector = DuckDbStore::new(&db_path)?;

    match execute_query(&connector, &query).await {
        Ok(output) => {
            println!("{}", render_table(&output));
            println!("({} rows)", output.rows.len());
        }
        Err(e) => {
            eprintln!("❌ Query failed: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
