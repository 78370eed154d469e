// lodestar/src/commands/inspect.rs
//
// USE CASE: Inspect a store table (schema + sample rows).

use std::path::Path;

use lodestar_core::infrastructure::adapters::duckdb::DuckDbStore;
use lodestar_core::ports::connector::Connector;

use super::render_table;

pub async fn execute(db_path: String, table: String, limit: usize) -> anyhow::Result<()> {
    if !Path::new(&db_path).exists() {
        anyhow::bail!(
            "❌ Store not found at: {}\n👉 Have you run 'lodestar run'?",
            db_path
        );
    }

    // Table names come from the operator; keep them identifier-shaped before
    // they reach a formatted statement.
    if !table
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        anyhow::bail!("❌ Invalid table name: '{}'", table);
    }

    let connector = DuckDbStore::new(&db_path)?;

    println!("\n🔍 Inspecting Table: '{}'", table);

    let columns = connector.fetch_columns(&table).await?;
    let names: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", c.name, c.data_type))
        .collect();
    println!("   Columns: [{}]", names.join(", "));

    let sample = connector
        .query_rows(&format!("SELECT * FROM {} LIMIT {}", table, limit))
        .await?;
    println!("{}", render_table(&sample));

    let total = connector
        .query_scalar(&format!("SELECT count(*) FROM {}", table))
        .await?;
    println!("({} of {} rows)", sample.rows.len(), total);

    Ok(())
}
