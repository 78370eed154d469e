// lodestar-core/src/infrastructure/adapters/duckdb.rs

use async_trait::async_trait;
use duckdb::types::{ToSqlOutput, Value, ValueRef};
use duckdb::{Config, Connection, ToSql};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::EtlError;
use crate::infrastructure::error::{DatabaseError, InfrastructureError};
use crate::ports::connector::{ColumnSchema, Connector, QueryOutput, SqlValue, TableData};

pub struct DuckDbStore {
    conn: Arc<Mutex<Connection>>,
}

impl DuckDbStore {
    pub fn new(db_path: &str) -> Result<Self, InfrastructureError> {
        let config = Config::default();

        let conn = if db_path == ":memory:" {
            Connection::open_in_memory_with_flags(config)?
        } else {
            Connection::open_with_flags(db_path, config)?
        };

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, EtlError> {
        self.conn.lock().map_err(|_| {
            EtlError::Infrastructure(InfrastructureError::Io(std::io::Error::other(
                "DuckDB Mutex Poisoned",
            )))
        })
    }
}

fn db_err(e: duckdb::Error) -> EtlError {
    EtlError::Infrastructure(InfrastructureError::Database(DatabaseError::DuckDB(e)))
}

// Cell adapter so the port type stays engine-agnostic.
struct Param<'a>(&'a SqlValue);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        match self.0 {
            SqlValue::Integer(v) => v.to_sql(),
            SqlValue::Real(v) => v.to_sql(),
            SqlValue::Text(v) => v.to_sql(),
            SqlValue::Null => Ok(ToSqlOutput::Owned(Value::Null)),
        }
    }
}

fn format_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Boolean(v) => v.to_string(),
        ValueRef::TinyInt(v) => v.to_string(),
        ValueRef::SmallInt(v) => v.to_string(),
        ValueRef::Int(v) => v.to_string(),
        ValueRef::BigInt(v) => v.to_string(),
        ValueRef::Float(v) => v.to_string(),
        ValueRef::Double(v) => v.to_string(),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        other => format!("{other:?}"),
    }
}

#[async_trait]
impl Connector for DuckDbStore {
    async fn execute(&self, query: &str) -> Result<(), EtlError> {
        let conn = self.lock()?;
        conn.execute(query, []).map(|_rows| ()).map_err(db_err)
    }

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, EtlError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info('{}')", table_name))
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnSchema {
                    name: row.get("name")?,
                    data_type: row.get("type")?,
                    is_nullable: !row.get::<_, bool>("notnull")?,
                })
            })
            .map_err(db_err)?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(db_err)?);
        }

        Ok(columns)
    }

    async fn query_scalar(&self, query: &str) -> Result<u64, EtlError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query).map_err(db_err)?;

        let mut rows = stmt.query([]).map_err(db_err)?;
        let row = rows
            .next()
            .map_err(db_err)?
            .ok_or_else(|| EtlError::InternalError("No scalar value returned".into()))?;

        row.get(0).map_err(db_err)
    }

    async fn query_rows(&self, query: &str) -> Result<QueryOutput, EtlError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(query).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;

        let mut output = QueryOutput::default();
        while let Some(row) = rows.next().map_err(db_err)? {
            if output.columns.is_empty() {
                output.columns = row
                    .as_ref()
                    .column_names()
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
            }
            let width = row.as_ref().column_count();
            let values: Vec<String> = (0..width)
                .map(|i| match row.get_ref(i) {
                    Ok(value) => format_value(value),
                    Err(_) => "ERROR".to_string(),
                })
                .collect();
            output.rows.push(values);
        }

        Ok(output)
    }

    async fn load_table(&self, table: &TableData) -> Result<(), EtlError> {
        let column_defs: Vec<String> = table
            .columns
            .iter()
            .map(|(name, sql_type)| format!("\"{}\" {}", name, sql_type))
            .collect();
        let ddl = format!(
            "CREATE OR REPLACE TABLE \"{}\" ({})",
            table.name,
            column_defs.join(", ")
        );

        let conn = self.lock()?;
        conn.execute(&ddl, []).map_err(db_err)?;

        let mut appender = conn.appender(&table.name).map_err(db_err)?;
        for row in &table.rows {
            let params: Vec<Param<'_>> = row.iter().map(Param).collect();
            appender
                .append_row(duckdb::params_from_iter(params))
                .map_err(db_err)?;
        }
        appender.flush().map_err(db_err)?;

        Ok(())
    }

    fn engine_name(&self) -> &str {
        "duckdb"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn sample_table() -> TableData {
        TableData {
            name: "dim_room_type".into(),
            columns: vec![
                ("room_type".into(), "VARCHAR".into()),
                ("room_type_key".into(), "BIGINT".into()),
            ],
            rows: vec![
                vec![
                    SqlValue::Text("Entire home/apt".into()),
                    SqlValue::Integer(1),
                ],
                vec![SqlValue::Text("Private room".into()), SqlValue::Integer(2)],
            ],
        }
    }

    #[tokio::test]
    async fn test_load_table_round_trip() -> Result<()> {
        let store = DuckDbStore::new(":memory:")?;

        store.load_table(&sample_table()).await?;

        let count = store
            .query_scalar("SELECT count(*) FROM dim_room_type")
            .await?;
        assert_eq!(count, 2);

        let columns = store.fetch_columns("dim_room_type").await?;
        assert_eq!(columns.len(), 2);
        let key_col = columns
            .iter()
            .find(|c| c.name == "room_type_key")
            .ok_or_else(|| anyhow::anyhow!("Column 'room_type_key' not found"))?;
        assert_eq!(key_col.data_type, "BIGINT");
        Ok(())
    }

    #[tokio::test]
    async fn test_load_table_is_a_full_refresh() -> Result<()> {
        let store = DuckDbStore::new(":memory:")?;

        store.load_table(&sample_table()).await?;
        store.load_table(&sample_table()).await?;

        let count = store
            .query_scalar("SELECT count(*) FROM dim_room_type")
            .await?;
        assert_eq!(count, 2, "reload must replace, not append");
        Ok(())
    }

    #[tokio::test]
    async fn test_null_cells_survive_the_load() -> Result<()> {
        let store = DuckDbStore::new(":memory:")?;
        let mut table = sample_table();
        table.rows.push(vec![SqlValue::Null, SqlValue::Integer(3)]);

        store.load_table(&table).await?;

        let nulls = store
            .query_scalar("SELECT count(*) FROM dim_room_type WHERE room_type IS NULL")
            .await?;
        assert_eq!(nulls, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_query_rows_stringifies_results() -> Result<()> {
        let store = DuckDbStore::new(":memory:")?;
        store.load_table(&sample_table()).await?;

        let output = store
            .query_rows("SELECT room_type, room_type_key FROM dim_room_type ORDER BY room_type_key")
            .await?;
        assert_eq!(output.columns, vec!["room_type", "room_type_key"]);
        assert_eq!(output.rows[0], vec!["Entire home/apt", "1"]);
        assert_eq!(output.rows[1], vec!["Private room", "2"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_sql_is_an_error() -> Result<()> {
        let store = DuckDbStore::new(":memory:")?;
        let result = store.execute("SELECT * FROM non_existent_table").await;
        assert!(result.is_err());
        Ok(())
    }
}
