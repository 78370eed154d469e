// lodestar-core/src/application/report.rs
//
// The reporting battery: a fixed set of analytical queries over the star
// schema, plus an optional operator-supplied SQL file. A statement error in
// the file is reported per statement and does not abort the battery (the
// store is read-only at this stage, there is nothing to roll back).

use std::path::Path;

use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::error::EtlError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::connector::{Connector, QueryOutput};

pub struct Report {
    pub title: &'static str,
    pub sql: &'static str,
}

pub const BATTERY: [Report; 5] = [
    Report {
        title: "Table row counts",
        sql: "SELECT 'dim_room_type' AS table_name, count(*) AS row_count FROM dim_room_type \
              UNION ALL SELECT 'dim_location', count(*) FROM dim_location \
              UNION ALL SELECT 'dim_host', count(*) FROM dim_host \
              UNION ALL SELECT 'dim_listing', count(*) FROM dim_listing \
              UNION ALL SELECT 'fact_listing', count(*) FROM fact_listing",
    },
    Report {
        title: "KPI medians",
        sql: "SELECT median(price) AS median_price, \
              median(estimated_booked_days) AS median_booked_days, \
              median(estimated_revenue) AS median_revenue FROM fact_listing",
    },
    Report {
        title: "Median estimated revenue by borough",
        sql: "SELECT l.neighbourhood_group, median(f.estimated_revenue) AS median_revenue \
              FROM fact_listing f JOIN dim_location l USING (location_key) \
              GROUP BY l.neighbourhood_group ORDER BY median_revenue DESC",
    },
    Report {
        title: "Average price by room type",
        sql: "SELECT r.room_type, round(avg(f.price), 2) AS avg_price, count(*) AS listings \
              FROM fact_listing f JOIN dim_room_type r USING (room_type_key) \
              GROUP BY r.room_type ORDER BY avg_price DESC",
    },
    Report {
        title: "Top 10 hosts by estimated revenue",
        sql: "SELECT h.host_id, h.host_name, round(sum(f.estimated_revenue), 2) AS total_revenue \
              FROM fact_listing f JOIN dim_host h USING (host_key) \
              GROUP BY h.host_id, h.host_name ORDER BY total_revenue DESC LIMIT 10",
    },
];

/// Runs the built-in battery. Battery queries are trusted; any failure here
/// is a real store problem and aborts.
pub async fn run_battery(
    connector: &dyn Connector,
) -> Result<Vec<(&'static str, QueryOutput)>, EtlError> {
    let mut results = Vec::with_capacity(BATTERY.len());
    for report in &BATTERY {
        let output = connector.query_rows(report.sql).await?;
        results.push((report.title, output));
    }
    Ok(results)
}

/// Outcome of one statement from an operator SQL file.
pub struct StatementOutcome {
    pub sql: String,
    pub result: Result<QueryOutput, String>,
}

/// Splits an operator SQL file into statements (comments handled by the
/// parser) and runs them one by one.
pub async fn run_sql_file(
    connector: &dyn Connector,
    path: &Path,
) -> Result<Vec<StatementOutcome>, EtlError> {
    let raw_sql = std::fs::read_to_string(path)
        .map_err(|e| EtlError::Infrastructure(InfrastructureError::Io(e)))?;

    let statements = split_statements(&raw_sql)?;

    let mut outcomes = Vec::with_capacity(statements.len());
    for sql in statements {
        let result = connector
            .query_rows(&sql)
            .await
            .map_err(|e| e.to_string());
        outcomes.push(StatementOutcome { sql, result });
    }
    Ok(outcomes)
}

pub fn split_statements(raw_sql: &str) -> Result<Vec<String>, EtlError> {
    let parsed = Parser::parse_sql(&GenericDialect {}, raw_sql)
        .map_err(|e| EtlError::InternalError(format!("SQL file parse error: {e}")))?;
    Ok(parsed.into_iter().map(|stmt| stmt.to_string()).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::ports::connector::{ColumnSchema, SqlValue, TableData};

    // --- MOCK CONNECTOR ---
    #[derive(Clone, Default)]
    struct MockConnector {
        pub executed_queries: Arc<Mutex<Vec<String>>>,
        pub fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn execute(&self, query: &str) -> Result<(), EtlError> {
            self.executed_queries
                .lock()
                .unwrap()
                .push(query.to_string());
            Ok(())
        }
        async fn fetch_columns(&self, _table_name: &str) -> Result<Vec<ColumnSchema>, EtlError> {
            Ok(vec![])
        }
        async fn query_scalar(&self, _query: &str) -> Result<u64, EtlError> {
            Ok(0)
        }
        async fn query_rows(&self, query: &str) -> Result<QueryOutput, EtlError> {
            if let Some(needle) = self.fail_on
                && query.contains(needle)
            {
                return Err(EtlError::InternalError("boom".into()));
            }
            self.executed_queries
                .lock()
                .unwrap()
                .push(query.to_string());
            Ok(QueryOutput::default())
        }
        async fn load_table(&self, _table: &TableData) -> Result<(), EtlError> {
            let _ = SqlValue::Null;
            Ok(())
        }
        fn engine_name(&self) -> &str {
            "mock"
        }
    }

    #[test]
    fn test_split_statements_handles_comments() {
        let sql = "-- row count\nSELECT count(*) FROM fact_listing;\n\
                   /* medians */ SELECT median(price) FROM fact_listing;";
        let statements = split_statements(sql).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("count"));
        assert!(statements[1].contains("median"));
    }

    #[test]
    fn test_split_statements_rejects_garbage() {
        assert!(split_statements("NOT SQL AT ALL ;;;").is_err());
    }

    #[tokio::test]
    async fn test_battery_runs_every_report() {
        let connector = MockConnector::default();
        let results = run_battery(&connector).await.unwrap();
        assert_eq!(results.len(), BATTERY.len());
        assert_eq!(results[0].0, "Table row counts");
        let queries = connector.executed_queries.lock().unwrap();
        assert_eq!(queries.len(), BATTERY.len());
    }

    #[tokio::test]
    async fn test_sql_file_statement_error_does_not_abort() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checks.sql");
        std::fs::write(
            &path,
            "SELECT count(*) FROM fact_listing;\nSELECT price FROM fact_listing;",
        )
        .unwrap();

        let connector = MockConnector {
            fail_on: Some("count"),
            ..Default::default()
        };
        let outcomes = run_sql_file(&connector, &path).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].result.is_err());
        assert!(outcomes[1].result.is_ok());
    }
}
