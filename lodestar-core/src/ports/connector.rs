// lodestar-core/src/ports/connector.rs

// This file defines what the pipeline needs from a relational store, without
// knowing how it's done. The star-schema core hands over `TableData` values
// and never sees a database handle.

use crate::error::EtlError;
use async_trait::async_trait;

// Simple struct describing a column (independent of the DB)
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}

/// A single cell value crossing the persistence boundary.
/// Dates travel as ISO-8601 text (the store keeps them queryable without
/// engine-specific date types).
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

/// A fully materialized table ready to be loaded wholesale.
/// `columns` pairs each column name with its DDL type (e.g. "BIGINT").
#[derive(Debug, Clone)]
pub struct TableData {
    pub name: String,
    pub columns: Vec<(String, String)>,
    pub rows: Vec<Vec<SqlValue>>,
}

impl TableData {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }
}

/// Stringified result set for ad-hoc queries and reports.
#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[async_trait]
pub trait Connector: Send + Sync {
    async fn execute(&self, query: &str) -> Result<(), EtlError>;

    async fn fetch_columns(&self, table_name: &str) -> Result<Vec<ColumnSchema>, EtlError>;

    async fn query_scalar(&self, query: &str) -> Result<u64, EtlError>;

    async fn query_rows(&self, query: &str) -> Result<QueryOutput, EtlError>;

    /// Recreates the table from scratch and appends every row (full refresh).
    async fn load_table(&self, table: &TableData) -> Result<(), EtlError>;

    fn engine_name(&self) -> &str;
}
