// lodestar-core/src/infrastructure/csv.rs
//
// CSV edges of the pipeline: the raw listings file on the way in, the
// cleaned dataset and the five star-schema tables as run artifacts on the
// way out. Artifacts are built in memory and written atomically.

use std::path::Path;

use crate::domain::listing::{CleanedListing, RawListing};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::connector::{SqlValue, TableData};

pub fn read_raw_listings(path: &Path) -> Result<Vec<RawListing>, InfrastructureError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<RawListing>() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn write_cleaned_csv(
    path: &Path,
    cleaned: &[CleanedListing],
) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in cleaned {
        writer.serialize(row)?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(std::io::Error::other(e.to_string())))?;
    atomic_write(path, buffer)
}

/// Writes one star-schema table (dimension or fact) as CSV. Null cells are
/// empty fields, matching the cleaned-CSV convention.
pub fn write_table_csv(path: &Path, table: &TableData) -> Result<(), InfrastructureError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.column_names())?;
    for row in &table.rows {
        let record: Vec<String> = row.iter().map(cell_to_string).collect();
        writer.write_record(&record)?;
    }
    let buffer = writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(std::io::Error::other(e.to_string())))?;
    atomic_write(path, buffer)
}

fn cell_to_string(value: &SqlValue) -> String {
    match value {
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::Real(v) => v.to_string(),
        SqlValue::Text(v) => v.clone(),
        SqlValue::Null => String::new(),
    }
}
