// lodestar-core/src/domain/star/mod.rs
//
// The dimensional model: four dimension tables keyed by surrogate integers
// plus one central fact table. Rebuilt from scratch on every run, immutable
// once constructed.

pub mod check;
pub mod dimensions;
pub mod fact;

pub use check::{CheckFailure, CheckReport, validate_star};
pub use dimensions::{Dimensions, build_dimensions};
pub use fact::build_fact;

use chrono::NaiveDate;
use serde::Serialize;

use crate::ports::connector::{SqlValue, TableData};

pub const DIM_ROOM_TYPE: &str = "dim_room_type";
pub const DIM_LOCATION: &str = "dim_location";
pub const DIM_HOST: &str = "dim_host";
pub const DIM_LISTING: &str = "dim_listing";
pub const FACT_TABLE: &str = "fact_listing";

/// Column order of the fact table; also the validator's structural contract.
pub const FACT_COLUMNS: [&str; 14] = [
    "listing_key",
    "host_key",
    "location_key",
    "room_type_key",
    "price",
    "minimum_nights",
    "number_of_reviews",
    "reviews_per_month",
    "availability_365",
    "estimated_booked_days",
    "estimated_revenue",
    "price_percentile",
    "revenue_percentile",
    "last_review",
];

/// The four foreign-key columns, in check order.
pub const FACT_FK_COLUMNS: [&str; 4] =
    ["listing_key", "host_key", "location_key", "room_type_key"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomTypeRow {
    pub room_type: String,
    pub room_type_key: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRow {
    pub neighbourhood_group: String,
    pub neighbourhood: String,
    pub location_key: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRow {
    pub host_id: i64,
    pub host_name: String,
    pub calculated_host_listings_count: i64,
    pub host_key: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRow {
    pub id: i64,
    pub name: String,
    pub listing_key: i64,
}

/// One fact row: surrogate foreign keys plus measures, never natural-key
/// text. Foreign keys are optional because the fact builder uses left-join
/// semantics; the validator proves they are all present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub listing_key: Option<i64>,
    pub host_key: Option<i64>,
    pub location_key: Option<i64>,
    pub room_type_key: Option<i64>,
    pub price: f64,
    pub minimum_nights: i64,
    pub number_of_reviews: i64,
    pub reviews_per_month: f64,
    pub availability_365: i64,
    pub estimated_booked_days: i64,
    pub estimated_revenue: f64,
    pub price_percentile: f64,
    pub revenue_percentile: f64,
    pub last_review: Option<NaiveDate>,
}

/// Fact rows plus the column set they were built with. Carrying the columns
/// as data keeps the structural-completeness check honest (the original
/// model was tabular, not typed).
#[derive(Debug, Clone)]
pub struct FactTable {
    pub columns: Vec<String>,
    pub rows: Vec<FactRow>,
}

#[derive(Debug, Clone)]
pub struct StarSchema {
    pub dim_room_type: Vec<RoomTypeRow>,
    pub dim_location: Vec<LocationRow>,
    pub dim_host: Vec<HostRow>,
    pub dim_listing: Vec<ListingRow>,
    pub fact: FactTable,
}

impl StarSchema {
    /// The five tables in load order (dimensions first), typed for the
    /// persistence port. `last_review` travels as ISO text.
    pub fn tables(&self) -> Vec<TableData> {
        let mut out = Vec::with_capacity(5);

        out.push(TableData {
            name: DIM_ROOM_TYPE.to_string(),
            columns: columns(&[("room_type", "VARCHAR"), ("room_type_key", "BIGINT")]),
            rows: self
                .dim_room_type
                .iter()
                .map(|r| {
                    vec![
                        SqlValue::Text(r.room_type.clone()),
                        SqlValue::Integer(r.room_type_key),
                    ]
                })
                .collect(),
        });

        out.push(TableData {
            name: DIM_LOCATION.to_string(),
            columns: columns(&[
                ("neighbourhood_group", "VARCHAR"),
                ("neighbourhood", "VARCHAR"),
                ("location_key", "BIGINT"),
            ]),
            rows: self
                .dim_location
                .iter()
                .map(|r| {
                    vec![
                        SqlValue::Text(r.neighbourhood_group.clone()),
                        SqlValue::Text(r.neighbourhood.clone()),
                        SqlValue::Integer(r.location_key),
                    ]
                })
                .collect(),
        });

        out.push(TableData {
            name: DIM_HOST.to_string(),
            columns: columns(&[
                ("host_id", "BIGINT"),
                ("host_name", "VARCHAR"),
                ("calculated_host_listings_count", "BIGINT"),
                ("host_key", "BIGINT"),
            ]),
            rows: self
                .dim_host
                .iter()
                .map(|r| {
                    vec![
                        SqlValue::Integer(r.host_id),
                        SqlValue::Text(r.host_name.clone()),
                        SqlValue::Integer(r.calculated_host_listings_count),
                        SqlValue::Integer(r.host_key),
                    ]
                })
                .collect(),
        });

        out.push(TableData {
            name: DIM_LISTING.to_string(),
            columns: columns(&[
                ("id", "BIGINT"),
                ("name", "VARCHAR"),
                ("listing_key", "BIGINT"),
            ]),
            rows: self
                .dim_listing
                .iter()
                .map(|r| {
                    vec![
                        SqlValue::Integer(r.id),
                        SqlValue::Text(r.name.clone()),
                        SqlValue::Integer(r.listing_key),
                    ]
                })
                .collect(),
        });

        out.push(TableData {
            name: FACT_TABLE.to_string(),
            columns: columns(&[
                ("listing_key", "BIGINT"),
                ("host_key", "BIGINT"),
                ("location_key", "BIGINT"),
                ("room_type_key", "BIGINT"),
                ("price", "DOUBLE"),
                ("minimum_nights", "BIGINT"),
                ("number_of_reviews", "BIGINT"),
                ("reviews_per_month", "DOUBLE"),
                ("availability_365", "BIGINT"),
                ("estimated_booked_days", "BIGINT"),
                ("estimated_revenue", "DOUBLE"),
                ("price_percentile", "DOUBLE"),
                ("revenue_percentile", "DOUBLE"),
                ("last_review", "VARCHAR"),
            ]),
            rows: self.fact.rows.iter().map(fact_row_values).collect(),
        });

        out
    }
}

fn columns(defs: &[(&str, &str)]) -> Vec<(String, String)> {
    defs.iter()
        .map(|(name, ty)| (name.to_string(), ty.to_string()))
        .collect()
}

fn fact_row_values(row: &FactRow) -> Vec<SqlValue> {
    fn key(k: Option<i64>) -> SqlValue {
        k.map_or(SqlValue::Null, SqlValue::Integer)
    }
    vec![
        key(row.listing_key),
        key(row.host_key),
        key(row.location_key),
        key(row.room_type_key),
        SqlValue::Real(row.price),
        SqlValue::Integer(row.minimum_nights),
        SqlValue::Integer(row.number_of_reviews),
        SqlValue::Real(row.reviews_per_month),
        SqlValue::Integer(row.availability_365),
        SqlValue::Integer(row.estimated_booked_days),
        SqlValue::Real(row.estimated_revenue),
        SqlValue::Real(row.price_percentile),
        SqlValue::Real(row.revenue_percentile),
        row.last_review
            .map_or(SqlValue::Null, |d| SqlValue::Text(d.format("%Y-%m-%d").to_string())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_cover_the_whole_schema_in_load_order() {
        let star = StarSchema {
            dim_room_type: vec![RoomTypeRow {
                room_type: "Private room".into(),
                room_type_key: 1,
            }],
            dim_location: vec![],
            dim_host: vec![],
            dim_listing: vec![],
            fact: FactTable {
                columns: FACT_COLUMNS.iter().map(|c| c.to_string()).collect(),
                rows: vec![],
            },
        };
        let tables = star.tables();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![DIM_ROOM_TYPE, DIM_LOCATION, DIM_HOST, DIM_LISTING, FACT_TABLE]
        );
        assert_eq!(tables[4].column_names(), FACT_COLUMNS.to_vec());
    }

    #[test]
    fn test_fact_row_null_keys_become_sql_nulls() {
        let row = FactRow {
            listing_key: Some(1),
            host_key: None,
            location_key: Some(2),
            room_type_key: Some(3),
            price: 100.0,
            minimum_nights: 1,
            number_of_reviews: 0,
            reviews_per_month: 0.0,
            availability_365: 0,
            estimated_booked_days: 365,
            estimated_revenue: 36_500.0,
            price_percentile: 0.5,
            revenue_percentile: 0.5,
            last_review: None,
        };
        let values = fact_row_values(&row);
        assert_eq!(values[0], SqlValue::Integer(1));
        assert_eq!(values[1], SqlValue::Null);
        assert_eq!(values[13], SqlValue::Null);
    }
}
