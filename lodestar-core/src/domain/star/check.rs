// lodestar-core/src/domain/star/check.rs
//
// The integrity gate: a read-only pass over the constructed star schema
// that either returns a pass report or a single tagged failure naming the
// check, the table/column involved and a bounded sample of evidence. The
// orchestrator treats any failure as fatal; no remediation is attempted.

use std::collections::{BTreeMap, HashSet};

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::domain::star::{
    DIM_HOST, DIM_LISTING, DIM_LOCATION, DIM_ROOM_TYPE, FACT_COLUMNS, FACT_TABLE, FactRow,
    StarSchema,
};

/// Tolerated float error when recomputing estimated_revenue.
pub const REVENUE_EPSILON: f64 = 1e-6;
/// Upper price bound enforced by upstream cleaning.
pub const MAX_PRICE: f64 = 1000.0;
pub const MAX_AVAILABILITY: i64 = 365;
/// Cap on evidence samples carried inside a failure.
pub const SAMPLE_LIMIT: usize = 10;

#[derive(Error, Debug, Diagnostic)]
pub enum CheckFailure {
    #[error("[{table}] Missing required columns: {columns:?}")]
    #[diagnostic(
        code(lodestar::check::structure),
        help("The fact builder emits every required column; a missing one means the table was built elsewhere.")
    )]
    MissingColumns { table: String, columns: Vec<String> },

    #[error("[{table}] Duplicate surrogate keys in '{column}': {duplicates}")]
    #[diagnostic(code(lodestar::check::surrogate_unique))]
    DuplicateSurrogateKeys {
        table: String,
        column: String,
        duplicates: usize,
    },

    #[error("[{table}] Duplicate natural keys in '{column}': {duplicates}")]
    #[diagnostic(
        code(lodestar::check::natural_unique),
        help("The dimension builder must collapse duplicate natural keys; this is a builder defect.")
    )]
    DuplicateNaturalKeys {
        table: String,
        column: String,
        duplicates: usize,
    },

    #[error("[{table}] Null foreign keys in '{column}': {rows} rows")]
    #[diagnostic(
        code(lodestar::check::fk_null),
        help("A null foreign key means a natural key failed to resolve during the fact build.")
    )]
    NullForeignKey {
        table: String,
        column: String,
        rows: usize,
    },

    #[error(
        "'{column}' has values not found in {dimension}.{column}. Missing count={missing} sample={sample:?}"
    )]
    #[diagnostic(code(lodestar::check::fk_coverage))]
    ForeignKeyCoverage {
        column: String,
        dimension: String,
        missing: usize,
        sample: Vec<i64>,
    },

    #[error("[{table}] '{column}' out of range {expected}: {rows} rows, sample={sample:?}")]
    #[diagnostic(
        code(lodestar::check::measure_range),
        help("Out-of-range measures point to a cleaning defect leaking into the core.")
    )]
    MeasureOutOfRange {
        table: String,
        column: String,
        expected: String,
        rows: usize,
        sample: Vec<f64>,
    },

    #[error(
        "[{table}] estimated_revenue mismatch vs price * estimated_booked_days. Bad rows: {rows}"
    )]
    #[diagnostic(code(lodestar::check::revenue_identity))]
    RevenueMismatch { table: String, rows: usize },
}

/// What a successful validation proves, kept as a run artifact.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub fact_rows: usize,
    pub dimension_rows: BTreeMap<String, usize>,
    pub checks_passed: usize,
}

/// Runs the seven checks in diagnostic order. A missing column fails before
/// anything else; the later checks would be meaningless without it.
pub fn validate_star(star: &StarSchema) -> Result<CheckReport, CheckFailure> {
    // 1. Structural completeness
    let present: HashSet<&str> = star.fact.columns.iter().map(String::as_str).collect();
    let missing: Vec<String> = FACT_COLUMNS
        .iter()
        .filter(|c| !present.contains(**c))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CheckFailure::MissingColumns {
            table: FACT_TABLE.into(),
            columns: missing,
        });
    }

    // 2. Surrogate-key uniqueness per dimension
    assert_unique_keys(
        DIM_ROOM_TYPE,
        "room_type_key",
        star.dim_room_type.iter().map(|r| r.room_type_key),
        false,
    )?;
    assert_unique_keys(
        DIM_LOCATION,
        "location_key",
        star.dim_location.iter().map(|r| r.location_key),
        false,
    )?;
    assert_unique_keys(
        DIM_HOST,
        "host_key",
        star.dim_host.iter().map(|r| r.host_key),
        false,
    )?;
    assert_unique_keys(
        DIM_LISTING,
        "listing_key",
        star.dim_listing.iter().map(|r| r.listing_key),
        false,
    )?;

    // 3. Natural-key uniqueness (defensive re-check of the builder)
    assert_unique_keys(DIM_HOST, "host_id", star.dim_host.iter().map(|r| r.host_id), true)?;
    assert_unique_keys(DIM_LISTING, "id", star.dim_listing.iter().map(|r| r.id), true)?;

    // 4. Foreign-key null-freedom
    let fks: [(&str, fn(&FactRow) -> Option<i64>); 4] = [
        ("listing_key", |r| r.listing_key),
        ("host_key", |r| r.host_key),
        ("location_key", |r| r.location_key),
        ("room_type_key", |r| r.room_type_key),
    ];
    for (column, get) in fks {
        let nulls = star.fact.rows.iter().filter(|r| get(r).is_none()).count();
        if nulls > 0 {
            return Err(CheckFailure::NullForeignKey {
                table: FACT_TABLE.into(),
                column: column.into(),
                rows: nulls,
            });
        }
    }

    // 5. Referential coverage
    assert_fk_coverage(
        "listing_key",
        DIM_LISTING,
        star.fact.rows.iter().filter_map(|r| r.listing_key),
        star.dim_listing.iter().map(|r| r.listing_key),
    )?;
    assert_fk_coverage(
        "host_key",
        DIM_HOST,
        star.fact.rows.iter().filter_map(|r| r.host_key),
        star.dim_host.iter().map(|r| r.host_key),
    )?;
    assert_fk_coverage(
        "location_key",
        DIM_LOCATION,
        star.fact.rows.iter().filter_map(|r| r.location_key),
        star.dim_location.iter().map(|r| r.location_key),
    )?;
    assert_fk_coverage(
        "room_type_key",
        DIM_ROOM_TYPE,
        star.fact.rows.iter().filter_map(|r| r.room_type_key),
        star.dim_room_type.iter().map(|r| r.room_type_key),
    )?;

    // 6. Measure ranges
    assert_measure_range(&star.fact.rows, "price", &format!("(0, {MAX_PRICE}]"), |r| {
        let p = r.price;
        (p > 0.0 && p <= MAX_PRICE).then_some(()).ok_or(p)
    })?;
    assert_measure_range(
        &star.fact.rows,
        "availability_365",
        &format!("[0, {MAX_AVAILABILITY}]"),
        |r| {
            let v = r.availability_365;
            (0..=MAX_AVAILABILITY).contains(&v).then_some(()).ok_or(v as f64)
        },
    )?;
    assert_measure_range(
        &star.fact.rows,
        "estimated_booked_days",
        &format!("[0, {MAX_AVAILABILITY}]"),
        |r| {
            let v = r.estimated_booked_days;
            (0..=MAX_AVAILABILITY).contains(&v).then_some(()).ok_or(v as f64)
        },
    )?;
    assert_measure_range(&star.fact.rows, "price_percentile", "[0, 1]", |r| {
        let v = r.price_percentile;
        (0.0..=1.0).contains(&v).then_some(()).ok_or(v)
    })?;
    assert_measure_range(&star.fact.rows, "revenue_percentile", "[0, 1]", |r| {
        let v = r.revenue_percentile;
        (0.0..=1.0).contains(&v).then_some(()).ok_or(v)
    })?;

    // 7. Derived-measure consistency
    let mismatched = star
        .fact
        .rows
        .iter()
        .filter(|r| {
            let recomputed = r.price * r.estimated_booked_days as f64;
            (recomputed - r.estimated_revenue).abs() > REVENUE_EPSILON
        })
        .count();
    if mismatched > 0 {
        return Err(CheckFailure::RevenueMismatch {
            table: FACT_TABLE.into(),
            rows: mismatched,
        });
    }

    let mut dimension_rows = BTreeMap::new();
    dimension_rows.insert(DIM_ROOM_TYPE.to_string(), star.dim_room_type.len());
    dimension_rows.insert(DIM_LOCATION.to_string(), star.dim_location.len());
    dimension_rows.insert(DIM_HOST.to_string(), star.dim_host.len());
    dimension_rows.insert(DIM_LISTING.to_string(), star.dim_listing.len());

    Ok(CheckReport {
        fact_rows: star.fact.rows.len(),
        dimension_rows,
        checks_passed: 7,
    })
}

fn assert_unique_keys(
    table: &str,
    column: &str,
    keys: impl Iterator<Item = i64>,
    natural: bool,
) -> Result<(), CheckFailure> {
    let mut seen = HashSet::new();
    let mut duplicates = 0usize;
    for key in keys {
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    if duplicates == 0 {
        return Ok(());
    }
    if natural {
        Err(CheckFailure::DuplicateNaturalKeys {
            table: table.into(),
            column: column.into(),
            duplicates,
        })
    } else {
        Err(CheckFailure::DuplicateSurrogateKeys {
            table: table.into(),
            column: column.into(),
            duplicates,
        })
    }
}

fn assert_fk_coverage(
    column: &str,
    dimension: &str,
    fact_keys: impl Iterator<Item = i64>,
    dim_keys: impl Iterator<Item = i64>,
) -> Result<(), CheckFailure> {
    let known: HashSet<i64> = dim_keys.collect();
    let mut missing: Vec<i64> = fact_keys.filter(|k| !known.contains(k)).collect();
    missing.sort_unstable();
    missing.dedup();
    if missing.is_empty() {
        return Ok(());
    }
    let count = missing.len();
    missing.truncate(SAMPLE_LIMIT);
    Err(CheckFailure::ForeignKeyCoverage {
        column: column.into(),
        dimension: dimension.into(),
        missing: count,
        sample: missing,
    })
}

fn assert_measure_range(
    rows: &[FactRow],
    column: &str,
    expected: &str,
    check: impl Fn(&FactRow) -> Result<(), f64>,
) -> Result<(), CheckFailure> {
    let mut sample = Vec::new();
    let mut bad = 0usize;
    for row in rows {
        if let Err(value) = check(row) {
            bad += 1;
            if sample.len() < SAMPLE_LIMIT {
                sample.push(value);
            }
        }
    }
    if bad == 0 {
        return Ok(());
    }
    Err(CheckFailure::MeasureOutOfRange {
        table: FACT_TABLE.into(),
        column: column.into(),
        expected: expected.into(),
        rows: bad,
        sample,
    })
}
