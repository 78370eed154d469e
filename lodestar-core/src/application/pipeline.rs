// lodestar-core/src/application/pipeline.rs
//
// The sequential runner: read -> profile -> clean -> dimensions -> fact ->
// validation gate -> persist -> indexes. Data flows strictly forward; each
// stage consumes the immutable output of its predecessor, and any failure
// aborts the remainder of the run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::application::profile::profile_raw;
use crate::application::report::{run_battery, run_sql_file};
use crate::domain::cleaning::clean_listings;
use crate::domain::error::DomainError;
use crate::domain::star::check::CheckFailure;
use crate::domain::star::{FACT_COLUMNS, FACT_TABLE, StarSchema, build_dimensions, build_fact, validate_star};
use crate::error::EtlError;
use crate::infrastructure::config::PipelineConfig;
use crate::infrastructure::csv::{read_raw_listings, write_cleaned_csv, write_table_csv};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_json;
use crate::ports::connector::Connector;

#[derive(Debug, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub raw_rows: usize,
    pub cleaned_rows: usize,
    pub fact_rows: usize,
    pub errors: Vec<String>,
}

/// Supporting indexes on the fact foreign keys, created after the load.
const FACT_INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS idx_fact_host_key ON fact_listing(host_key)",
    "CREATE INDEX IF NOT EXISTS idx_fact_location_key ON fact_listing(location_key)",
    "CREATE INDEX IF NOT EXISTS idx_fact_room_type_key ON fact_listing(room_type_key)",
    "CREATE INDEX IF NOT EXISTS idx_fact_listing_key ON fact_listing(listing_key)",
];

pub async fn run_pipeline(
    project_dir: &Path,
    config: &PipelineConfig,
    connector: &dyn Connector,
) -> Result<RunResult, EtlError> {
    println!(
        "🚀 Starting ETL Pipeline ({} store)...",
        connector.engine_name()
    );
    let start_time = Instant::now();

    let target_dir = project_dir.join(&config.target_path);
    if !target_dir.exists() {
        fs::create_dir_all(&target_dir)?;
    }

    let outcome = execute(project_dir, config, connector, &target_dir).await;

    // run_results.json is written on both paths so a failed run still
    // leaves a machine-readable trace next to the logs.
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            let failed = RunResult {
                success: false,
                raw_rows: 0,
                cleaned_rows: 0,
                fact_rows: 0,
                errors: vec![e.to_string()],
            };
            save_json(&target_dir.join("run_results.json"), &failed)?;
            return Err(e);
        }
    };

    save_json(&target_dir.join("run_results.json"), &result)?;

    let duration = start_time.elapsed();
    if result.success {
        println!(
            "✨ Done in {:.2}s. {} fact rows loaded.",
            duration.as_secs_f64(),
            result.fact_rows
        );
    } else {
        eprintln!(
            "⚠️  Run finished with {} report error(s).",
            result.errors.len()
        );
    }

    Ok(result)
}

async fn execute(
    project_dir: &Path,
    config: &PipelineConfig,
    connector: &dyn Connector,
    target_dir: &Path,
) -> Result<RunResult, EtlError> {
    // 1. EXTRACT
    let input_path = resolve_input(project_dir, &config.input_path)?;
    println!("📥 Reading raw listings from {:?}...", input_path);
    let raw = read_raw_listings(&input_path).map_err(EtlError::Infrastructure)?;
    let raw_rows = raw.len();

    // 2. PROFILE (pre-cleaning snapshot for the operator)
    let profile = profile_raw(&raw, config.cleaning.max_price);
    save_json(&target_dir.join("profile.json"), &profile)?;
    println!(
        "   {} rows | {} zero-priced | {} above price cap | {} duplicate ids",
        profile.rows, profile.zero_price_rows, profile.over_cap_rows, profile.duplicate_ids
    );

    // 3. CLEAN + KPIs
    println!("🧼 Cleaning and deriving KPIs...");
    let cleaned = clean_listings(raw, &config.cleaning).map_err(EtlError::Domain)?;
    println!("   {} rows survive cleaning", cleaned.len());

    let cleaned_dir = target_dir.join("cleaned");
    fs::create_dir_all(&cleaned_dir)?;
    write_cleaned_csv(&cleaned_dir.join("listings_cleaned.csv"), &cleaned)
        .map_err(EtlError::Infrastructure)?;

    // 4. STAR SCHEMA
    println!("⭐ Building star schema...");
    let dims = build_dimensions(&cleaned);
    let fact = build_fact(&cleaned, &dims);
    let star = StarSchema {
        dim_room_type: dims.room_types,
        dim_location: dims.locations,
        dim_host: dims.hosts,
        dim_listing: dims.listings,
        fact,
    };

    // 5. VALIDATION GATE — nothing is persisted unless every check passes.
    println!("🧪 Running integrity checks...");
    let report = validate_star(&star).map_err(DomainError::from)?;
    save_json(&target_dir.join("check_report.json"), &report)?;
    println!("   ✅ STAR SCHEMA CHECKS PASSED ({} checks)", report.checks_passed);

    // 6. ARTIFACTS (star tables as CSV, same layout the store receives)
    let star_dir = target_dir.join("star_schema");
    fs::create_dir_all(&star_dir)?;
    let tables = star.tables();
    for table in &tables {
        write_table_csv(&star_dir.join(format!("{}.csv", table.name)), table)
            .map_err(EtlError::Infrastructure)?;
    }

    // 7. LOAD (full refresh) + INDEXES
    println!("💾 Loading {} tables into the store...", tables.len());
    for table in &tables {
        connector.load_table(table).await?;
        println!("   Loaded {}: {} rows", table.name, table.rows.len());
    }
    for ddl in FACT_INDEXES {
        connector.execute(ddl).await?;
    }

    // 8. POST-LOAD VERIFICATION against the persisted store
    verify_store(connector, star.fact.rows.len()).await?;

    // 9. REPORTS over the freshly loaded store. Battery queries are trusted
    // and abort on failure; operator statements fail the run but all of
    // them still execute.
    println!("📊 Report battery...");
    for (title, output) in run_battery(connector).await? {
        println!("   {}: {} rows", title, output.rows.len());
    }

    let mut errors = Vec::new();
    if let Some(report_sql) = &config.report_sql {
        let sql_path = project_dir.join(report_sql);
        println!("📄 Operator SQL: {:?}", sql_path);
        for outcome in run_sql_file(connector, &sql_path).await? {
            if let Err(message) = outcome.result {
                eprintln!("   ❌ {}: {}", outcome.sql, message);
                errors.push(format!("{}: {}", outcome.sql, message));
            }
        }
    }

    Ok(RunResult {
        success: errors.is_empty(),
        raw_rows,
        cleaned_rows: cleaned.len(),
        fact_rows: star.fact.rows.len(),
        errors,
    })
}

/// Structural re-check of the persisted fact table: every required column
/// present, row count matching the validated in-memory table.
async fn verify_store(connector: &dyn Connector, expected_rows: usize) -> Result<(), EtlError> {
    let stored: Vec<String> = connector
        .fetch_columns(FACT_TABLE)
        .await?
        .into_iter()
        .map(|c| c.name.to_lowercase())
        .collect();

    let missing: Vec<String> = FACT_COLUMNS
        .iter()
        .filter(|c| !stored.contains(&c.to_string()))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EtlError::Domain(DomainError::Check(
            CheckFailure::MissingColumns {
                table: FACT_TABLE.into(),
                columns: missing,
            },
        )));
    }

    let stored_rows = connector
        .query_scalar(&format!("SELECT count(*) FROM {FACT_TABLE}"))
        .await?;
    if stored_rows as usize != expected_rows {
        return Err(EtlError::InternalError(format!(
            "Store row count mismatch on {}: expected {}, found {}",
            FACT_TABLE, expected_rows, stored_rows
        )));
    }

    Ok(())
}

fn resolve_input(project_dir: &Path, input_path: &str) -> Result<PathBuf, EtlError> {
    let raw_path = Path::new(input_path);
    let absolute_path = if raw_path.is_absolute() {
        raw_path.to_path_buf()
    } else {
        project_dir.join(raw_path)
    };

    if !absolute_path.exists() {
        return Err(EtlError::Infrastructure(InfrastructureError::ConfigError(
            format!("Input file not found at {:?}", absolute_path),
        )));
    }
    Ok(absolute_path)
}

fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), EtlError> {
    write_json(path, data).map_err(EtlError::Infrastructure)
}
