// lodestar-core/src/infrastructure/config/project.rs

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::cleaning::CleaningConfig;
use crate::infrastructure::error::InfrastructureError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PipelineConfig {
    pub name: String,
    pub version: String,

    /// Raw listings CSV, relative to the project directory.
    #[serde(rename = "input-path")]
    pub input_path: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    /// Store file, relative to the project directory.
    #[serde(rename = "db-path", default = "default_db_path")]
    pub db_path: String,

    #[serde(rename = "clean-targets", default = "default_clean_targets")]
    pub clean_targets: Vec<String>,

    #[serde(default)]
    #[validate(nested)]
    pub cleaning: CleaningConfig,

    /// Optional operator SQL file run by the report battery.
    #[serde(rename = "report-sql", default)]
    pub report_sql: Option<String>,
}

fn default_target_path() -> String {
    "target".to_string()
}
fn default_db_path() -> String {
    "target/lodestar.duckdb".to_string()
}
fn default_clean_targets() -> Vec<String> {
    vec!["target".to_string()]
}

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_pipeline_config(project_dir: &Path) -> Result<PipelineConfig, InfrastructureError> {
    // 1. Discover the main file
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. YAML base
    let content = fs::read_to_string(&config_path).map_err(InfrastructureError::Io)?;
    let mut config: PipelineConfig = serde_yaml::from_str(&content)?;

    // 3. Environment-variable overrides (layering pattern):
    //    LODESTAR_INPUT_PATH=/tmp/other.csv lodestar run
    apply_env_overrides(&mut config);

    // 4. Bounds check (fail-secure before any work happens)
    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(format!("Invalid configuration: {e}")))?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    let candidates = ["lodestar.yaml", "lodestar_project.yaml"];
    for filename in candidates {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, candidates
    )))
}

fn apply_env_overrides(config: &mut PipelineConfig) {
    if let Ok(input) = std::env::var("LODESTAR_INPUT_PATH") {
        config.input_path = input;
    }
    if let Ok(target) = std::env::var("LODESTAR_TARGET_PATH") {
        config.target_path = target;
    }
    if let Ok(db) = std::env::var("LODESTAR_DB_PATH") {
        config.db_path = db;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    const MINIMAL: &str = "\
name: nyc-rentals
version: \"0.1.0\"
input-path: data/listings.csv
";

    #[test]
    fn test_load_minimal_config_with_defaults() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("lodestar.yaml"), MINIMAL)?;

        let config = load_pipeline_config(dir.path())?;
        assert_eq!(config.name, "nyc-rentals");
        assert_eq!(config.input_path, "data/listings.csv");
        assert_eq!(config.target_path, "target");
        assert_eq!(config.db_path, "target/lodestar.duckdb");
        assert_eq!(config.clean_targets, vec!["target".to_string()]);
        assert_eq!(config.cleaning.max_price, 1000.0);
        assert_eq!(config.cleaning.percentile_cap, 0.99);
        assert_eq!(config.report_sql, None);
        Ok(())
    }

    #[test]
    fn test_load_full_config() -> Result<()> {
        let dir = tempdir()?;
        let body = "\
name: nyc-rentals
version: \"1.2.0\"
input-path: data/AB_NYC_2019.csv
target-path: build
db-path: build/bi.duckdb
clean-targets: [build, tmp]
cleaning:
  max-price: 500
  percentile-cap: 0.95
report-sql: sql/validation.sql
";
        fs::write(dir.path().join("lodestar_project.yaml"), body)?;

        let config = load_pipeline_config(dir.path())?;
        assert_eq!(config.cleaning.max_price, 500.0);
        assert_eq!(config.cleaning.percentile_cap, 0.95);
        assert_eq!(config.report_sql, Some("sql/validation.sql".to_string()));
        assert_eq!(config.clean_targets.len(), 2);
        Ok(())
    }

    #[test]
    fn test_missing_config_is_a_dedicated_error() {
        let dir = tempdir().unwrap();
        let err = load_pipeline_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
    }

    #[test]
    fn test_out_of_bounds_cleaning_config_rejected() -> Result<()> {
        let dir = tempdir()?;
        let body = "\
name: nyc-rentals
version: \"0.1.0\"
input-path: data/listings.csv
cleaning:
  max-price: 0
";
        fs::write(dir.path().join("lodestar.yaml"), body)?;

        let err = load_pipeline_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigError(_)));
        Ok(())
    }
}
