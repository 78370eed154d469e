// lodestar-core/src/application/mod.rs

pub mod clean;
pub mod engine;
pub mod pipeline;
pub mod profile;
pub mod report;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI do:
// `use lodestar_core::application::{run_pipeline, clean_project, run_battery};`
// without knowing the internal file layout.

pub use clean::clean_project;
pub use engine::execute_query;
pub use pipeline::{RunResult, run_pipeline};
pub use profile::{DatasetProfile, profile_raw};
pub use report::{run_battery, run_sql_file};
