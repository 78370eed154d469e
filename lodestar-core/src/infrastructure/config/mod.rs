// lodestar-core/src/infrastructure/config/mod.rs

pub mod project;

pub use project::{PipelineConfig, load_pipeline_config};
