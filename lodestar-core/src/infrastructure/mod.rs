// lodestar-core/src/infrastructure/mod.rs

pub mod adapters;
pub mod config;
pub mod csv;
pub mod error;
pub mod fs;
