// lodestar-core/src/lib.rs

#![allow(missing_docs)]
// Memory safety
#![deny(unsafe_code)]
// Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contract toward the relational store (Connector).
pub mod ports;

// 2. Domain (business core)
// Cleaning rules, star-schema construction, integrity checks.
// Depends on NOTHING else (no infra, no app).
pub mod domain;

// 3. Infrastructure (Adapters)
// Technical implementation (DuckDB, CSV files, YAML config).
// Depends on Domain and Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Orchestration (Pipeline, Profile, Reports, Clean).
// Depends on Domain, Infra and Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// Lets callers import the main error easily: use lodestar_core::EtlError;
pub use error::EtlError;
