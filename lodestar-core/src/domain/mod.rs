// lodestar-core/src/domain/mod.rs

pub mod cleaning;
pub mod error;
pub mod listing;
pub mod star;

// Convenient re-exports to simplify imports elsewhere
pub use error::DomainError;
