// lodestar-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum EtlError {
    // --- DOMAIN ERRORS (cleaning rules, integrity checks) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, database) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATIVE ERRORS ---
    #[error("Internal Error: {0}")]
    #[diagnostic(code(lodestar::internal))]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    #[diagnostic(
        code(lodestar::unsafe_path),
        help("Clean targets must be paths relative to the project directory.")
    )]
    UnsafePath(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::Infrastructure(InfrastructureError::Io(err))
    }
}
