// lodestar-core/src/domain/error.rs

use crate::domain::star::check::CheckFailure;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Cleaning produced an empty dataset (started with {input_rows} rows)")]
    #[diagnostic(
        code(lodestar::domain::empty_dataset),
        help("Check the cleaning price bounds against the input data.")
    )]
    EmptyDataset { input_rows: usize },

    // Integrity-check failures carry their own diagnostics (table, column,
    // bounded evidence). They pass through unchanged.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Check(#[from] CheckFailure),
}
