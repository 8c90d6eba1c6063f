//! Error types for loading evaluation data.

use thiserror::Error;

/// Errors raised while reading and cleaning the input table.
///
/// Unparseable cells are not errors: those rows are dropped and counted in
/// [`LoadStats`](crate::loader::LoadStats).
#[derive(Debug, Error)]
pub enum LoadError {
    /// The date or score column alias is not in the header.
    #[error("CSV must include {date:?} and {score:?} columns (missing: {missing:?})")]
    MissingColumns {
        date: String,
        score: String,
        missing: Vec<String>,
    },

    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}
