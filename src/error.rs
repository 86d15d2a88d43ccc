use std::path::PathBuf;
use thiserror::Error;

/// Failures that prevent a [`crate::Store`] from being built at all.
///
/// Bad rows and bad cells are not errors; they are absorbed during parsing and
/// show up in the [`crate::parser::ParseReport`] and as uncertain records.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read emission data from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("emission data is empty")]
    Empty,
    #[error("failed to read delimited rows: {0}")]
    Csv(#[from] csv::Error),
    #[error("header has no year columns matching `{prefix}<year>`")]
    NoYearColumns { prefix: String },
    #[error("invalid parse options: {0}")]
    Options(String),
    #[error("invalid year column pattern: {0}")]
    Pattern(#[from] regex::Error),
}
