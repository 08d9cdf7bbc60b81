use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn a source file into a [`crate::data::Dataset`].
///
/// Always fatal at startup: the server never binds with a partial table.
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv record: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("missing required column {column:?}")]
    MissingColumn { column: String },

    #[error("line {line}: outcome {value:?} is not 0 or 1")]
    InvalidOutcome { line: u64, value: String },

    #[error("line {line}: payload {value:?} is not a non-negative number")]
    InvalidPayload { line: u64, value: String },

    #[error("line {line}: launch site is empty")]
    EmptySite { line: u64 },

    #[error("dataset has no rows")]
    Empty,
}

/// A selection the binding layer refuses to hand to the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("launch site {0:?} is not present in the dataset")]
    UnknownSite(String),

    #[error("payload range is inverted: low {low} > high {high}")]
    InvertedRange { low: f64, high: f64 },

    #[error("payload bound {0} is negative")]
    NegativeBound(f64),

    #[error("payload bound is not a finite number")]
    NonFinite,
}
