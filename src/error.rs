//! Errors raised by the cleaning, transformation and query stages.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::data::LoaderError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },
    #[error("Invalid value {value:?} in column {column} at row {row} (expected Yes or No)")]
    InvalidCategoricalValue {
        column: String,
        row: usize,
        value: String,
    },
    #[error("Unknown parental education level {value:?} at row {row}")]
    UnknownCategory { value: String, row: usize },
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),
    #[error("{operation} is undefined on an empty table")]
    EmptyTableError { operation: &'static str },
    #[error("Column {column} has no observed values to impute from")]
    NoObservedValues { column: String },
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error(transparent)]
    Load(#[from] LoaderError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
