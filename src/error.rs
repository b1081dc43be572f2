//! Typed errors for dataset loading and analytics.
//!
//! Loader and analytics functions return these directly; the binary
//! layer wraps them in `anyhow` with extra context.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChurnError {
    #[error("data source not found: {0}")]
    NotFound(String),

    #[error("invalid data format: {0}")]
    DataFormat(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("correlation undefined: field '{0}' has zero variance")]
    UndefinedCorrelation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ChurnError>;
