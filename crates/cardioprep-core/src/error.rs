// crates/cardioprep-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("failed to read input table {path}: {message}")]
    DataSource { path: PathBuf, message: String },

    #[error("failed to write output table {path}: {message}")]
    DataSink { path: PathBuf, message: String },

    #[error("failed to fit encoder on column '{column}': {message}")]
    Fit { column: String, message: String },

    #[error("required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn fit(column: &str, message: impl Into<String>) -> Self {
        Self::Fit {
            column: column.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
