use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Reads a header-bearing CSV file, inferring each column's type from every row.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    let source_error = |message: String| PipelineError::DataSource {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|err| source_error(err.to_string()))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|err| source_error(err.to_string()))?;

    if df.width() == 0 {
        return Err(source_error("file has no header row".to_string()));
    }

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded input table"
    );

    Ok(df)
}

/// Fails with [`PipelineError::MissingColumn`] for the first name not present in `df`.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        if df.column(name).is_err() {
            return Err(PipelineError::MissingColumn(name.to_string()));
        }
    }
    Ok(())
}
