use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Number of rows whose `column` equals `label`.
pub fn count_label(df: &DataFrame, column: &str, label: &str) -> Result<usize> {
    let values = df
        .column(column)
        .map_err(|_| PipelineError::MissingColumn(column.to_string()))?
        .str()?;

    Ok(values
        .into_iter()
        .filter(|value| *value == Some(label))
        .count())
}
