use polars::prelude::*;

use crate::error::{PipelineError, Result};

/// Adds `target = source * source` as a `Float64` column.
///
/// Values that cannot be read as numbers become null instead of failing the run,
/// and nulls stay null.
pub fn add_squared_feature(df: &DataFrame, source: &str, target: &str) -> Result<DataFrame> {
    if df.column(source).is_err() {
        return Err(PipelineError::MissingColumn(source.to_string()));
    }

    let value = col(source).cast(DataType::Float64);
    let output = df
        .clone()
        .lazy()
        .with_column((value.clone() * value).alias(target))
        .collect()?;

    Ok(output)
}
