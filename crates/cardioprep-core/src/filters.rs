use polars::prelude::*;
use tracing::info;

use crate::config::columns;
use crate::error::Result;
use crate::ingestion::require_columns;

/// Lower bounds (exclusive) a patient record must exceed to be kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClinicalThresholds {
    pub min_age: f64,
    pub min_resting_bp: f64,
}

impl Default for ClinicalThresholds {
    fn default() -> Self {
        Self {
            min_age: 50.0,
            min_resting_bp: 140.0,
        }
    }
}

#[cfg(test)]
impl ClinicalThresholds {
    /// Row-level form of the filter predicate. A missing operand never passes.
    fn admits(&self, age: Option<f64>, resting_bp: Option<f64>) -> bool {
        matches!(
            (age, resting_bp),
            (Some(age), Some(bp)) if age > self.min_age && bp > self.min_resting_bp
        )
    }
}

/// Keeps rows where `age > min_age AND trestbps > min_resting_bp`.
///
/// Comparisons against null or non-numeric values are treated as false,
/// so those rows are dropped.
pub fn filter_clinical_thresholds(
    df: &DataFrame,
    thresholds: &ClinicalThresholds,
) -> Result<DataFrame> {
    require_columns(df, &[columns::AGE, columns::RESTING_BP])?;

    let predicate = col(columns::AGE)
        .cast(DataType::Float64)
        .gt(lit(thresholds.min_age))
        .and(
            col(columns::RESTING_BP)
                .cast(DataType::Float64)
                .gt(lit(thresholds.min_resting_bp)),
        )
        .fill_null(lit(false));

    let output = df.clone().lazy().filter(predicate).collect()?;

    info!(
        rows_in = df.height(),
        rows_out = output.height(),
        min_age = thresholds.min_age,
        min_resting_bp = thresholds.min_resting_bp,
        "applied clinical threshold filter"
    );

    Ok(output)
}
