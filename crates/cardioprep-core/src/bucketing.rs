use std::fmt;

use polars::prelude::*;
use tracing::warn;

use crate::error::{PipelineError, Result};

const LOW_UPPER_EXCLUSIVE: f64 = 200.0;
const MEDIUM_UPPER_INCLUSIVE: f64 = 239.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CholesterolLevel {
    Low,
    Medium,
    High,
}

impl CholesterolLevel {
    /// `chol < 200` is Low, `200..=239` is Medium, anything else is High.
    ///
    /// A missing reading also lands in High because it fails both earlier tests.
    pub fn classify(chol: Option<f64>) -> Self {
        match chol {
            Some(value) if value < LOW_UPPER_EXCLUSIVE => CholesterolLevel::Low,
            Some(value) if value >= LOW_UPPER_EXCLUSIVE && value <= MEDIUM_UPPER_INCLUSIVE => {
                CholesterolLevel::Medium
            }
            _ => CholesterolLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CholesterolLevel::Low => "Low",
            CholesterolLevel::Medium => "Medium",
            CholesterolLevel::High => "High",
        }
    }
}

impl fmt::Display for CholesterolLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adds a `target` label column bucketing `source` into Low/Medium/High.
pub fn add_cholesterol_level(df: &DataFrame, source: &str, target: &str) -> Result<DataFrame> {
    let column = df
        .column(source)
        .map_err(|_| PipelineError::MissingColumn(source.to_string()))?;

    let missing = column.cast(&DataType::Float64)?.null_count();
    if missing > 0 {
        warn!(
            column = source,
            rows = missing,
            "rows without a numeric reading are labelled {}",
            CholesterolLevel::High
        );
    }

    let chol = col(source).cast(DataType::Float64);
    let level = when(chol.clone().lt(lit(LOW_UPPER_EXCLUSIVE)))
        .then(lit(CholesterolLevel::Low.as_str()))
        .when(
            chol.clone()
                .gt_eq(lit(LOW_UPPER_EXCLUSIVE))
                .and(chol.lt_eq(lit(MEDIUM_UPPER_INCLUSIVE))),
        )
        .then(lit(CholesterolLevel::Medium.as_str()))
        .otherwise(lit(CholesterolLevel::High.as_str()))
        .alias(target);

    let output = df.clone().lazy().with_column(level).collect()?;
    Ok(output)
}
