//! Categorical encoders fitted over a whole table.
//!
//! Both encoders split into an estimator (`fit`) and a fitted model (`transform`),
//! so the category domain is fixed once before any row is encoded.

use std::cmp::Reverse;
use std::collections::HashMap;

use polars::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// Assigns dense integer codes to the distinct values of a column.
#[derive(Debug, Clone)]
pub struct StringIndexer {
    input_col: String,
    output_col: String,
}

/// A fitted [`StringIndexer`]. Code `i` belongs to `labels[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringIndexerModel {
    input_col: String,
    output_col: String,
    labels: Vec<String>,
    frequencies: Vec<usize>,
    lookup: HashMap<String, u32>,
}

impl StringIndexer {
    pub fn new(input_col: &str, output_col: &str) -> Self {
        Self {
            input_col: input_col.to_string(),
            output_col: output_col.to_string(),
        }
    }

    /// Counts every non-null value and orders categories by descending frequency.
    /// Equal frequencies are ordered lexically so repeated fits agree.
    pub fn fit(&self, df: &DataFrame) -> Result<StringIndexerModel> {
        let column = df
            .column(&self.input_col)
            .map_err(|_| PipelineError::MissingColumn(self.input_col.clone()))?;
        let as_text = column.cast(&DataType::String)?;
        let values = as_text.str()?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values.into_iter().flatten() {
            *counts.entry(value).or_default() += 1;
        }

        if counts.is_empty() {
            return Err(PipelineError::fit(
                &self.input_col,
                "column contains no non-null values",
            ));
        }

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by_key(|&(label, count)| (Reverse(count), label));

        let labels: Vec<String> = ranked.iter().map(|(label, _)| label.to_string()).collect();
        let frequencies: Vec<usize> = ranked.iter().map(|(_, count)| *count).collect();
        let lookup = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| (label.clone(), idx as u32))
            .collect();

        debug!(column = %self.input_col, labels = ?labels, "fitted string indexer");

        Ok(StringIndexerModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            labels,
            frequencies,
            lookup,
        })
    }
}

impl StringIndexerModel {
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn frequencies(&self) -> &[usize] {
        &self.frequencies
    }

    pub fn num_categories(&self) -> usize {
        self.labels.len()
    }

    pub fn index_of(&self, label: &str) -> Option<u32> {
        self.lookup.get(label).copied()
    }

    /// Adds the code column. Nulls and values unseen during fitting map to null.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let column = df
            .column(&self.input_col)
            .map_err(|_| PipelineError::MissingColumn(self.input_col.clone()))?;
        let as_text = column.cast(&DataType::String)?;
        let values = as_text.str()?;

        let codes: Vec<Option<u32>> = values
            .into_iter()
            .map(|value| value.and_then(|label| self.index_of(label)))
            .collect();

        let mut output = df.clone();
        output.with_column(Series::new(self.output_col.as_str().into(), codes))?;
        Ok(output)
    }
}

/// Expands an integer code column into indicator vectors.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    input_col: String,
    output_col: String,
    drop_last: bool,
}

/// A fitted [`OneHotEncoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHotEncoderModel {
    input_col: String,
    output_col: String,
    category_size: usize,
    drop_last: bool,
}

impl OneHotEncoder {
    pub fn new(input_col: &str, output_col: &str) -> Self {
        Self {
            input_col: input_col.to_string(),
            output_col: output_col.to_string(),
            drop_last: true,
        }
    }

    /// With `drop_last` (the default) the last category is the reference and
    /// encodes as an all-zero vector one slot shorter than the domain.
    #[cfg(test)]
    pub(crate) fn with_drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// The domain is `0..=max(code)`.
    pub fn fit(&self, df: &DataFrame) -> Result<OneHotEncoderModel> {
        let codes = code_column(df, &self.input_col)?;

        let max_code = codes.into_iter().flatten().max().ok_or_else(|| {
            PipelineError::fit(&self.input_col, "column contains no non-null codes")
        })?;

        Ok(OneHotEncoderModel {
            input_col: self.input_col.clone(),
            output_col: self.output_col.clone(),
            category_size: max_code as usize + 1,
            drop_last: self.drop_last,
        })
    }
}

impl OneHotEncoderModel {
    pub fn category_size(&self) -> usize {
        self.category_size
    }

    pub fn vector_len(&self) -> usize {
        if self.drop_last {
            self.category_size.saturating_sub(1)
        } else {
            self.category_size
        }
    }

    /// Indicator vector for one code, or `None` when the code is outside the fitted domain.
    pub fn encode(&self, code: u32) -> Option<Vec<f64>> {
        let code = code as usize;
        if code >= self.category_size {
            return None;
        }
        let mut vector = vec![0.0; self.vector_len()];
        if let Some(slot) = vector.get_mut(code) {
            *slot = 1.0;
        }
        Some(vector)
    }

    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let codes = code_column(df, &self.input_col)?;

        let mut vectors: ListChunked = codes
            .into_iter()
            .map(|code| {
                code.and_then(|value| self.encode(value))
                    .map(|vector| Series::new(PlSmallStr::EMPTY, vector))
            })
            .collect();
        vectors.rename(self.output_col.as_str().into());

        let mut output = df.clone();
        output.with_column(vectors.into_series())?;
        Ok(output)
    }
}

fn code_column(df: &DataFrame, name: &str) -> Result<UInt32Chunked> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))?;
    let cast = column.cast(&DataType::UInt32)?;
    Ok(cast.u32()?.clone())
}
