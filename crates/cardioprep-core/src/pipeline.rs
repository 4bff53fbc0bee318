use std::path::PathBuf;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::{
    bucketing::{self, CholesterolLevel},
    config::{columns, PipelineConfig},
    encoding::{OneHotEncoder, StringIndexer},
    error::Result,
    export, features,
    filters::{self, ClinicalThresholds},
    ingestion, reduction,
};

/// Checkpoints at which an intermediate table is handed to a [`StageObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Encoding,
    FeatureDerivation,
    Filtering,
    Bucketing,
}

impl Stage {
    pub fn code_identifier(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Encoding => "encode_chest_pain",
            Stage::FeatureDerivation => "derive_resting_bp_squared",
            Stage::Filtering => "filter_clinical_thresholds",
            Stage::Bucketing => "bucket_cholesterol",
        }
    }

    /// Columns worth showing after this stage. Empty means the whole table.
    pub fn preview_columns(&self) -> &'static [&'static str] {
        match self {
            Stage::Load | Stage::Filtering => &[],
            Stage::Encoding => &[
                columns::CHEST_PAIN,
                columns::CHEST_PAIN_INDEX,
                columns::CHEST_PAIN_VECTOR,
            ],
            Stage::FeatureDerivation => &[columns::RESTING_BP, columns::RESTING_BP_SQUARED],
            Stage::Bucketing => &[columns::CHOLESTEROL, columns::CHOLESTEROL_LEVEL],
        }
    }
}

pub trait StageObserver {
    fn on_stage(&mut self, stage: Stage, df: &DataFrame) -> Result<()>;
}

/// Observer that ignores every stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {
    fn on_stage(&mut self, _stage: Stage, _df: &DataFrame) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub rows_loaded: usize,
    pub rows_after_filter: usize,
    pub category_labels: Vec<String>,
    pub high_chol_count: usize,
    pub output_path: Option<PathBuf>,
}

pub struct PipelineOutput {
    /// Final table, without the transient indicator-vector column.
    pub dataframe: DataFrame,
    pub high_chol_count: usize,
    pub summary: PipelineSummary,
}

/// The heart-disease preprocessing pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    thresholds: ClinicalThresholds,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load, transform, then export. The output directory is only touched
    /// after every transformation has succeeded.
    pub fn run(
        &self,
        config: &PipelineConfig,
        observer: &mut dyn StageObserver,
    ) -> Result<PipelineOutput> {
        let loaded = ingestion::load_table(&config.input_path)?;
        observer.on_stage(Stage::Load, &loaded)?;

        let mut output = self.transform(&loaded, observer)?;

        export::write_table(&output.dataframe, &config.output_path)?;
        output.summary.output_path = Some(config.output_path.clone());

        Ok(output)
    }

    /// Every in-memory stage between load and export.
    pub fn transform(
        &self,
        input: &DataFrame,
        observer: &mut dyn StageObserver,
    ) -> Result<PipelineOutput> {
        ingestion::require_columns(
            input,
            &[
                columns::AGE,
                columns::RESTING_BP,
                columns::CHOLESTEROL,
                columns::CHEST_PAIN,
            ],
        )?;

        let indexer =
            StringIndexer::new(columns::CHEST_PAIN, columns::CHEST_PAIN_INDEX).fit(input)?;
        let indexed = indexer.transform(input)?;
        let encoder = OneHotEncoder::new(columns::CHEST_PAIN_INDEX, columns::CHEST_PAIN_VECTOR)
            .fit(&indexed)?;
        let encoded = encoder.transform(&indexed)?;
        info!(
            categories = indexer.num_categories(),
            vector_len = encoder.vector_len(),
            "encoded chest pain type"
        );
        observer.on_stage(Stage::Encoding, &encoded)?;

        let derived = features::add_squared_feature(
            &encoded,
            columns::RESTING_BP,
            columns::RESTING_BP_SQUARED,
        )?;
        observer.on_stage(Stage::FeatureDerivation, &derived)?;

        let filtered = filters::filter_clinical_thresholds(&derived, &self.thresholds)?;
        observer.on_stage(Stage::Filtering, &filtered)?;

        let bucketed = bucketing::add_cholesterol_level(
            &filtered,
            columns::CHOLESTEROL,
            columns::CHOLESTEROL_LEVEL,
        )?;
        observer.on_stage(Stage::Bucketing, &bucketed)?;

        let high_chol_count = reduction::count_label(
            &bucketed,
            columns::CHOLESTEROL_LEVEL,
            CholesterolLevel::High.as_str(),
        )?;
        info!(high_chol_count, "counted high cholesterol patients");

        let projected = bucketed.drop(columns::CHEST_PAIN_VECTOR)?;

        let summary = PipelineSummary {
            rows_loaded: input.height(),
            rows_after_filter: projected.height(),
            category_labels: indexer.labels().to_vec(),
            high_chol_count,
            output_path: None,
        };

        Ok(PipelineOutput {
            dataframe: projected,
            high_chol_count,
            summary,
        })
    }
}
