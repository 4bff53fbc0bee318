use std::path::PathBuf;

pub const DEFAULT_INPUT_PATH: &str = "DataSet.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "output";
pub const DEFAULT_PREVIEW_ROWS: usize = 20;

/// Column names the pipeline reads and produces.
pub mod columns {
    pub const AGE: &str = "age";
    pub const RESTING_BP: &str = "trestbps";
    pub const CHOLESTEROL: &str = "chol";
    pub const CHEST_PAIN: &str = "cp";
    pub const CHEST_PAIN_INDEX: &str = "cp_index";
    pub const CHEST_PAIN_VECTOR: &str = "cp_vector";
    pub const RESTING_BP_SQUARED: &str = "powerOfTrestbps";
    pub const CHOLESTEROL_LEVEL: &str = "cholesterol_level";
}

/// Locations for a single pipeline run. Nothing else about the run is configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH)
    }
}
