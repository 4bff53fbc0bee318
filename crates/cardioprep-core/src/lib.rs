pub mod bucketing;
pub mod config;
pub mod encoding;
pub mod error;
pub mod export;
pub mod features;
pub mod filters;
pub mod ingestion;
pub mod pipeline;
pub mod reduction;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use pipeline::{NoopObserver, Pipeline, PipelineOutput, PipelineSummary, Stage, StageObserver};
