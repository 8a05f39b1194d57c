pub mod analysis;
pub mod assets;
pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;

pub use analysis::{Analyzer, build_pipeline};
pub use config::{AdaptiveMethod, BorderMode, PipelineConfig, ThresholdMode};
pub use error::AnalysisError;
pub use models::{AdviceBucket, Analysis, BinaryMask, Report};
pub use pipeline::{MetadataValue, Pipeline, PipelineContext, PipelineData, PipelineStep};
