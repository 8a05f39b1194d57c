#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from shiraga for tests
pub use shiraga::{
    AdviceBucket, Analysis, AnalysisError, Analyzer, BinaryMask, PipelineConfig, Report,
    ThresholdMode,
};
