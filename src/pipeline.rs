use image::DynamicImage;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AnalysisError, Result};

/// Data that flows through the pipeline: the current image plus whatever
/// the steps so far chose to record about it
#[derive(Clone)]
pub struct PipelineData {
    /// Colour, grayscale or 0/255 mask depending on how far along we are
    pub image: DynamicImage,

    /// Metadata for tracking properties (e.g., "denoised", "bright_pixels")
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Int(i64),
}

impl PipelineData {
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            image,
            metadata: HashMap::new(),
        }
    }

    /// Replace the image, keeping metadata
    pub fn with_image(mut self, image: DynamicImage) -> Self {
        self.image = image;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Where intermediate stage images are written
#[derive(Clone, Debug)]
pub struct DebugConfig {
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// One stage of the analysis. Steps are pure: same input, same output.
pub trait PipelineStep: Send + Sync {
    fn process(&self, data: PipelineData, context: &PipelineContext) -> Result<PipelineData>;

    /// Human-readable name (used in logs and debug directory names)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(self, output_dir: PathBuf) -> Result<Self> {
        prepare_debug_dir(&output_dir)?;
        Ok(self.with_debug_output(output_dir))
    }

    /// Write stage images into `output_dir` without checking what is
    /// already there; files from an earlier run with the same steps are
    /// overwritten.
    pub fn with_debug_output(mut self, output_dir: PathBuf) -> Self {
        self.context.debug = Some(DebugConfig { output_dir });
        self
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, input: DynamicImage) -> Result<PipelineData> {
        self.run_partial(input, self.steps.len())
    }

    /// Run only the first `num_steps` steps (useful for inspecting a stage)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<PipelineData> {
        self.save_debug(&input, "00_input")?;

        let mut data = PipelineData::from_image(input);

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            debug!(
                step = step.name(),
                width = data.image.width(),
                height = data.image.height(),
                "running step"
            );

            data = step.process(data, &self.context)?;

            let dir_name = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.save_debug(&data.image, &dir_name)?;
        }

        Ok(data)
    }

    fn save_debug(&self, image: &DynamicImage, dir_name: &str) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir = debug_config.output_dir.join(dir_name);
        std::fs::create_dir_all(&step_dir).map_err(debug_err)?;
        let output_path = step_dir.join("01.png");
        image
            .save(&output_path)
            .map_err(|e| AnalysisError::DebugOutput(e.to_string()))?;

        debug!(path = %output_path.display(), "saved debug image");
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Create `dir` if missing; refuse it if it already holds anything
pub fn prepare_debug_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        let entries = std::fs::read_dir(dir).map_err(debug_err)?;
        if entries.count() > 0 {
            return Err(AnalysisError::DebugOutput(format!(
                "debug directory is not empty: {}",
                dir.display()
            )));
        }
    } else {
        std::fs::create_dir_all(dir).map_err(debug_err)?;
    }
    Ok(())
}

fn debug_err(e: std::io::Error) -> AnalysisError {
    AnalysisError::DebugOutput(e.to_string())
}
