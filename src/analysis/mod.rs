pub mod advice;
pub mod decode;
pub mod morphology;
pub mod preprocessing;
pub mod ratio;
pub mod steps;
pub mod threshold;

use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{Analysis, BinaryMask};
use crate::pipeline::{Pipeline, prepare_debug_dir};
use decode::Decoder;
use ratio::RatioEstimator;
use steps::*;

/// Main analysis orchestrator: bytes in, ratio and advice out
pub struct Analyzer {
    config: PipelineConfig,
    decoder: Decoder,
    debug_dir: Option<PathBuf>,
    runs: AtomicUsize,
}

impl Analyzer {
    /// Fails with `InvalidConfig` before any pixel is touched
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            decoder: Decoder::new(),
            debug_dir: None,
            runs: AtomicUsize::new(0),
        })
    }

    /// Dump every stage as PNG under `dir`, which must be empty or missing.
    /// Each analysis gets its own numbered subdirectory (`01`, `02`, ...).
    pub fn with_debug(mut self, dir: PathBuf) -> Result<Self> {
        prepare_debug_dir(&dir)?;
        self.debug_dir = Some(dir);
        Ok(self)
    }

    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<Analysis> {
        let rgb = self.decoder.decode(bytes)?;
        self.analyze_image(DynamicImage::ImageRgb8(rgb))
    }

    pub fn analyze_image(&self, img: DynamicImage) -> Result<Analysis> {
        let mask = self.mask(img)?;

        let bright_pixels = mask.bright_count();
        let total_pixels = mask.total_count();
        let ratio = RatioEstimator::from_config(&self.config).estimate(&mask);
        let bucket = advice::classify(ratio, &self.config.advice);
        let advice = advice::advice_text(bucket, &self.config.advice).to_string();

        debug!(bright_pixels, total_pixels, ratio, ?bucket, "analysis complete");

        Ok(Analysis {
            ratio,
            bucket,
            advice,
            bright_pixels,
            total_pixels,
        })
    }

    /// Final refined mask for an image (for inspection)
    pub fn mask(&self, img: DynamicImage) -> Result<BinaryMask> {
        let mut pipeline = build_pipeline(&self.config);
        if let Some(dir) = &self.debug_dir {
            let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
            pipeline = pipeline.with_debug_output(dir.join(format!("{:02}", run)));
        }
        let data = pipeline.run(img)?;
        Ok(BinaryMask::from_gray(&data.image.to_luma8()))
    }
}

/// Assemble the step pipeline described by a validated configuration
pub fn build_pipeline(config: &PipelineConfig) -> Pipeline {
    let mut pipeline = Pipeline::new().add_step(Arc::new(ResizeStep {
            width: config.working_width,
            height: config.working_height,
        }));

    if config.denoise.enabled {
        pipeline = pipeline.add_step(Arc::new(DenoiseStep {
            diameter: config.denoise.diameter,
            sigma_color: config.denoise.sigma_color,
            sigma_space: config.denoise.sigma_space,
        }));
    }

    pipeline = pipeline
        .add_step(Arc::new(GrayscaleStep))
        .add_step(Arc::new(ThresholdStep {
            mode: config.threshold.mode,
            cutoff: config.cutoff(),
            method: config.threshold.adaptive_method,
            block_size: config.threshold.block_size,
            constant: config.threshold.constant,
            border: config.threshold.border,
        }));

    if config.kernel() > 0 {
        pipeline = pipeline.add_step(Arc::new(OpeningStep {
            kernel: config.kernel(),
        }));
    }

    pipeline
}
