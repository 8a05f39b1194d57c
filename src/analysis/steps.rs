use image::DynamicImage;
use tracing::debug;

use crate::analysis::{morphology, preprocessing, threshold};
use crate::config::{AdaptiveMethod, BorderMode, ThresholdMode};
use crate::error::Result;
use crate::models::BinaryMask;
use crate::pipeline::{MetadataValue, PipelineContext, PipelineData, PipelineStep};

/// Stretch to the working resolution
pub struct ResizeStep {
    pub width: u32,
    pub height: u32,
}

impl PipelineStep for ResizeStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let (src_w, src_h) = (data.image.width(), data.image.height());
        let resized = preprocessing::resize_exact(&data.image, self.width, self.height);
        Ok(data
            .with_image(resized)
            .with_metadata("source_width", MetadataValue::Int(src_w as i64))
            .with_metadata("source_height", MetadataValue::Int(src_h as i64)))
    }

    fn name(&self) -> &str {
        "Resize"
    }
}

/// Edge-preserving bilateral smoothing
pub struct DenoiseStep {
    pub diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
}

impl PipelineStep for DenoiseStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let smoothed = match data.image.as_rgb8() {
            Some(rgb) => preprocessing::bilateral_filter(rgb, self.diameter, self.sigma_color, self.sigma_space),
            None => preprocessing::bilateral_filter(
                &data.image.to_rgb8(),
                self.diameter,
                self.sigma_color,
                self.sigma_space,
            ),
        };
        Ok(data
            .with_image(DynamicImage::ImageRgb8(smoothed))
            .with_metadata("denoised", MetadataValue::Bool(true)))
    }

    fn name(&self) -> &str {
        "Bilateral Denoise"
    }
}

/// Convert image to grayscale
pub struct GrayscaleStep;

impl PipelineStep for GrayscaleStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = preprocessing::to_grayscale(&data.image);
        Ok(data.with_image(DynamicImage::ImageLuma8(gray)))
    }

    fn name(&self) -> &str {
        "Grayscale Conversion"
    }
}

/// Classify every pixel as bright or dark; output is a 0/255 mask
pub struct ThresholdStep {
    pub mode: ThresholdMode,
    pub cutoff: u8,
    pub method: AdaptiveMethod,
    pub block_size: u32,
    pub constant: f32,
    pub border: BorderMode,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let gray = data.image.to_luma8();
        let mask = match self.mode {
            ThresholdMode::Fixed => threshold::fixed_threshold(&gray, self.cutoff),
            ThresholdMode::Adaptive => threshold::adaptive_threshold(
                &gray,
                self.block_size,
                self.constant,
                self.method,
                self.border,
            ),
        };

        let bright = mask.bright_count();
        debug!(mode = ?self.mode, bright, "binarized");

        Ok(data
            .with_image(DynamicImage::ImageLuma8(mask.into_gray()))
            .with_metadata("bright_after_threshold", MetadataValue::Int(bright as i64)))
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Morphological opening to strip isolated bright specks
pub struct OpeningStep {
    pub kernel: u32,
}

impl PipelineStep for OpeningStep {
    fn process(&self, data: PipelineData, _context: &PipelineContext) -> Result<PipelineData> {
        let mask = BinaryMask::from_gray(&data.image.to_luma8());
        let opened = morphology::open(&mask, self.kernel);

        let removed = mask.bright_count() - opened.bright_count();
        debug!(kernel = self.kernel, removed, "opened mask");

        Ok(data
            .with_image(DynamicImage::ImageLuma8(opened.into_gray()))
            .with_metadata("removed_by_opening", MetadataValue::Int(removed as i64)))
    }

    fn name(&self) -> &str {
        "Morphological Opening"
    }
}
