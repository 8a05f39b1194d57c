use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use shiraga::{PipelineConfig, ThresholdMode};
use std::io::Cursor;
use tempfile::NamedTempFile;

/// Side length used by the synthetic fixtures
pub const SIZE: u32 = 64;

pub fn encode_png(img: DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

pub fn solid_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    encode_png(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([value, value, value]),
    )))
}

/// Dark scalp with 2 px wide bright strands every 8 columns, lit by a
/// left-to-right gradient and shifted by `offset` overall.
///
/// Background runs 20..=120, strands sit 50 above it, so any offset up to
/// 85 stays clear of clipping.
pub fn lit_strands(offset: u8) -> GrayImage {
    GrayImage::from_fn(SIZE, SIZE, |x, _| {
        let background = 20 + (x * 100 / (SIZE - 1)) as u8;
        let strand = if x % 8 == 3 || x % 8 == 4 { 50 } else { 0 };
        Luma([background + strand + offset])
    })
}

/// Writes a PNG to a temp file that is removed on drop
pub fn write_temp_png(bytes: &[u8]) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    std::fs::write(file.path(), bytes).expect("Failed to write test image");
    file
}

/// Fixed-threshold config at fixture resolution, no smoothing, no opening
pub fn fixed_config(sensitivity: f64) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.working_width = SIZE;
    config.working_height = SIZE;
    config.threshold.mode = ThresholdMode::Fixed;
    config.denoise.enabled = false;
    config.kernel_size = 0;
    config.sensitivity = sensitivity;
    config
}

pub fn adaptive_config() -> PipelineConfig {
    let mut config = fixed_config(1.0);
    config.threshold.mode = ThresholdMode::Adaptive;
    config
}

pub fn variance(values: &[f64]) -> f64 {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}
