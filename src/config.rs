use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AnalysisError, Result};

/// How the binarizer decides that a pixel is bright
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Global cutoff, bright iff intensity >= cutoff
    Fixed,
    /// Local neighbourhood average minus a constant
    Adaptive,
}

/// Weighting used for the adaptive neighbourhood average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    Mean,
    Gaussian,
}

/// How pixels outside the image are filled when a window hangs over the edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    /// `aaa|abcd|ddd`
    Replicate,
    /// `cb|abcd|cb`
    Reflect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DenoiseConfig {
    pub enabled: bool,
    /// Neighbourhood diameter in pixels
    pub diameter: u32,
    /// Colour-similarity sigma (intensity units)
    pub sigma_color: f32,
    /// Spatial sigma (pixels)
    pub sigma_space: f32,
}

impl Default for DenoiseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            diameter: 9,
            sigma_color: 75.0,
            sigma_space: 75.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub mode: ThresholdMode,
    /// Cutoff for fixed mode, 0..=255
    pub fixed_cutoff: i32,
    pub adaptive_method: AdaptiveMethod,
    /// Odd window size > 1 for adaptive mode
    pub block_size: u32,
    /// Subtracted from the local average
    pub constant: f32,
    pub border: BorderMode,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            mode: ThresholdMode::Adaptive,
            fixed_cutoff: 200,
            adaptive_method: AdaptiveMethod::Gaussian,
            block_size: 11,
            constant: 2.0,
            border: BorderMode::Replicate,
        }
    }
}

/// Ratio breakpoints and the comment attached to each bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceConfig {
    /// Ratios below this are LOW
    pub low_below: f64,
    /// Ratios below this (and not LOW) are MEDIUM, everything else HIGH
    pub medium_below: f64,
    pub low_text: String,
    pub medium_text: String,
    pub high_text: String,
}

impl Default for AdviceConfig {
    fn default() -> Self {
        Self {
            low_below: 5.0,
            medium_below: 15.0,
            low_text: "Excellent! Almost no gray hair to be seen.".to_string(),
            medium_text: "Gray hair is starting to show. A scalp massage can help.".to_string(),
            high_text: "Gray hair has spread overall. Consider care at a salon.".to_string(),
        }
    }
}

/// The complete, immutable set of knobs for one analysis run.
///
/// Every stage reads its parameters from here; nothing is re-derived from
/// constants further down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub working_width: u32,
    pub working_height: u32,
    pub denoise: DenoiseConfig,
    pub threshold: ThresholdConfig,
    /// Opening kernel edge length, 0 disables the refiner
    pub kernel_size: i32,
    /// Linear factor from raw bright-area percentage to reported ratio
    pub sensitivity: f64,
    pub clamp_min: f64,
    pub clamp_max: f64,
    /// Decimal places kept in the reported ratio
    pub precision: u32,
    pub advice: AdviceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            working_width: 600,
            working_height: 600,
            denoise: DenoiseConfig::default(),
            threshold: ThresholdConfig::default(),
            kernel_size: 2,
            sensitivity: 0.5,
            clamp_min: 0.0,
            clamp_max: 100.0,
            precision: 2,
            advice: AdviceConfig::default(),
        }
    }
}

pub const MAX_PRECISION: u32 = 6;
/// Largest working width or height
pub const MAX_WORKING_DIMENSION: u32 = 2048;
pub const MAX_DENOISE_DIAMETER: u32 = 31;
pub const MAX_BLOCK_SIZE: u32 = 255;
pub const MAX_KERNEL_SIZE: i32 = 31;

impl PipelineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AnalysisError::InvalidConfig(msg));

        if self.working_width == 0 || self.working_height == 0 {
            return invalid(format!(
                "working resolution must be non-zero, got {}x{}",
                self.working_width, self.working_height
            ));
        }
        if self.working_width > MAX_WORKING_DIMENSION || self.working_height > MAX_WORKING_DIMENSION {
            return invalid(format!(
                "working resolution {}x{} exceeds {}",
                self.working_width, self.working_height, MAX_WORKING_DIMENSION
            ));
        }

        if self.denoise.enabled {
            let d = &self.denoise;
            if d.diameter == 0 {
                return invalid("denoise diameter must be positive".to_string());
            }
            if d.diameter > MAX_DENOISE_DIAMETER {
                return invalid(format!(
                    "denoise diameter {} exceeds {}",
                    d.diameter, MAX_DENOISE_DIAMETER
                ));
            }
            if !(d.sigma_color > 0.0 && d.sigma_color.is_finite())
                || !(d.sigma_space > 0.0 && d.sigma_space.is_finite())
            {
                return invalid(format!(
                    "denoise sigmas must be positive, got color={} space={}",
                    d.sigma_color, d.sigma_space
                ));
            }
        }

        let t = &self.threshold;
        if !(0..=255).contains(&t.fixed_cutoff) {
            return invalid(format!("fixed cutoff {} outside 0..=255", t.fixed_cutoff));
        }
        if t.block_size <= 1 || t.block_size % 2 == 0 {
            return invalid(format!("block size must be odd and > 1, got {}", t.block_size));
        }
        if t.block_size > MAX_BLOCK_SIZE {
            return invalid(format!("block size {} exceeds {}", t.block_size, MAX_BLOCK_SIZE));
        }
        if !t.constant.is_finite() {
            return invalid("adaptive constant must be finite".to_string());
        }

        if self.kernel_size < 0 {
            return invalid(format!("kernel size must not be negative, got {}", self.kernel_size));
        }
        if self.kernel_size > MAX_KERNEL_SIZE {
            return invalid(format!("kernel size {} exceeds {}", self.kernel_size, MAX_KERNEL_SIZE));
        }

        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return invalid(format!("sensitivity must be finite and >= 0, got {}", self.sensitivity));
        }

        if !(0.0..=100.0).contains(&self.clamp_min)
            || !(0.0..=100.0).contains(&self.clamp_max)
            || self.clamp_min > self.clamp_max
        {
            return invalid(format!(
                "clamp bounds must satisfy 0 <= min <= max <= 100, got [{}, {}]",
                self.clamp_min, self.clamp_max
            ));
        }

        if self.precision > MAX_PRECISION {
            return invalid(format!("precision {} exceeds {}", self.precision, MAX_PRECISION));
        }

        let a = &self.advice;
        if !(0.0..=100.0).contains(&a.low_below)
            || !(0.0..=100.0).contains(&a.medium_below)
            || a.low_below > a.medium_below
        {
            return invalid(format!(
                "advice breakpoints must satisfy 0 <= low <= medium <= 100, got {} / {}",
                a.low_below, a.medium_below
            ));
        }

        Ok(())
    }

    /// Fixed cutoff as a pixel value. Only meaningful after `validate`.
    pub fn cutoff(&self) -> u8 {
        self.threshold.fixed_cutoff.clamp(0, 255) as u8
    }

    /// Kernel edge length. Only meaningful after `validate`.
    pub fn kernel(&self) -> u32 {
        self.kernel_size.max(0) as u32
    }
}
