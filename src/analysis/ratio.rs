use crate::config::PipelineConfig;
use crate::models::BinaryMask;

/// Turns a mask into the reported percentage
#[derive(Debug, Clone, PartialEq)]
pub struct RatioEstimator {
    pub sensitivity: f64,
    pub clamp_min: f64,
    pub clamp_max: f64,
    pub precision: u32,
}

impl RatioEstimator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            clamp_min: config.clamp_min,
            clamp_max: config.clamp_max,
            precision: config.precision,
        }
    }

    /// Bright share of the mask in percent, before any scaling
    pub fn raw_percentage(mask: &BinaryMask) -> f64 {
        let total = mask.total_count();
        if total == 0 {
            return 0.0;
        }
        mask.bright_count() as f64 / total as f64 * 100.0
    }

    pub fn estimate(&self, mask: &BinaryMask) -> f64 {
        self.scale(Self::raw_percentage(mask))
    }

    /// sensitivity -> clamp -> round
    pub fn scale(&self, raw_percentage: f64) -> f64 {
        let scaled = (raw_percentage * self.sensitivity).clamp(self.clamp_min, self.clamp_max);
        round_to(scaled, self.precision)
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
