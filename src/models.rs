use image::{GrayImage, Luma};
use serde::Serialize;

use crate::error::AnalysisError;

pub const BRIGHT: u8 = 255;
pub const DARK: u8 = 0;

/// Per-pixel bright/dark classification with the same dimensions as the
/// grayscale image it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    cells: GrayImage,
}

impl BinaryMask {
    /// All-dark mask
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: GrayImage::from_pixel(width, height, Luma([DARK])),
        }
    }

    /// Build from a 0/255 image; any non-zero cell counts as bright
    pub fn from_gray(image: &GrayImage) -> Self {
        let mut cells = image.clone();
        for pixel in cells.pixels_mut() {
            pixel[0] = if pixel[0] != DARK { BRIGHT } else { DARK };
        }
        Self { cells }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        Self {
            cells: GrayImage::from_fn(width, height, |x, y| {
                Luma([if f(x, y) { BRIGHT } else { DARK }])
            }),
        }
    }

    pub fn width(&self) -> u32 {
        self.cells.width()
    }

    pub fn height(&self) -> u32 {
        self.cells.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.cells.dimensions()
    }

    pub fn is_bright(&self, x: u32, y: u32) -> bool {
        self.cells.get_pixel(x, y)[0] == BRIGHT
    }

    pub fn set(&mut self, x: u32, y: u32, bright: bool) {
        self.cells
            .put_pixel(x, y, Luma([if bright { BRIGHT } else { DARK }]));
    }

    pub fn bright_count(&self) -> u64 {
        self.cells.pixels().filter(|p| p[0] == BRIGHT).count() as u64
    }

    pub fn total_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.cells
    }

    pub fn into_gray(self) -> GrayImage {
        self.cells
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceBucket {
    Low,
    Medium,
    High,
}

/// Result of one successful pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    /// Reported percentage after scaling, clamping and rounding
    pub ratio: f64,
    pub bucket: AdviceBucket,
    pub advice: String,
    pub bright_pixels: u64,
    pub total_pixels: u64,
}

/// Response payload: either the analysis or a structured error
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Report {
    Success {
        ratio: f64,
        bucket: AdviceBucket,
        advice: String,
    },
    Failure {
        error: String,
        kind: String,
    },
}

impl Report {
    pub fn is_success(&self) -> bool {
        matches!(self, Report::Success { .. })
    }

    pub fn failure(error: impl Into<String>, kind: impl Into<String>) -> Self {
        Report::Failure {
            error: error.into(),
            kind: kind.into(),
        }
    }
}

impl From<&Analysis> for Report {
    fn from(analysis: &Analysis) -> Self {
        Report::Success {
            ratio: analysis.ratio,
            bucket: analysis.bucket,
            advice: analysis.advice.clone(),
        }
    }
}

impl From<&AnalysisError> for Report {
    fn from(err: &AnalysisError) -> Self {
        Report::failure(err.to_string(), err.kind())
    }
}

impl From<std::result::Result<Analysis, AnalysisError>> for Report {
    fn from(result: std::result::Result<Analysis, AnalysisError>) -> Self {
        match result {
            Ok(analysis) => Report::from(&analysis),
            Err(err) => Report::from(&err),
        }
    }
}
