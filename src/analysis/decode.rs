use image::{DynamicImage, ImageFormat, ImageResult, RgbImage};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};

/// A single way of turning bytes into pixels
pub trait Codec: Send + Sync {
    fn name(&self) -> &str;
    fn decode(&self, bytes: &[u8]) -> ImageResult<DynamicImage>;
}

/// Let the `image` crate sniff the format from the magic bytes
pub struct SniffedFormat;

impl Codec for SniffedFormat {
    fn name(&self) -> &str {
        "auto"
    }

    fn decode(&self, bytes: &[u8]) -> ImageResult<DynamicImage> {
        image::load_from_memory(bytes)
    }
}

/// Force a specific decoder, for files whose header confuses sniffing
pub struct ExplicitFormat {
    format: ImageFormat,
    name: String,
}

impl ExplicitFormat {
    pub fn new(format: ImageFormat) -> Self {
        let name = format
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("unknown")
            .to_string();
        Self { format, name }
    }
}

impl Codec for ExplicitFormat {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, bytes: &[u8]) -> ImageResult<DynamicImage> {
        image::load_from_memory_with_format(bytes, self.format)
    }
}

/// Tries each codec in order until one yields a non-empty image
pub struct Decoder {
    codecs: Vec<Box<dyn Codec>>,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            codecs: vec![
                Box::new(SniffedFormat),
                Box::new(ExplicitFormat::new(ImageFormat::Jpeg)),
                Box::new(ExplicitFormat::new(ImageFormat::Png)),
                Box::new(ExplicitFormat::new(ImageFormat::WebP)),
                Box::new(ExplicitFormat::new(ImageFormat::Tiff)),
                Box::new(ExplicitFormat::new(ImageFormat::Bmp)),
                Box::new(ExplicitFormat::new(ImageFormat::Gif)),
            ],
        }
    }

    pub fn with_codecs(codecs: Vec<Box<dyn Codec>>) -> Self {
        Self { codecs }
    }

    /// Decode to a 3-channel image, whatever the source layout
    pub fn decode(&self, bytes: &[u8]) -> Result<RgbImage> {
        if bytes.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let mut attempts = Vec::with_capacity(self.codecs.len());

        for (i, codec) in self.codecs.iter().enumerate() {
            match codec.decode(bytes) {
                Ok(img) if img.width() > 0 && img.height() > 0 => {
                    if i > 0 {
                        warn!(codec = codec.name(), "primary decoder failed, fallback succeeded");
                    }
                    debug!(
                        codec = codec.name(),
                        width = img.width(),
                        height = img.height(),
                        "decoded image"
                    );
                    return Ok(img.into_rgb8());
                }
                Ok(_) => attempts.push(format!("{}: empty image", codec.name())),
                Err(e) => attempts.push(format!("{}: {}", codec.name(), e)),
            }
        }

        Err(AnalysisError::Decode { attempts })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb};
    use std::io::Cursor;

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    struct AlwaysFails;

    impl Codec for AlwaysFails {
        fn name(&self) -> &str {
            "broken"
        }

        fn decode(&self, _bytes: &[u8]) -> ImageResult<DynamicImage> {
            Err(image::ImageError::Unsupported(
                image::error::UnsupportedError::from_format_and_kind(
                    image::error::ImageFormatHint::Unknown,
                    image::error::UnsupportedErrorKind::GenericFeature("test".to_string()),
                ),
            ))
        }
    }

    #[test]
    fn empty_bytes_are_empty_input() {
        assert!(matches!(Decoder::new().decode(&[]), Err(AnalysisError::EmptyInput)));
    }

    #[test]
    fn text_is_decode_error_listing_attempts() {
        let err = Decoder::new().decode(b"just some text, not a picture").unwrap_err();
        match err {
            AnalysisError::Decode { attempts } => assert_eq!(attempts.len(), 7),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn png_decodes_to_rgb() {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let decoded = Decoder::new().decode(&encode(&img, ImageFormat::Png)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn grayscale_png_widens_to_three_channels() {
        let gray = GrayImage::from_pixel(3, 2, Luma([77]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        let decoded: RgbImage = Decoder::new().decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert!(decoded.pixels().all(|p| *p == Rgb([77, 77, 77])));
    }

    #[test]
    fn falls_back_when_primary_codec_fails() {
        let img = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let bytes = encode(&img, ImageFormat::Png);
        let decoder = Decoder::with_codecs(vec![
            Box::new(AlwaysFails),
            Box::new(ExplicitFormat::new(ImageFormat::Png)),
        ]);
        assert_eq!(decoder.decode(&bytes).unwrap(), img);
    }
}
