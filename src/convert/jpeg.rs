/// Single-image PNG to JPEG conversion
///
/// Decodes the source, flattens any transparency onto white and
/// re-encodes as baseline JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::{imageops, DynamicImage, ImageReader, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

use super::error::{ConvertError, Result};
use crate::state::data::{ConvertedImage, SourceImage};

/// Background used to flatten transparent pixels (JPEG has no alpha)
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Quality used when nothing else is configured
pub const DEFAULT_QUALITY: f32 = 0.9;

/// JPEG quality factor in [0.0, 1.0]
///
/// 1.0 = least compression / highest fidelity.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Quality(f32);

impl Quality {
    /// Validate a quality value
    ///
    /// NaN and infinities are rejected; finite values outside [0, 1] are
    /// clamped to the nearest bound.
    pub fn new(value: f32) -> Result<Self> {
        if !value.is_finite() {
            return Err(ConvertError::InvalidQuality(value));
        }

        let clamped = value.clamp(0.0, 1.0);
        if clamped != value {
            tracing::warn!("Quality {} out of range, clamped to {}", value, clamped);
        }

        Ok(Self(clamped))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Rounded percentage for display (0..=100)
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }

    /// Quality as understood by the JPEG encoder (1..=100)
    pub fn encoder_quality(self) -> u8 {
        self.percent().clamp(1, 100)
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(DEFAULT_QUALITY)
    }
}

/// One file plus the quality it should be encoded at
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: SourceImage,
    pub quality: Quality,
}

impl ConversionRequest {
    pub fn new(source: SourceImage, quality: Quality) -> Self {
        Self { source, quality }
    }

    /// Run the conversion; the source is left untouched
    pub fn convert(&self) -> Result<ConvertedImage> {
        let jpeg = convert_bytes(&self.source.bytes, self.quality)?;
        Ok(ConvertedImage::new(&self.source.name, jpeg))
    }
}

/// Convert encoded image bytes to JPEG bytes
pub fn convert_bytes(data: &[u8], quality: Quality) -> Result<Vec<u8>> {
    let decoded = decode(data)?;
    let surface = flatten_on_white(&decoded);
    encode(&surface, quality)
}

/// Decode source bytes, sniffing the format from content
fn decode(data: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ConvertError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| ConvertError::Decode(e.to_string()))
}

/// Composite the raster over an opaque white surface of the same size
fn flatten_on_white(decoded: &DynamicImage) -> RgbImage {
    let raster = decoded.to_rgba8();
    let mut surface = RgbaImage::from_pixel(raster.width(), raster.height(), BACKGROUND);
    imageops::overlay(&mut surface, &raster, 0, 0);

    // Every pixel is opaque now, so dropping alpha loses nothing
    DynamicImage::ImageRgba8(surface).to_rgb8()
}

fn encode(surface: &RgbImage, quality: Quality) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.encoder_quality());
        encoder
            .encode_image(surface)
            .map_err(|e| ConvertError::Encode(e.to_string()))?;
    }

    if buf.is_empty() {
        return Err(ConvertError::Encode("encoder produced no output".to_string()));
    }

    Ok(buf)
}
