//! Image preprocessing for OCR.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbImage};
use imageproc::filter::median_filter;
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::OcrConfig;

/// Image preprocessor for the OCR pipeline.
///
/// Photos of paper invoices are downscaled, contrast-stretched, lightly
/// denoised and sharpened before being sent to text detection.
pub struct ImagePreprocessor {
    /// Maximum image width.
    max_width: u32,
    /// Quality of the re-encoded JPEG.
    jpeg_quality: u8,
    /// Median filter radius (1 = 3x3).
    median_radius: u32,
    /// Unsharp mask blur sigma.
    unsharp_sigma: f32,
    /// Unsharp mask threshold.
    unsharp_threshold: i32,
}

impl ImagePreprocessor {
    /// Create a new preprocessor with default settings.
    pub fn new() -> Self {
        Self {
            max_width: 2600,
            jpeg_quality: 90,
            median_radius: 1,
            unsharp_sigma: 1.0,
            unsharp_threshold: 3,
        }
    }

    /// Create a preprocessor from OCR configuration.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new()
            .with_max_width(config.max_width)
            .with_jpeg_quality(config.jpeg_quality)
    }

    /// Set maximum image width.
    pub fn with_max_width(mut self, width: u32) -> Self {
        self.max_width = width.max(1);
        self
    }

    /// Set JPEG output quality (1-100).
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Decode, enhance and re-encode an uploaded image as JPEG.
    pub fn prepare(&self, image_bytes: &[u8]) -> Result<Vec<u8>, OcrError> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let enhanced = self.enhance(&image);

        let mut buffer = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.jpeg_quality);
        encoder
            .encode_image(&enhanced)
            .map_err(|e| OcrError::Preprocessing(e.to_string()))?;

        debug!(
            "Prepared {}x{} image ({} bytes -> {} bytes)",
            enhanced.width(),
            enhanced.height(),
            image_bytes.len(),
            buffer.len()
        );

        Ok(buffer)
    }

    /// Apply resize, auto-contrast, denoise and sharpen.
    pub fn enhance(&self, image: &DynamicImage) -> RgbImage {
        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);

        let mut rgb = image.to_rgb8();
        if (new_width, new_height) != (width, height) {
            debug!("Resizing {}x{} to {}x{}", width, height, new_width, new_height);
            rgb = image::imageops::resize(&rgb, new_width, new_height, FilterType::Lanczos3);
        }

        autocontrast(&mut rgb);
        let denoised = median_filter(&rgb, self.median_radius, self.median_radius);
        image::imageops::unsharpen(&denoised, self.unsharp_sigma, self.unsharp_threshold)
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width {
            return (width, height);
        }

        let ratio = self.max_width as f64 / width as f64;
        let new_height = (height as f64 * ratio) as u32;

        (self.max_width, new_height.max(1))
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Stretch each channel so its darkest value maps to 0 and its lightest to 255.
fn autocontrast(image: &mut RgbImage) {
    let mut low = [u8::MAX; 3];
    let mut high = [u8::MIN; 3];

    for pixel in image.pixels() {
        for c in 0..3 {
            low[c] = low[c].min(pixel[c]);
            high[c] = high[c].max(pixel[c]);
        }
    }

    let mut lut = [[0u8; 256]; 3];
    for c in 0..3 {
        for (value, slot) in lut[c].iter_mut().enumerate() {
            *slot = if high[c] <= low[c] {
                value as u8
            } else {
                let scaled = (value as f32 - low[c] as f32) * 255.0 / (high[c] - low[c]) as f32;
                scaled.round().clamp(0.0, 255.0) as u8
            };
        }
    }

    for pixel in image.pixels_mut() {
        for c in 0..3 {
            pixel[c] = lut[c][pixel[c] as usize];
        }
    }
}
