//! OCR collaborators: image preprocessing and remote text detection.

mod preprocessing;
#[cfg(feature = "remote")]
mod vision;

pub use preprocessing::ImagePreprocessor;
#[cfg(feature = "remote")]
pub use vision::VisionClient;

use crate::error::OcrError;

/// A text detection service.
///
/// Implementations turn an encoded image (JPEG or PNG) into its full text.
/// An image without any text is not an error and yields an empty string.
pub trait TextDetector {
    /// Detect all text in the image.
    fn detect_text(&self, image: &[u8]) -> Result<String, OcrError>;
}

impl<F> TextDetector for F
where
    F: Fn(&[u8]) -> Result<String, OcrError>,
{
    fn detect_text(&self, image: &[u8]) -> Result<String, OcrError> {
        self(image)
    }
}
