//! Image to record pipeline.

use tracing::info;

use crate::error::OcrError;
use crate::invoice::{ExtractionResult, InvoiceParser, RuleBasedParser};
use crate::ocr::{ImagePreprocessor, TextDetector};

/// Runs preprocessing, text detection and field extraction for one image.
pub struct ScanPipeline<D> {
    detector: D,
    preprocessor: Option<ImagePreprocessor>,
    parser: RuleBasedParser,
}

impl<D: TextDetector> ScanPipeline<D> {
    /// Pipeline with default preprocessing and parsing.
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            preprocessor: Some(ImagePreprocessor::new()),
            parser: RuleBasedParser::new(),
        }
    }

    /// Replace the preprocessor; `None` sends images untouched.
    pub fn with_preprocessor(mut self, preprocessor: Option<ImagePreprocessor>) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn with_parser(mut self, parser: RuleBasedParser) -> Self {
        self.parser = parser;
        self
    }

    /// Build a record from an encoded image.
    pub fn scan(&self, image: &[u8]) -> Result<ExtractionResult, OcrError> {
        let prepared;
        let payload = match &self.preprocessor {
            Some(preprocessor) => {
                prepared = preprocessor.prepare(image)?;
                prepared.as_slice()
            }
            None => image,
        };

        let text = self.detector.detect_text(payload)?;
        info!("Text detection returned {} characters", text.len());

        Ok(self.parser.parse(&text))
    }

    /// Build a record from text that was already recognized.
    pub fn scan_text(&self, text: &str) -> ExtractionResult {
        self.parser.parse(text)
    }
}
