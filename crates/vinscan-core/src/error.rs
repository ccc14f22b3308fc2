//! Error types for the vinscan-core library.

use thiserror::Error;

/// Main error type for the vinscan library.
#[derive(Error, Debug)]
pub enum VinscanError {
    /// OCR (preprocessing or text detection) failed.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Spreadsheet store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR collaborator is not configured (missing key or endpoint).
    #[error("OCR service unavailable: {0}")]
    Unavailable(String),

    /// Text detection request failed or the service reported an error.
    #[error("text detection failed: {0}")]
    Detection(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Invalid or undecodable image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to the shared spreadsheet.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The table handle could not be obtained (missing credentials or ids).
    #[error("table unavailable: {0}")]
    Unavailable(String),

    /// Transport-level failure talking to the store.
    #[error("request failed: {0}")]
    Request(String),

    /// The store answered with an error status.
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A single row append failed.
    #[error("append failed: {0}")]
    Append(String),

    /// The batch failed after some rows were already committed.
    #[error("batch write failed after {written} of {total} rows: {source}")]
    PartialWrite {
        written: usize,
        total: usize,
        #[source]
        source: Box<StoreError>,
    },

    /// Background coloring failed; the rows themselves are written.
    #[error("coloring failed: {0}")]
    Coloring(String),

    /// Nothing left to write once placeholder rows are dropped.
    #[error("no line items to write")]
    EmptyBatch,
}

/// Result type for the vinscan library.
pub type Result<T> = std::result::Result<T, VinscanError>;
