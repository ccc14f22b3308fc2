//! Core library for wine delivery invoice scanning.
//!
//! This crate provides:
//! - Image preprocessing and text detection (Google Cloud Vision)
//! - Rule-based extraction of invoice fields and bottle lines from OCR text
//! - A batch append engine writing records to a shared spreadsheet with
//!   per-scan row coloring
//! - Session state holding the writer identity and scan counter

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod session;
pub mod store;

#[cfg(all(test, feature = "remote"))]
mod canned_http;

pub use error::{OcrError, Result, StoreError, VinscanError};
pub use invoice::{normalize, ExtractionResult, InvoiceParser, RuleBasedParser};
pub use models::config::VinscanConfig;
pub use models::invoice::{BatchWriteResult, InvoiceRecord, LineItem, RecordFields, WriteSummary};
pub use ocr::{ImagePreprocessor, TextDetector};
#[cfg(feature = "remote")]
pub use ocr::VisionClient;
pub use pipeline::ScanPipeline;
pub use session::{ScanCounter, Session};
pub use store::{BatchAppender, InMemoryTable, SerializedTable, TableStore};
#[cfg(feature = "remote")]
pub use store::GoogleSheetsTable;
