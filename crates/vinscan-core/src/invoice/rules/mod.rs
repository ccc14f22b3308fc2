//! Rule-based field extractors for wine delivery invoices.
//!
//! Every extractor is an ordered fallback chain: the most structured pattern
//! is tried first and the first rule that matches wins. Extractors never
//! fail; a field that cannot be found comes back empty.

pub mod address;
pub mod items;
pub mod month;
pub mod number;
pub mod patterns;
pub mod payer;
pub mod purchase_order;

pub use address::{extract_delivery_address, AddressExtractor};
pub use items::{extract_items, LineItemExtractor};
pub use month::{canonical_month, extract_month, MonthExtractor, MONTH_SPELLINGS};
pub use number::{extract_invoice_number, InvoiceNumberExtractor};
pub use payer::{extract_payer_code, PayerCodeExtractor, KNOWN_PAYER_CODES};
pub use purchase_order::{extract_purchase_order, PurchaseOrderExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract every candidate, most specific rule first.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// Extraction context with confidence scores.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Position in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Build a match from the full regex match and one captured value.
pub(crate) fn capture_match(
    caps: &regex::Captures<'_>,
    value: String,
    confidence: f32,
) -> ExtractionMatch<String> {
    let full = caps.get(0).expect("group 0 is always present");
    ExtractionMatch::new(value, confidence, full.as_str()).with_position(full.start(), full.end())
}
