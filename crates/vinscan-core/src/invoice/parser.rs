//! Rule-based invoice parser.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::invoice::InvoiceRecord;

use super::normalize::normalize;
use super::rules::{
    AddressExtractor, ExtractionMatch, FieldExtractor, InvoiceNumberExtractor, LineItemExtractor,
    MonthExtractor, PayerCodeExtractor, PurchaseOrderExtractor,
};

/// Result of invoice extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted record, `raw_text` holding the normalized text.
    pub record: InvoiceRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
///
/// Parsing never fails: fields that cannot be found are left empty and
/// reported as warnings.
pub trait InvoiceParser {
    /// Parse an invoice from raw OCR text.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Parser running every field extractor over the normalized text.
pub struct RuleBasedParser {
    invoice_number: InvoiceNumberExtractor,
    address: AddressExtractor,
    payer: PayerCodeExtractor,
    month: MonthExtractor,
    purchase_order: PurchaseOrderExtractor,
    items: LineItemExtractor,
}

impl RuleBasedParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            invoice_number: InvoiceNumberExtractor::new(),
            address: AddressExtractor::new(),
            payer: PayerCodeExtractor::new(),
            month: MonthExtractor::new(),
            purchase_order: PurchaseOrderExtractor::new(),
            items: LineItemExtractor::new(),
        }
    }

    /// Set the payer codes searched for when no "DOIT" label is present.
    pub fn with_known_payer_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.payer = PayerCodeExtractor::new().with_known_codes(codes);
        self
    }

    /// Set whether the loose line item pass may run.
    pub fn with_item_fallback(mut self, fallback: bool) -> Self {
        self.items = LineItemExtractor::new().with_fallback(fallback);
        self
    }
}

fn first_value<E>(extractor: &E, text: &str) -> String
where
    E: FieldExtractor<Output = ExtractionMatch<String>>,
{
    extractor.extract(text).map(|m| m.value).unwrap_or_default()
}

impl Default for RuleBasedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();

        let normalized = normalize(text);
        info!("Parsing invoice from {} characters of text", normalized.len());

        let mut record = InvoiceRecord::new(normalized);
        let text = record.raw_text.as_str();

        let invoice_number = first_value(&self.invoice_number, text);
        let delivery_address = first_value(&self.address, text);
        let payer_code = first_value(&self.payer, text);
        let month = first_value(&self.month, text);
        let purchase_order_ref = first_value(&self.purchase_order, text);
        let line_items = self
            .items
            .extract_all(text)
            .into_iter()
            .map(|m| m.value)
            .collect();

        record.invoice_number = invoice_number;
        record.delivery_address = delivery_address;
        record.payer_code = payer_code;
        record.month = month;
        record.purchase_order_ref = purchase_order_ref;
        record.line_items = line_items;

        let warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field.replace('_', " ")))
            .collect();

        for warning in &warnings {
            debug!("{}", warning);
        }

        ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
