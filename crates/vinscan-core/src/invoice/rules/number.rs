//! Invoice number extraction.

use super::patterns::{
    INVOICE_NUMBER_BARE_N, INVOICE_NUMBER_EN_COMPTE, INVOICE_NUMBER_MARKED, NUMBER_SIGN,
};
use super::{capture_match, ExtractionMatch, FieldExtractor};

/// Invoice number field extractor.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let chain = [
            (&*INVOICE_NUMBER_EN_COMPTE, 0.95),
            (&*INVOICE_NUMBER_MARKED, 0.85),
            (&*INVOICE_NUMBER_BARE_N, 0.7),
            (&*NUMBER_SIGN, 0.5),
        ];

        chain.into_iter().find_map(|(pattern, confidence)| {
            pattern
                .captures(text)
                .map(|caps| capture_match(&caps, caps[1].trim().to_string(), confidence))
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let chain = [
            (&*INVOICE_NUMBER_EN_COMPTE, 0.95),
            (&*INVOICE_NUMBER_MARKED, 0.85),
            (&*INVOICE_NUMBER_BARE_N, 0.7),
            (&*NUMBER_SIGN, 0.5),
        ];
        let mut results: Vec<Self::Output> = Vec::new();

        for (pattern, confidence) in chain {
            for caps in pattern.captures_iter(text) {
                let number = caps[1].trim().to_string();

                // Skip if a more specific rule already found it
                if results.iter().any(|r| r.value == number) {
                    continue;
                }
                results.push(capture_match(&caps, number, confidence));
            }
        }

        results
    }
}

/// Extract the invoice number, or an empty string.
pub fn extract_invoice_number(text: &str) -> String {
    InvoiceNumberExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}
