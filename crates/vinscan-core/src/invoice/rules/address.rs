//! Delivery address extraction.

use super::patterns::{ADDRESS_LOOSE, DELIVERY_ADDRESS};
use super::{capture_match, ExtractionMatch, FieldExtractor};

/// Delivery address field extractor.
pub struct AddressExtractor;

impl AddressExtractor {
    pub fn new() -> Self {
        Self
    }

    fn labeled(&self, text: &str) -> Option<ExtractionMatch<String>> {
        DELIVERY_ADDRESS.captures(text).map(|caps| {
            let address = caps[1].trim().trim_end_matches('.').to_string();
            capture_match(&caps, address, 0.9)
        })
    }

    fn loose(&self, text: &str) -> Option<ExtractionMatch<String>> {
        ADDRESS_LOOSE.captures(text).map(|caps| {
            let address = caps[1].trim().lines().next().unwrap_or("").to_string();
            capture_match(&caps, address, 0.6)
        })
    }
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AddressExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.labeled(text).or_else(|| self.loose(text))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = self.labeled(text).into_iter().collect();

        if let Some(loose) = self.loose(text) {
            if results.iter().all(|r| r.value != loose.value) {
                results.push(loose);
            }
        }

        results
    }
}

/// Extract the delivery address, or an empty string.
pub fn extract_delivery_address(text: &str) -> String {
    AddressExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}
