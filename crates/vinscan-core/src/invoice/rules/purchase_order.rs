//! Purchase-order reference extraction.

use super::patterns::{PURCHASE_ORDER, PURCHASE_ORDER_LOOSE};
use super::{capture_match, ExtractionMatch, FieldExtractor};

/// Purchase-order field extractor.
pub struct PurchaseOrderExtractor;

impl PurchaseOrderExtractor {
    pub fn new() -> Self {
        Self
    }

    fn labeled(&self, text: &str) -> Option<ExtractionMatch<String>> {
        PURCHASE_ORDER
            .captures(text)
            .map(|caps| capture_match(&caps, caps[1].trim().to_string(), 0.9))
    }

    fn loose(&self, text: &str) -> Option<ExtractionMatch<String>> {
        let caps = PURCHASE_ORDER_LOOSE.captures(text)?;
        let token = caps[1].split_whitespace().next()?.to_string();
        Some(capture_match(&caps, token, 0.6))
    }
}

impl Default for PurchaseOrderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PurchaseOrderExtractor {
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

/// Extract the purchase-order reference, or an empty string.
pub fn extract_purchase_order(text: &str) -> String {
    PurchaseOrderExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_reference() {
        assert_eq!(
            extract_purchase_order("Suivant votre bon de commande : BC-2024/117 du 3 mai"),
            "BC-2024/117"
        );
        assert_eq!(
            extract_purchase_order("SUIVANT VOTRE BON DE COMMANDE 88412"),
            "88412"
        );
    }

    #[test]
    fn test_loose_reference_keeps_first_token() {
        assert_eq!(
            extract_purchase_order("Réf. bon de commande: 4471 urgent"),
            "4471"
        );
    }

    #[test]
    fn test_labeled_stops_at_punctuation() {
        assert_eq!(
            extract_purchase_order("Suivant votre bon de commande n°5512"),
            "n"
        );
    }

    #[test]
    fn test_no_reference() {
        assert_eq!(extract_purchase_order("Bon pour accord"), "");
    }
}
