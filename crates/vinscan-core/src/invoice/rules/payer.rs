//! Payer code ("DOIT") extraction.

use super::patterns::PAYER_CODE;
use super::{capture_match, ExtractionMatch, FieldExtractor};

/// Payer codes looked up when no "DOIT" label is present, in priority order.
///
/// When several of them occur in the same text the first one of this list
/// wins, whatever their position in the text.
pub const KNOWN_PAYER_CODES: [&str; 3] = ["S2M", "ULYS", "DLP"];

/// Payer code field extractor.
pub struct PayerCodeExtractor {
    known_codes: Vec<String>,
}

impl PayerCodeExtractor {
    pub fn new() -> Self {
        Self {
            known_codes: KNOWN_PAYER_CODES.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Replace the fallback code list (order is the lookup priority).
    pub fn with_known_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    fn known_code_matches(&self, text: &str) -> Vec<ExtractionMatch<String>> {
        let haystack = text.to_uppercase();

        self.known_codes
            .iter()
            .filter(|code| !code.is_empty())
            .filter_map(|code| {
                haystack
                    .find(&code.to_uppercase())
                    .map(|_| ExtractionMatch::new(code.clone(), 0.5, code.as_str()))
            })
            .collect()
    }
}

impl Default for PayerCodeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PayerCodeExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        if let Some(caps) = PAYER_CODE.captures(text) {
            return Some(capture_match(&caps, caps[1].trim().to_string(), 0.9));
        }

        self.known_code_matches(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = PAYER_CODE
            .captures_iter(text)
            .map(|caps| capture_match(&caps, caps[1].trim().to_string(), 0.9))
            .collect();

        for candidate in self.known_code_matches(text) {
            if results.iter().all(|r| !r.value.eq_ignore_ascii_case(&candidate.value)) {
                results.push(candidate);
            }
        }

        results
    }
}

/// Extract the payer code, or an empty string.
pub fn extract_payer_code(text: &str) -> String {
    PayerCodeExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doit_label() {
        assert_eq!(extract_payer_code("DOIT: S2M"), "S2M");
        assert_eq!(extract_payer_code("Doit - CAV12\nMai"), "CAV12");
        assert_eq!(extract_payer_code("DOIT\nDLP"), "DLP");
    }

    #[test]
    fn test_doit_must_be_a_word() {
        // "ENDOIT" is not a label, the known-code fallback applies
        assert_eq!(extract_payer_code("ENDOIT ABC\nlivré chez ULYS"), "ULYS");
    }

    #[test]
    fn test_known_code_fallback() {
        assert_eq!(extract_payer_code("Livraison ULYS entrepôt"), "ULYS");
        assert_eq!(extract_payer_code("client: ulys"), "ULYS");
    }

    #[test]
    fn test_fallback_uses_list_order() {
        // DLP appears first in the text, but S2M comes first in the list
        assert_eq!(extract_payer_code("DLP / S2M"), "S2M");
    }

    #[test]
    fn test_custom_codes() {
        let extractor = PayerCodeExtractor::new().with_known_codes(["CAVE", "DLP"]);
        assert_eq!(extractor.extract("DLP ou CAVE").unwrap().value, "CAVE");
        assert!(extractor.extract("S2M").is_none());
    }
}
