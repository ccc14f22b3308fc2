//! Month name detection.

use lazy_static::lazy_static;
use regex::Regex;

use super::{ExtractionMatch, FieldExtractor};

/// Accepted spellings and their canonical display form, in lookup order.
///
/// The first spelling present in the text wins, not the first month
/// mentioned in the text.
pub const MONTH_SPELLINGS: [(&str, &str); 15] = [
    ("janvier", "Janvier"),
    ("février", "Février"),
    ("fevrier", "Février"),
    ("mars", "Mars"),
    ("avril", "Avril"),
    ("mai", "Mai"),
    ("juin", "Juin"),
    ("juillet", "Juillet"),
    ("août", "Août"),
    ("aout", "Août"),
    ("septembre", "Septembre"),
    ("octobre", "Octobre"),
    ("novembre", "Novembre"),
    ("décembre", "Décembre"),
    ("decembre", "Décembre"),
];

lazy_static! {
    static ref MONTH_PATTERNS: Vec<(Regex, &'static str)> = MONTH_SPELLINGS
        .iter()
        .map(|(spelling, canonical)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(spelling));
            (Regex::new(&pattern).unwrap(), *canonical)
        })
        .collect();
}

/// Month field extractor.
pub struct MonthExtractor;

impl MonthExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MonthExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for MonthExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        MONTH_PATTERNS.iter().find_map(|(pattern, canonical)| {
            pattern.find(text).map(|m| {
                ExtractionMatch::new(canonical.to_string(), 0.8, m.as_str())
                    .with_position(m.start(), m.end())
            })
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = Vec::new();

        for (pattern, canonical) in MONTH_PATTERNS.iter() {
            if results.iter().any(|r| r.value == *canonical) {
                continue;
            }
            if let Some(m) = pattern.find(text) {
                results.push(
                    ExtractionMatch::new(canonical.to_string(), 0.8, m.as_str())
                        .with_position(m.start(), m.end()),
                );
            }
        }

        results
    }
}

/// Extract the canonical month name, or an empty string.
pub fn extract_month(text: &str) -> String {
    MonthExtractor::new()
        .extract(text)
        .map(|m| m.value)
        .unwrap_or_default()
}

/// Canonical form of a month name typed by a user, if it is one.
pub fn canonical_month(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    MONTH_SPELLINGS
        .iter()
        .find(|(spelling, canonical)| input == *spelling || input == canonical.to_lowercase())
        .map(|(_, canonical)| *canonical)
}
