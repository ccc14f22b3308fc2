//! Bottle line extraction.
//!
//! Invoice tables come out of OCR as one line per product, e.g.
//! `Château Margaux 75cl 12 34 6`: product name, bottle format, two numeric
//! columns and the bottle count last. When no line has that shape, a looser
//! pass keeps any line mentioning the 75 cl format and takes its last number.

use tracing::debug;

use crate::models::invoice::{coerce_count, LineItem};

use super::patterns::{BOTTLE_LINE, DIGIT_RUN, MULTI_SPACE};
use super::{ExtractionMatch, FieldExtractor};

/// Line item extractor.
pub struct LineItemExtractor {
    fallback: bool,
}

impl LineItemExtractor {
    pub fn new() -> Self {
        Self { fallback: true }
    }

    /// Set whether the loose pass runs when the structured one finds nothing.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    fn structured(&self, lines: &[&str]) -> Vec<ExtractionMatch<LineItem>> {
        lines
            .iter()
            .filter_map(|line| {
                let caps = BOTTLE_LINE.captures(line)?;
                let article = MULTI_SPACE.replace_all(caps[1].trim(), " ").to_string();
                let item = LineItem::new(article, coerce_count(&caps[2]));
                Some(ExtractionMatch::new(item, 0.9, *line))
            })
            .collect()
    }

    fn loose(&self, lines: &[&str]) -> Vec<ExtractionMatch<LineItem>> {
        lines
            .iter()
            .filter(|line| line.contains("75") || line.to_lowercase().contains("cls"))
            .filter_map(|line| {
                let count = DIGIT_RUN.find_iter(line).last()?;
                let article = DIGIT_RUN.replace_all(line, "").trim().to_string();
                let item = LineItem::new(article, coerce_count(count.as_str()));
                Some(ExtractionMatch::new(item, 0.4, *line))
            })
            .collect()
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for LineItemExtractor {
    type Output = ExtractionMatch<LineItem>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        let items = self.structured(&lines);
        if !items.is_empty() || !self.fallback {
            return items;
        }

        let items = self.loose(&lines);
        if !items.is_empty() {
            debug!("No structured bottle line, kept {} loose lines", items.len());
        }
        items
    }
}

/// Extract every bottle line, in text order.
pub fn extract_items(text: &str) -> Vec<LineItem> {
    LineItemExtractor::new()
        .extract_all(text)
        .into_iter()
        .map(|m| m.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structured_line() {
        assert_eq!(
            extract_items("Château Margaux 75cl  12  34  6"),
            vec![LineItem::new("Château Margaux", 6)]
        );
    }

    #[test]
    fn test_marker_variants() {
        let text = "Chablis 1er Cru 75 cl 10 20 12\n\
                    Pomerol   Grand  Vin 75 CLS 3 4 24\n\
                    Sancerre 75cls 1 2 3\n\
                    Brouilly 75 8 9 18";

        assert_eq!(
            extract_items(text),
            vec![
                LineItem::new("Chablis 1er Cru", 12),
                LineItem::new("Pomerol Grand Vin", 24),
                LineItem::new("Sancerre", 3),
                LineItem::new("Brouilly", 18),
            ]
        );
    }

    #[test]
    fn test_structured_skips_other_lines() {
        let text = "FACTURE EN COMPTE N° 00123\n\
                    Désignation Qté PU Total\n\
                    Saint-Émilion 75cl 5 60 12\n\
                    Total 720";

        assert_eq!(
            extract_items(text),
            vec![LineItem::new("Saint-Émilion", 12)]
        );
    }

    #[test]
    fn test_loose_fallback() {
        let text = "Margaux 75 cl x 6\nSans format\nMagnum cls 2";

        assert_eq!(
            extract_items(text),
            vec![
                LineItem::new("Margaux  cl x", 6),
                LineItem::new("Magnum cls", 2),
            ]
        );
    }

    #[test]
    fn test_fallback_only_when_structured_is_empty() {
        let text = "Chablis 75cl 1 2 6\nMargaux 75 cl x 6";
        assert_eq!(extract_items(text), vec![LineItem::new("Chablis", 6)]);

        let strict = LineItemExtractor::new().with_fallback(false);
        assert!(strict.extract_all("Margaux 75 cl x 6").is_empty());
    }

    #[test]
    fn test_no_items() {
        assert!(extract_items("").is_empty());
        assert!(extract_items("Merci de votre commande").is_empty());
    }
}
