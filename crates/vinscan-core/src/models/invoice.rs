//! Invoice data models for wine delivery invoices.

use serde::{Deserialize, Deserializer, Serialize};

/// Canonical month names, in calendar order.
pub const MONTHS: [&str; 12] = [
    "Janvier",
    "Février",
    "Mars",
    "Avril",
    "Mai",
    "Juin",
    "Juillet",
    "Août",
    "Septembre",
    "Octobre",
    "Novembre",
    "Décembre",
];

/// Structured result of one extraction pass.
///
/// Every text field may be empty: a missing field is a normal outcome left
/// for the reviewer to fill in before the record is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceRecord {
    /// Normalized OCR text, kept for review.
    pub raw_text: String,

    /// Invoice number (digits only).
    pub invoice_number: String,

    /// Delivery address (single line).
    pub delivery_address: String,

    /// Billed party code (the "DOIT" field).
    pub payer_code: String,

    /// Canonical month name from [`MONTHS`], or empty.
    pub month: String,

    /// Purchase-order reference.
    pub purchase_order_ref: String,

    /// Bottle lines in text order.
    pub line_items: Vec<LineItem>,
}

/// Record-level columns repeated on every written row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub month: String,
    pub payer_code: String,
    pub purchase_order_ref: String,
    pub delivery_address: String,
}

impl InvoiceRecord {
    /// Create an empty record around normalized text.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Self::default()
        }
    }

    /// Columns shared by all rows of this record.
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            month: self.month.clone(),
            payer_code: self.payer_code.clone(),
            purchase_order_ref: self.purchase_order_ref.clone(),
            delivery_address: self.delivery_address.clone(),
        }
    }

    /// Names of the fields that came out empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.invoice_number.is_empty() {
            missing.push("invoice_number");
        }
        if self.delivery_address.is_empty() {
            missing.push("delivery_address");
        }
        if self.payer_code.is_empty() {
            missing.push("payer_code");
        }
        if self.month.is_empty() {
            missing.push("month");
        }
        if self.purchase_order_ref.is_empty() {
            missing.push("purchase_order_ref");
        }
        if self.line_items.is_empty() {
            missing.push("line_items");
        }

        missing
    }

    /// Line items prepared for manual editing.
    ///
    /// An extraction without any bottle line still gets one blank row so the
    /// reviewer has something to fill in.
    pub fn editable_items(&self) -> Vec<LineItem> {
        if self.line_items.is_empty() {
            vec![LineItem::placeholder()]
        } else {
            self.line_items.clone()
        }
    }

    /// Items that would actually be written (placeholders dropped).
    pub fn writable_items(&self) -> Vec<LineItem> {
        writable_items(&self.line_items)
    }
}

/// Drop placeholder rows, keeping order.
pub fn writable_items(items: &[LineItem]) -> Vec<LineItem> {
    items
        .iter()
        .filter(|item| !item.is_placeholder())
        .cloned()
        .collect()
}

/// A single bottle line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product description.
    #[serde(default, deserialize_with = "deserialize_article")]
    pub article: String,

    /// Number of bottles.
    #[serde(default, deserialize_with = "deserialize_count")]
    pub bottle_count: u32,
}

impl LineItem {
    pub fn new(article: impl Into<String>, bottle_count: u32) -> Self {
        Self {
            article: article.into(),
            bottle_count,
        }
    }

    /// Blank row offered for editing.
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Blank article and zero bottles.
    pub fn is_placeholder(&self) -> bool {
        self.article.trim().is_empty() && self.bottle_count == 0
    }
}

/// Coerce a free-form count into a bottle count.
///
/// Anything that does not read as a number becomes 0, negative values clamp
/// to 0 and fractional values are truncated.
pub fn coerce_count(raw: &str) -> u32 {
    let raw = raw.trim();

    if let Ok(n) = raw.parse::<i64>() {
        return n.clamp(0, u32::MAX as i64) as u32;
    }

    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() && f > 0.0 => f.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;

    Ok(match value {
        serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.clamp(0, u32::MAX as i64) as u32,
            (None, Some(f)) => coerce_count(&f.to_string()),
            _ => 0,
        },
        serde_json::Value::String(s) => coerce_count(&s),
        _ => 0,
    })
}

fn deserialize_article<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

/// Outcome of one batch append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchWriteResult {
    /// First written data row (1-based).
    pub start_row: usize,

    /// Last written data row (1-based, inclusive).
    pub end_row: usize,

    /// Palette slot used for the batch background.
    pub color_index: usize,

    /// Why the background could not be applied, when it could not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coloring_error: Option<String>,
}

impl BatchWriteResult {
    /// Number of rows covered by the batch.
    pub fn row_count(&self) -> usize {
        (self.end_row + 1).saturating_sub(self.start_row)
    }

    /// Whether the background annotation was applied.
    pub fn colored(&self) -> bool {
        self.coloring_error.is_none()
    }
}

/// Recap of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    pub month: String,
    pub payer_code: String,
    /// Date written in the date column (dd/mm/yyyy).
    pub sent_on: String,
    pub purchase_order_ref: String,
    pub delivery_address: String,
    pub rows_written: usize,
    pub writer: String,
}

impl WriteSummary {
    pub fn new(
        fields: &RecordFields,
        sent_on: impl Into<String>,
        rows_written: usize,
        writer: impl Into<String>,
    ) -> Self {
        Self {
            month: fields.month.clone(),
            payer_code: fields.payer_code.clone(),
            sent_on: sent_on.into(),
            purchase_order_ref: fields.purchase_order_ref.clone(),
            delivery_address: fields.delivery_address.clone(),
            rows_written,
            writer: writer.into(),
        }
    }
}
