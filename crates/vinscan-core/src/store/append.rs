//! Batch append engine.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::error::StoreError;
use crate::models::invoice::{
    writable_items, BatchWriteResult, LineItem, RecordFields, WriteSummary,
};

use super::{Cell, RowColor, SerializedTable, TableStore, PALETTE};

/// Display format of the date column (dd/mm/yyyy).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Writes one row per line item and colors the written block.
pub struct BatchAppender {
    palette: Vec<RowColor>,
    date: Option<NaiveDate>,
}

impl BatchAppender {
    pub fn new() -> Self {
        Self {
            palette: PALETTE.to_vec(),
            date: None,
        }
    }

    /// Use a fixed date instead of today.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Palette slot for a scan index.
    pub fn color_index(&self, scan_index: u64) -> usize {
        (scan_index % self.palette.len() as u64) as usize
    }

    /// Value of the date column for batches written now.
    pub fn date_cell(&self) -> String {
        self.date
            .unwrap_or_else(|| Local::now().date_naive())
            .format(DATE_FORMAT)
            .to_string()
    }

    /// Rows that a batch would write, placeholders dropped.
    pub fn rows(&self, fields: &RecordFields, items: &[LineItem], writer: &str) -> Vec<Vec<Cell>> {
        let date = self.date_cell();

        writable_items(items)
            .into_iter()
            .map(|item| {
                vec![
                    Cell::from(fields.month.as_str()),
                    Cell::from(fields.payer_code.as_str()),
                    Cell::from(date.as_str()),
                    Cell::from(fields.purchase_order_ref.as_str()),
                    Cell::from(fields.delivery_address.as_str()),
                    Cell::from(item.article),
                    Cell::from(item.bottle_count),
                    Cell::from(writer),
                ]
            })
            .collect()
    }

    /// Append a batch and tag it with the color for `scan_index`.
    ///
    /// The start row is read from the table at call time. A failure after
    /// some rows landed is reported as [`StoreError::PartialWrite`] and the
    /// written rows stay in place. A coloring failure does not fail the
    /// batch; it is recorded on the returned result.
    pub fn append_batch<S: TableStore>(
        &self,
        table: &S,
        fields: &RecordFields,
        items: &[LineItem],
        writer: &str,
        scan_index: u64,
    ) -> Result<BatchWriteResult, StoreError> {
        let rows = self.rows(fields, items, writer);
        if rows.is_empty() {
            return Err(StoreError::EmptyBatch);
        }

        let start_row = table.row_count()? + 1;
        info!("Appending {} rows from row {}", rows.len(), start_row);

        for (written, row) in rows.iter().enumerate() {
            if let Err(e) = table.append_row(row) {
                if written == 0 {
                    return Err(e);
                }
                warn!("Append stopped after {} of {} rows: {}", written, rows.len(), e);
                return Err(StoreError::PartialWrite {
                    written,
                    total: rows.len(),
                    source: Box::new(e),
                });
            }
        }

        let end_row = table.row_count()?;
        let color_index = self.color_index(scan_index);

        let coloring_error = match table.color_rows(
            start_row - 1,
            end_row,
            self.palette[color_index],
        ) {
            Ok(()) => None,
            Err(e) => {
                warn!("Rows {}..={} written but not colored: {}", start_row, end_row, e);
                Some(e.to_string())
            }
        };

        Ok(BatchWriteResult {
            start_row,
            end_row,
            color_index,
            coloring_error,
        })
    }

    /// Recap of a written batch.
    pub fn summary(
        &self,
        fields: &RecordFields,
        result: &BatchWriteResult,
        writer: &str,
    ) -> WriteSummary {
        WriteSummary::new(fields, self.date_cell(), result.row_count(), writer)
    }

    /// Same as [`BatchAppender::append_batch`], holding the table lock for
    /// the whole batch.
    pub fn append_serialized<S: TableStore>(
        &self,
        table: &SerializedTable<S>,
        fields: &RecordFields,
        items: &[LineItem],
        writer: &str,
        scan_index: u64,
    ) -> Result<BatchWriteResult, StoreError> {
        let guard = table.lock();
        self.append_batch(&*guard, fields, items, writer, scan_index)
    }
}

impl Default for BatchAppender {
    fn default() -> Self {
        Self::new()
    }
}
