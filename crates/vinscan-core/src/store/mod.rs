//! Shared spreadsheet store and the batch append engine.
//!
//! The store is modelled as an append-only row table with a coloring side
//! channel. [`BatchAppender`] writes one row per line item and tags the
//! written block with a rotating background color.

mod append;
mod memory;
#[cfg(feature = "remote")]
mod sheets;

pub use append::{BatchAppender, DATE_FORMAT};
pub use memory::InMemoryTable;
#[cfg(feature = "remote")]
pub use sheets::GoogleSheetsTable;

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Column headers, in the contractual write order.
pub const COLUMNS: [&str; 8] = [
    "Mois",
    "DOIT",
    "Date",
    "Bon de commande",
    "Adresse de livraison",
    "Article",
    "Nombre de bouteilles",
    "Saisi par",
];

/// A scalar cell value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Number(i64),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Number(value as i64)
    }
}

/// Background color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl RowColor {
    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }
}

/// Batch background colors, in rotation order.
pub const PALETTE: [RowColor; 3] = [
    RowColor::new(0.8, 1.0, 0.8),
    RowColor::new(0.15, 0.15, 0.15),
    RowColor::new(1.0, 0.7, 0.7),
];

/// A tabular store that rows can be appended to.
///
/// Row indices passed to [`TableStore::color_rows`] are 0-based and the end
/// is exclusive, matching the formatting API of the hosted spreadsheet.
pub trait TableStore {
    /// Total number of rows currently in the table.
    fn row_count(&self) -> Result<usize, StoreError>;

    /// Append one row after the last one.
    fn append_row(&self, cells: &[Cell]) -> Result<(), StoreError>;

    /// Set the background color of rows `[start, end)`.
    fn color_rows(&self, start: usize, end: usize, color: RowColor) -> Result<(), StoreError>;

    /// Read up to `limit` rows from the top of the table.
    fn read_rows(&self, limit: usize) -> Result<Vec<Vec<String>>, StoreError>;
}

impl<T: TableStore + ?Sized> TableStore for &T {
    fn row_count(&self) -> Result<usize, StoreError> {
        (**self).row_count()
    }

    fn append_row(&self, cells: &[Cell]) -> Result<(), StoreError> {
        (**self).append_row(cells)
    }

    fn color_rows(&self, start: usize, end: usize, color: RowColor) -> Result<(), StoreError> {
        (**self).color_rows(start, end, color)
    }

    fn read_rows(&self, limit: usize) -> Result<Vec<Vec<String>>, StoreError> {
        (**self).read_rows(limit)
    }
}

/// A table whose batch writes run one at a time.
///
/// Holding the guard across count, append, recount and color keeps two
/// writers in this process from computing overlapping row ranges. Writers in
/// other processes are not covered.
pub struct SerializedTable<S> {
    inner: Mutex<S>,
}

impl<S: TableStore> SerializedTable<S> {
    pub fn new(store: S) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Take exclusive access to the table.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        // A panicked writer leaves nothing half-updated in the guard itself.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn into_inner(self) -> S {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
