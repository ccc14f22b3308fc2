//! In-process table store.

use std::sync::Mutex;

use crate::error::StoreError;

use super::{Cell, RowColor, TableStore};

#[derive(Debug, Default)]
struct State {
    rows: Vec<Vec<Cell>>,
    colored: Vec<(usize, usize, RowColor)>,
    appends: usize,
}

/// Table kept in memory.
///
/// Used for dry runs and tests. Failures can be injected to exercise the
/// partial-write and coloring paths.
#[derive(Debug, Default)]
pub struct InMemoryTable {
    state: Mutex<State>,
    fail_after_appends: Option<usize>,
    fail_coloring: bool,
}

impl InMemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `count` filler rows.
    pub fn with_rows(count: usize) -> Self {
        let rows = (1..=count)
            .map(|i| vec![Cell::Text(format!("row {}", i))])
            .collect();

        Self {
            state: Mutex::new(State {
                rows,
                ..State::default()
            }),
            ..Self::default()
        }
    }

    /// Reject every append after `count` successful ones.
    pub fn fail_after_appends(mut self, count: usize) -> Self {
        self.fail_after_appends = Some(count);
        self
    }

    /// Reject every coloring request.
    pub fn fail_coloring(mut self) -> Self {
        self.fail_coloring = true;
        self
    }

    /// Snapshot of all rows.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.state().rows.clone()
    }

    /// Coloring requests applied so far, as `(start, end, color)`.
    pub fn colored_ranges(&self) -> Vec<(usize, usize, RowColor)> {
        self.state().colored.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TableStore for InMemoryTable {
    fn row_count(&self) -> Result<usize, StoreError> {
        Ok(self.state().rows.len())
    }

    fn append_row(&self, cells: &[Cell]) -> Result<(), StoreError> {
        let mut state = self.state();

        if self.fail_after_appends.is_some_and(|limit| state.appends >= limit) {
            return Err(StoreError::Append("injected append failure".to_string()));
        }

        state.rows.push(cells.to_vec());
        state.appends += 1;
        Ok(())
    }

    fn color_rows(&self, start: usize, end: usize, color: RowColor) -> Result<(), StoreError> {
        if self.fail_coloring {
            return Err(StoreError::Coloring("injected coloring failure".to_string()));
        }

        let mut state = self.state();
        if start > end || end > state.rows.len() {
            return Err(StoreError::Coloring(format!(
                "range {}..{} outside {} rows",
                start,
                end,
                state.rows.len()
            )));
        }

        state.colored.push((start, end, color));
        Ok(())
    }

    fn read_rows(&self, limit: usize) -> Result<Vec<Vec<String>>, StoreError> {
        Ok(self
            .state()
            .rows
            .iter()
            .take(limit)
            .map(|row| row.iter().map(Cell::to_string).collect())
            .collect())
    }
}
