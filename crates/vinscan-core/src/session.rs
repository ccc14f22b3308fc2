//! Writer session and scan counter.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::SessionConfig;
use crate::models::invoice::BatchWriteResult;

/// Count of successful batch writes in a session.
///
/// Only ever moves forward, by one per successful write. Its value modulo
/// the palette size picks the batch background color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCounter {
    scan_index: u64,
}

impl ScanCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously persisted value.
    pub fn starting_at(scan_index: u64) -> Self {
        Self { scan_index }
    }

    pub fn index(&self) -> u64 {
        self.scan_index
    }

    /// Palette slot for the next write.
    pub fn color_index(&self, palette_size: usize) -> usize {
        (self.scan_index % palette_size.max(1) as u64) as usize
    }

    /// Move past a successful write.
    pub fn advance(&mut self) {
        self.scan_index = self.scan_index.saturating_add(1);
    }
}

/// State driving writes for one writer.
#[derive(Debug, Clone)]
pub struct Session {
    writer: String,
    counter: ScanCounter,
    state_file: Option<PathBuf>,
}

impl Session {
    /// In-memory session starting at scan 0.
    pub fn new(writer: impl Into<String>) -> Self {
        Self {
            writer: writer.into(),
            counter: ScanCounter::new(),
            state_file: None,
        }
    }

    /// Session restored from `state_file`; a missing file starts at 0.
    pub fn load(writer: impl Into<String>, state_file: impl Into<PathBuf>) -> Result<Self> {
        let state_file = state_file.into();
        let counter = read_counter(&state_file)?;
        debug!(
            "Restored scan index {} from {}",
            counter.index(),
            state_file.display()
        );

        Ok(Self {
            writer: writer.into(),
            counter,
            state_file: Some(state_file),
        })
    }

    /// Session from configuration, with an optional writer override.
    pub fn from_config(config: &SessionConfig, writer: Option<String>) -> Result<Self> {
        let writer = writer
            .or_else(|| config.writer.clone())
            .unwrap_or_default();

        match &config.state_file {
            Some(path) => Self::load(writer, path.clone()),
            None => Ok(Self::new(writer)),
        }
    }

    pub fn writer(&self) -> &str {
        &self.writer
    }

    pub fn scan_index(&self) -> u64 {
        self.counter.index()
    }

    pub fn counter(&self) -> ScanCounter {
        self.counter
    }

    /// Advance the counter after a successful write and persist it.
    pub fn record_write(&mut self, result: &BatchWriteResult) -> Result<()> {
        self.counter.advance();
        info!(
            "Rows {}..={} written, scan index now {}",
            result.start_row,
            result.end_row,
            self.counter.index()
        );
        self.save()
    }

    /// Persist the counter, when the session has a state file.
    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.state_file else {
            return Ok(());
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.counter)?)?;
        Ok(())
    }
}

fn read_counter(path: &Path) -> Result<ScanCounter> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ScanCounter::new()),
        Err(e) => Err(e.into()),
    }
}
