//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for vinscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VinscanConfig {
    /// OCR and preprocessing configuration.
    pub ocr: OcrConfig,

    /// Target spreadsheet configuration.
    pub sheet: SheetConfig,

    /// Session configuration (writer identity, scan counter state).
    pub session: SessionConfig,
}

/// OCR configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Text detection endpoint.
    pub endpoint: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Images wider than this are downscaled before OCR.
    pub max_width: u32,

    /// JPEG quality of the enhanced image sent to OCR.
    pub jpeg_quality: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key_env: "VINSCAN_VISION_API_KEY".to_string(),
            timeout_secs: 60,
            max_width: 2600,
            jpeg_quality: 90,
        }
    }
}

/// Spreadsheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Sheets API base URL.
    pub api_base: String,

    /// Spreadsheet key (empty = not configured).
    pub spreadsheet_id: String,

    /// Title of the target tab, used for value ranges.
    pub sheet_title: String,

    /// Numeric id of the target tab, used for formatting requests.
    pub sheet_id: u64,

    /// Environment variable holding an OAuth bearer token.
    pub token_env: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of rows shown by a preview.
    pub preview_limit: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com".to_string(),
            spreadsheet_id: String::new(),
            sheet_title: "Sheet1".to_string(),
            sheet_id: 0,
            token_env: "VINSCAN_SHEETS_TOKEN".to_string(),
            timeout_secs: 30,
            preview_limit: 200,
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// File holding the persisted scan counter. None keeps it in memory; the
    /// CLI fills in a file under the user data directory.
    pub state_file: Option<PathBuf>,

    /// Writer identity used when none is given on the command line.
    pub writer: Option<String>,
}

impl VinscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
