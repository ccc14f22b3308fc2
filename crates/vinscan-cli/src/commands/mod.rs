//! CLI subcommands.

pub mod config;
pub mod parse;
pub mod preview;
pub mod process;
pub mod send;

use std::path::{Path, PathBuf};

use tracing::debug;

use vinscan_core::VinscanConfig;

/// Load the configuration given on the command line, else the user's
/// configuration file, else defaults.
///
/// A configuration without `session.state_file` keeps the scan counter in
/// the user's data directory, so every run continues the color rotation.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VinscanConfig> {
    let mut config = read_config(config_path)?;
    with_default_state_file(&mut config, dirs::data_dir());
    Ok(config)
}

fn read_config(config_path: Option<&str>) -> anyhow::Result<VinscanConfig> {
    if let Some(path) = config_path {
        return Ok(VinscanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(VinscanConfig::from_file(&default_path)?)
    } else {
        Ok(VinscanConfig::default())
    }
}

/// Fill `session.state_file` with `<data dir>/vinscan/scan_state.json`.
fn with_default_state_file(config: &mut VinscanConfig, data_dir: Option<PathBuf>) {
    if config.session.state_file.is_some() {
        return;
    }

    config.session.state_file = data_dir.map(|dir| dir.join("vinscan").join("scan_state.json"));
    if let Some(path) = &config.session.state_file {
        debug!("Scan counter kept in {}", path.display());
    }
}
