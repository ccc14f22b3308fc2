//! Config command - inspect and edit the JSON configuration file.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use vinscan_core::models::config::VinscanConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the configuration (defaults when no file exists)
    Show,

    /// Write a configuration file holding the defaults
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one value, by dotted key (e.g. "sheet.spreadsheet_id")
    Get { key: String },

    /// Change one existing value; JSON literals are parsed, anything else is a string
    Set { key: String, value: String },

    /// Print the configuration file location
    Path,
}

/// The file the config command reads and writes: `--config` or the default.
struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    fn resolve(config_path: Option<&str>) -> Self {
        Self {
            path: config_path.map_or_else(default_config_path, PathBuf::from),
        }
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> anyhow::Result<VinscanConfig> {
        if self.exists() {
            Ok(VinscanConfig::from_file(&self.path)?)
        } else {
            Ok(VinscanConfig::default())
        }
    }

    fn store(&self, config: &VinscanConfig) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(config.save(&self.path)?)
    }
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let file = ConfigFile::resolve(config_path);

    match args.command {
        ConfigCommand::Show => {
            if !file.exists() {
                eprintln!(
                    "{} No configuration at {}, showing defaults.",
                    style("ℹ").blue(),
                    file.path.display()
                );
            }
            println!("{}", serde_json::to_string_pretty(&file.load()?)?);
        }
        ConfigCommand::Init { force } => {
            if file.exists() && !force {
                anyhow::bail!(
                    "Configuration already exists at {}. Use --force to replace it.",
                    file.path.display()
                );
            }
            file.store(&VinscanConfig::default())?;
            println!("{} Created {}", style("✓").green(), file.path.display());
        }
        ConfigCommand::Get { key } => {
            let value = lookup(&file.load()?, &key)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = parse_value(&value);
            let config = update(&file.load()?, &key, value.clone())?;
            file.store(&config)?;
            println!(
                "{} {} = {} in {}",
                style("✓").green(),
                key,
                value,
                file.path.display()
            );
        }
        ConfigCommand::Path => {
            let status = if file.exists() {
                style("exists").green()
            } else {
                style("not created, run 'vinscan config init'").yellow()
            };
            println!("{} ({})", file.path.display(), status);
        }
    }

    Ok(())
}

/// `<config dir>/vinscan/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vinscan")
        .join("config.json")
}

/// `sheet.preview_limit` → `/sheet/preview_limit`.
fn pointer(key: &str) -> String {
    format!("/{}", key.replace('.', "/"))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn lookup(config: &VinscanConfig, key: &str) -> anyhow::Result<Value> {
    serde_json::to_value(config)?
        .pointer(&pointer(key))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
}

/// Replace an existing leaf; the result must still deserialize.
fn update(config: &VinscanConfig, key: &str, value: Value) -> anyhow::Result<VinscanConfig> {
    let mut json = serde_json::to_value(config)?;

    let slot = json
        .pointer_mut(&pointer(key))
        .filter(|slot| !slot.is_object())
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;

    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let config = VinscanConfig::default();
        assert_eq!(lookup(&config, "sheet.preview_limit").unwrap(), 200);
        assert!(lookup(&config, "sheet.unknown").is_err());
    }

    #[test]
    fn test_update() {
        let config = VinscanConfig::default();

        let updated = update(&config, "sheet.spreadsheet_id", "abc".into()).unwrap();
        assert_eq!(updated.sheet.spreadsheet_id, "abc");

        let updated = update(&config, "session.writer", "CFSTOCK".into()).unwrap();
        assert_eq!(updated.session.writer.as_deref(), Some("CFSTOCK"));

        assert!(update(&config, "sheet.typo", 1.into()).is_err());
        assert!(update(&config, "sheet", 1.into()).is_err());
        assert!(update(&config, "ocr.max_width", "wide".into()).is_err());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("Sheet 2"), Value::from("Sheet 2"));
    }

    #[test]
    fn test_config_file_follows_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vinscan.json");
        let file = ConfigFile::resolve(path.to_str());

        assert!(!file.exists());
        assert_eq!(file.load().unwrap().sheet.preview_limit, 200);

        let config = update(&file.load().unwrap(), "sheet.sheet_title", "Livraisons".into()).unwrap();
        file.store(&config).unwrap();

        assert_eq!(
            VinscanConfig::from_file(&path).unwrap().sheet.sheet_title,
            "Livraisons"
        );
    }
}
