//! Preview command - show the first rows of the shared sheet.

use clap::Args;
use console::style;

use vinscan_core::{GoogleSheetsTable, TableStore};

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Maximum number of data rows (default: sheet.preview_limit)
    #[arg(short, long)]
    limit: Option<usize>,
}

pub async fn run(args: PreviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let limit = args.limit.unwrap_or(config.sheet.preview_limit);
    let sheet_config = config.sheet.clone();

    // Header row, `limit` data rows and one more to detect truncation.
    let rows = tokio::task::spawn_blocking(move || {
        let table = GoogleSheetsTable::from_config(&sheet_config)?;
        table.read_rows(limit.saturating_add(2))
    })
    .await??;

    let (rows, truncated) = cap_rows(rows, limit);
    if truncated {
        eprintln!(
            "{} The sheet holds more than {} rows, showing the first {}.",
            style("⚠").yellow(),
            limit,
            limit
        );
    }

    if rows.is_empty() {
        println!("{} The sheet is empty.", style("ℹ").blue());
        return Ok(());
    }

    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);
    for row in &rows {
        wtr.write_record(row)?;
    }
    print!("{}", String::from_utf8(wtr.into_inner()?)?);

    Ok(())
}

/// Keep the header row and at most `limit` data rows.
fn cap_rows(mut rows: Vec<Vec<String>>, limit: usize) -> (Vec<Vec<String>>, bool) {
    let max_rows = limit.saturating_add(1);
    let truncated = rows.len() > max_rows;
    rows.truncate(max_rows);
    (rows, truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<Vec<String>> {
        (0..count).map(|i| vec![i.to_string()]).collect()
    }

    #[test]
    fn test_cap_rows() {
        let (kept, truncated) = cap_rows(rows(4), 2);
        assert_eq!(kept.len(), 3);
        assert!(truncated);

        let (kept, truncated) = cap_rows(rows(3), 2);
        assert_eq!(kept.len(), 3);
        assert!(!truncated);
    }
}
