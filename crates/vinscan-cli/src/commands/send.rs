//! Send command - append an invoice record to the shared sheet.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{info, warn};

use vinscan_core::invoice::rules::canonical_month;
use vinscan_core::models::invoice::{coerce_count, MONTHS};
use vinscan_core::store::COLUMNS;
use vinscan_core::{
    BatchAppender, BatchWriteResult, ExtractionResult, GoogleSheetsTable, InvoiceRecord, LineItem,
    Session,
};

/// Arguments for the send command.
#[derive(Args)]
pub struct SendArgs {
    /// Record JSON produced by `parse` or `process` (edited or not)
    #[arg(short, long, conflicts_with = "image", required_unless_present = "image")]
    record: Option<PathBuf>,

    /// Invoice image to scan and send directly
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Writer identity recorded on every row
    #[arg(short, long)]
    writer: Option<String>,

    /// Override the month (French month name)
    #[arg(long)]
    month: Option<String>,

    /// Override the payer code
    #[arg(long)]
    payer: Option<String>,

    /// Override the purchase-order reference
    #[arg(long)]
    order: Option<String>,

    /// Override the delivery address
    #[arg(long)]
    address: Option<String>,

    /// Replace the line items, as ARTICLE=COUNT (repeatable)
    #[arg(long = "item", value_name = "ARTICLE=COUNT")]
    items: Vec<String>,

    /// Print the rows that would be written without touching the sheet
    #[arg(long)]
    dry_run: bool,
}

pub async fn run(args: SendArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let mut record = match (&args.record, &args.image) {
        (Some(path), _) => read_record(path)?,
        (None, Some(image)) => {
            let result = super::process::scan_image(image, &config, true).await?;
            super::process::report_warnings(&result);
            result.record
        }
        (None, None) => anyhow::bail!("Either --record or --image is required"),
    };

    apply_overrides(&mut record, &args)?;

    let mut session = Session::from_config(&config.session, args.writer.clone())?;
    if session.writer().trim().is_empty() {
        anyhow::bail!("No writer identity: pass --writer or set session.writer in the configuration");
    }

    let appender = BatchAppender::new();
    let fields = record.fields();

    if args.dry_run {
        let rows = appender.rows(&fields, &record.line_items, session.writer());
        if rows.is_empty() {
            anyhow::bail!("No line items to write");
        }

        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(COLUMNS)?;
        for row in &rows {
            wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        print!("{}", String::from_utf8(wtr.into_inner()?)?);
        return Ok(());
    }

    let sheet_config = config.sheet.clone();
    let items = record.line_items.clone();
    let writer = session.writer().to_string();
    let scan_index = session.scan_index();
    let blocking_fields = fields.clone();

    info!("Sending {} line items as {}", items.len(), writer);

    // The blocking HTTP client must live outside the async runtime.
    let result = tokio::task::spawn_blocking(move || {
        let table = GoogleSheetsTable::from_config(&sheet_config)?;
        BatchAppender::new().append_batch(&table, &blocking_fields, &items, &writer, scan_index)
    })
    .await??;

    println!("{} Rows written to the sheet", style("✓").green());
    println!(
        "{} Rows {} → {}",
        style("ℹ").blue(),
        result.start_row,
        result.end_row
    );

    if let Some(error) = &result.coloring_error {
        warn!("Batch background not applied: {}", error);
        eprintln!(
            "{} Rows written but not colored: {}",
            style("⚠").yellow(),
            error
        );
    }

    let summary = appender.summary(&fields, &result, session.writer());
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(warning) = advance_counter(&mut session, &result) {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    Ok(())
}

/// Move the session past a written batch. The rows are in the sheet
/// already, so a counter that cannot be saved is only a warning.
fn advance_counter(session: &mut Session, result: &BatchWriteResult) -> Option<String> {
    match session.record_write(result) {
        Ok(()) => None,
        Err(e) => {
            warn!("Scan counter not saved: {}", e);
            Some(format!(
                "Scan counter not saved, the next batch may reuse this color: {}",
                e
            ))
        }
    }
}

/// Read a record saved by `parse` or `process`, bare or wrapped with its warnings.
fn read_record(path: &Path) -> anyhow::Result<InvoiceRecord> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid record JSON in {}", path.display()))?;

    if value.get("record").is_some() {
        let result: ExtractionResult = serde_json::from_value(value)?;
        Ok(result.record)
    } else {
        Ok(serde_json::from_value(value)?)
    }
}

fn apply_overrides(record: &mut InvoiceRecord, args: &SendArgs) -> anyhow::Result<()> {
    if let Some(month) = &args.month {
        record.month = if month.trim().is_empty() {
            String::new()
        } else {
            canonical_month(month)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unknown month '{}', expected one of: {}",
                        month,
                        MONTHS.join(", ")
                    )
                })?
                .to_string()
        };
    }
    if let Some(payer) = &args.payer {
        record.payer_code = payer.trim().to_string();
    }
    if let Some(order) = &args.order {
        record.purchase_order_ref = order.trim().to_string();
    }
    if let Some(address) = &args.address {
        record.delivery_address = address.trim().to_string();
    }
    if !args.items.is_empty() {
        record.line_items = args
            .items
            .iter()
            .map(|item| parse_item(item))
            .collect::<anyhow::Result<_>>()?;
    }

    Ok(())
}

fn parse_item(raw: &str) -> anyhow::Result<LineItem> {
    let (article, count) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid item '{}', expected ARTICLE=COUNT", raw))?;

    Ok(LineItem::new(article.trim(), coerce_count(count)))
}
