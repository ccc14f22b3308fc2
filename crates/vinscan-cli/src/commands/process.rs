//! Process command - run OCR on an invoice image and extract its fields.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use vinscan_core::models::config::VinscanConfig;
use vinscan_core::{ExtractionResult, ImagePreprocessor, ScanPipeline, VisionClient};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input image (JPEG or PNG)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Send the image to OCR as is, without enhancement
    #[arg(long)]
    no_enhance: bool,

    /// Add a blank line item when none was found, ready for editing
    #[arg(long)]
    editable: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per line item)
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    pb.set_message("Running OCR...");
    pb.set_position(20);

    let mut result = scan_image(&args.input, &config, !args.no_enhance).await?;

    pb.finish_with_message("Done");

    if args.editable {
        result.record.line_items = result.record.editable_items();
    }

    report_warnings(&result);

    let output = format_result(&result, args.format)?;
    write_output(&output, args.output.as_deref())?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run the OCR pipeline on an image file.
pub async fn scan_image(
    path: &Path,
    config: &VinscanConfig,
    enhance: bool,
) -> anyhow::Result<ExtractionResult> {
    let image = fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let ocr_config = config.ocr.clone();

    // The blocking HTTP client must live outside the async runtime.
    let result = tokio::task::spawn_blocking(move || {
        let detector = VisionClient::from_config(&ocr_config)?;
        let preprocessor = enhance.then(|| ImagePreprocessor::from_config(&ocr_config));

        ScanPipeline::new(detector)
            .with_preprocessor(preprocessor)
            .scan(&image)
    })
    .await??;

    if result.record.raw_text.is_empty() {
        eprintln!("{} No text detected in image", style("⚠").yellow());
    }

    Ok(result)
}

pub fn report_warnings(result: &ExtractionResult) {
    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }
}

pub fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output_path) = path {
        fs::write(output_path, output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let record = &result.record;
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "month",
        "payer_code",
        "purchase_order_ref",
        "delivery_address",
        "article",
        "bottle_count",
    ])?;

    for item in &record.line_items {
        let count = item.bottle_count.to_string();
        wtr.write_record([
            record.invoice_number.as_str(),
            record.month.as_str(),
            record.payer_code.as_str(),
            record.purchase_order_ref.as_str(),
            record.delivery_address.as_str(),
            item.article.as_str(),
            count.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let record = &result.record;
    let mut output = String::new();

    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    output.push_str(&format!("Month: {}\n", record.month));
    output.push_str(&format!("Payer (DOIT): {}\n", record.payer_code));
    output.push_str(&format!("Purchase order: {}\n", record.purchase_order_ref));
    output.push_str(&format!("Delivery address: {}\n", record.delivery_address));
    output.push('\n');

    output.push_str("Items:\n");
    if record.line_items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &record.line_items {
        output.push_str(&format!("  {:>4} x {}\n", item.bottle_count, item.article));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use vinscan_core::{InvoiceRecord, LineItem};

    fn result() -> ExtractionResult {
        let mut record = InvoiceRecord::new("text");
        record.invoice_number = "00123".to_string();
        record.month = "Mai".to_string();
        record.line_items = vec![LineItem::new("Chablis", 12), LineItem::new("Pomerol, 2019", 6)];

        ExtractionResult {
            record,
            warnings: Vec::new(),
            processing_time_ms: 1,
        }
    }

    #[test]
    fn test_csv_one_row_per_item() {
        let csv = format_csv(&result()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "00123,Mai,,,,Chablis,12");
        assert_eq!(lines[2], "00123,Mai,,,,\"Pomerol, 2019\",6");
    }

    #[test]
    fn test_text_lists_items() {
        let text = format_text(&result());
        assert!(text.contains("Invoice: 00123"));
        assert!(text.contains("  12 x Chablis"));
    }
}
