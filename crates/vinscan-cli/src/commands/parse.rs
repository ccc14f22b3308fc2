//! Parse command - extract fields from OCR text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use vinscan_core::{InvoiceParser, RuleBasedParser};

use super::process::{format_result, report_warnings, write_output, OutputFormat};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Text file holding OCR output ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Add a blank line item when none was found, ready for editing
    #[arg(long)]
    editable: bool,

    /// Do not fall back to loose line item matching
    #[arg(long)]
    strict_items: bool,
}

pub async fn run(args: ParseArgs) -> anyhow::Result<()> {
    let text = if args.input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(&args.input)
            .with_context(|| format!("Cannot read {}", args.input.display()))?
    };

    info!("Parsing {} characters of OCR text", text.len());

    let parser = RuleBasedParser::new().with_item_fallback(!args.strict_items);
    let mut result = parser.parse(&text);

    if args.editable {
        result.record.line_items = result.record.editable_items();
    }

    report_warnings(&result);

    let output = format_result(&result, args.format)?;
    write_output(&output, args.output.as_deref())
}
