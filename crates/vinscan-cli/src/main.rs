//! CLI application for wine delivery invoice scanning.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, parse, preview, process, send};

/// Wine invoice OCR - Extract delivery invoices and log them to a shared sheet
#[derive(Parser)]
#[command(name = "vinscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from already recognized OCR text
    Parse(parse::ParseArgs),

    /// Run OCR on an invoice image and extract its fields
    Process(process::ProcessArgs),

    /// Append an invoice record to the shared sheet
    Send(send::SendArgs),

    /// Show the first rows of the shared sheet
    Preview(preview::PreviewArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Parse(args) => parse::run(args).await,
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Send(args) => send::run(args, cli.config.as_deref()).await,
        Commands::Preview(args) => preview::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
