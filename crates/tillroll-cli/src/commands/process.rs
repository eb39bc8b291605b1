//! Process command - normalize a single captured expense response.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use tracing::{debug, info};

use tillroll_core::models::provenance::ANONYMOUS_OWNER;
use tillroll_core::{
    AnalyzeExpenseResponse, ExtractionResult, ParsedReceipt, Provenance, ReceiptIdentity,
    ReceiptParser,
};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Captured expense response (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Storage key the receipt image was uploaded under ({owner}/{name})
    #[arg(long)]
    key: Option<String>,

    /// Owner id (overrides the owner taken from --key)
    #[arg(long)]
    owner: Option<String>,

    /// Receipt id (default: random)
    #[arg(long)]
    id: Option<String>,

    /// Print dropped lines and fallbacks
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let parser = ReceiptParser::from_config(&config);
    let result = parse_file(&args.input, &parser)?;

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let provenance = provenance_for(
        &args.input,
        args.key.as_deref(),
        args.owner.as_deref(),
        Utc::now(),
    );
    let identity = args
        .id
        .clone()
        .map(ReceiptIdentity::new)
        .unwrap_or_else(ReceiptIdentity::generate);

    let receipt = result.into_receipt(provenance, identity);
    let output = format_receipt(&receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read a captured response and normalize its first document.
pub fn parse_file(path: &Path, parser: &ReceiptParser) -> anyhow::Result<ExtractionResult> {
    let content = fs::read_to_string(path)?;
    let response = AnalyzeExpenseResponse::from_json_str(&content)?;

    if response.expense_documents.len() > 1 {
        debug!(
            "{} holds {} expense documents, using the first",
            path.display(),
            response.expense_documents.len()
        );
    }

    let document = response.first_document()?;
    Ok(parser.parse(document))
}

/// Work out provenance for a local capture.
///
/// With a storage key, owner and source come from the key; otherwise the
/// source is the input file name.
pub fn provenance_for(
    input: &Path,
    key: Option<&str>,
    owner: Option<&str>,
    now: DateTime<Utc>,
) -> Provenance {
    let mut provenance = match key {
        Some(key) => Provenance::from_storage_key(key, now),
        None => {
            let source = input
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("receipt");
            Provenance::new(source, ANONYMOUS_OWNER, now)
        }
    };

    if let Some(owner) = owner {
        provenance.owner_id = owner.to_string();
    }

    provenance
}

pub fn format_receipt(receipt: &ParsedReceipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

fn format_csv(receipt: &ParsedReceipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "id",
        "shop",
        "receipt_time",
        "item",
        "price",
        "first_token",
        "source",
        "user_id",
        "upload_time",
    ])?;

    for item in &receipt.items {
        wtr.write_record([
            &receipt.id,
            &receipt.merchant,
            &receipt.receipt_time.clone().unwrap_or_default(),
            &item.description,
            &item.amount.to_string(),
            &item.first_token,
            &receipt.source,
            &receipt.owner_id,
            &receipt.upload_time.to_rfc3339(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ParsedReceipt) -> String {
    let mut output = String::new();

    output.push_str(&format!("Shop: {}\n", receipt.merchant));
    output.push_str(&format!(
        "Time: {}\n",
        receipt.receipt_time.as_deref().unwrap_or("unknown")
    ));
    output.push_str(&format!("Source: {} ({})\n", receipt.source, receipt.owner_id));
    output.push('\n');

    if receipt.is_empty() {
        output.push_str("No items\n");
    } else {
        output.push_str("Items:\n");
        for item in &receipt.items {
            output.push_str(&format!("  {:<32} {:>8}\n", item.description, item.amount));
        }
        output.push('\n');
        output.push_str(&format!("  {:<32} {:>8}\n", "Total", receipt.total()));
    }

    output
}
