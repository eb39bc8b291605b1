//! Batch processing command for multiple captured responses.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use tillroll_core::{ParsedReceipt, ReceiptIdentity, ReceiptParser};

use super::config::load_config;
use super::process::{format_receipt, parse_file, provenance_for, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Owner id for every receipt in the batch
    #[arg(long)]
    owner: Option<String>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    receipt: Option<ParsedReceipt>,
    warnings: usize,
    error: Option<String>,
    processing_time_ms: u64,
}

/// One row of the summary CSV.
#[derive(Serialize)]
struct SummaryRow<'a> {
    filename: &'a str,
    status: &'a str,
    id: &'a str,
    shop: &'a str,
    receipt_time: &'a str,
    items: usize,
    total: String,
    warnings: usize,
    processing_time_ms: u64,
    error: &'a str,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(ReceiptParser::from_config(&config));
    let jobs = args.jobs.max(1);

    // Files are parsed on the blocking pool; `buffered` keeps input order.
    let mut outcomes = stream::iter(files)
        .map(|path| {
            let parser = Arc::clone(&parser);
            let owner = args.owner.clone();
            tokio::task::spawn_blocking(move || process_single_file(path, &parser, owner.as_deref()))
        })
        .buffered(jobs);

    let mut results = Vec::new();
    while let Some(joined) = outcomes.next().await {
        let result = joined?;
        pb.inc(1);

        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                pb.abandon();
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }

        results.push(result);
    }

    pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.receipt.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        let mut used_names = HashSet::new();
        for result in &successful {
            if let Some(receipt) = &result.receipt {
                let output_name = output_name_for(&result.path, &mut used_names);
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_receipt(receipt, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file stem for `path`, suffixed with `-2`, `-3`, ... when an
/// earlier input in the batch already used the same stem.
fn output_name_for(path: &Path, used_names: &mut HashSet<String>) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");

    let mut name = stem.to_string();
    let mut n = 2;
    while !used_names.insert(name.clone()) {
        name = format!("{}-{}", stem, n);
        n += 1;
    }

    if name != stem {
        warn!(
            "Output name {} already used in this batch, writing {} as {}",
            stem,
            path.display(),
            name
        );
    }

    name
}

fn process_single_file(path: PathBuf, parser: &ReceiptParser, owner: Option<&str>) -> ProcessResult {
    let file_start = Instant::now();

    let outcome = parse_file(&path, parser).map(|result| {
        let warnings = result.warnings.len();
        let provenance = provenance_for(&path, None, owner, Utc::now());
        (result.into_receipt(provenance, ReceiptIdentity::generate()), warnings)
    });

    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok((receipt, warnings)) => ProcessResult {
            path,
            receipt: Some(receipt),
            warnings,
            error: None,
            processing_time_ms,
        },
        Err(e) => ProcessResult {
            path,
            receipt: None,
            warnings: 0,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");

        let row = match &result.receipt {
            Some(receipt) => SummaryRow {
                filename,
                status: "success",
                id: &receipt.id,
                shop: &receipt.merchant,
                receipt_time: receipt.receipt_time.as_deref().unwrap_or(""),
                items: receipt.items.len(),
                total: receipt.total().to_string(),
                warnings: result.warnings,
                processing_time_ms: result.processing_time_ms,
                error: "",
            },
            None => SummaryRow {
                filename,
                status: "error",
                id: "",
                shop: "",
                receipt_time: "",
                items: 0,
                total: String::new(),
                warnings: 0,
                processing_time_ms: result.processing_time_ms,
                error: result.error.as_deref().unwrap_or(""),
            },
        };

        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names_do_not_collide() {
        let mut used = HashSet::new();
        assert_eq!(output_name_for(Path::new("a/receipt.json"), &mut used), "receipt");
        assert_eq!(output_name_for(Path::new("b/receipt.json"), &mut used), "receipt-2");
        assert_eq!(output_name_for(Path::new("c/receipt.json"), &mut used), "receipt-3");
        assert_eq!(output_name_for(Path::new("c/other.json"), &mut used), "other");
    }
}
