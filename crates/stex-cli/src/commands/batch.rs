//! Batch command - process many statement files independently.
//!
//! Unlike `process`, which folds every input into one submission, `batch`
//! sends each file through the pipeline on its own and reports per-file
//! results.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use stex_core::OllamaBackend;
use stex_core::models::config::StexConfig;
use stex_core::models::statement::BankStatement;
use stex_core::statement::{ExtractionOutcome, StatementExtractor};

use super::process::OutputFormat;

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

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of one file's submission.
struct FileResult {
    path: PathBuf,
    outcome: ExtractionOutcome,
    processing_time_ms: u64,
}

impl FileResult {
    fn statement(&self) -> Option<&BankStatement> {
        match &self.outcome {
            ExtractionOutcome::Statement(statement) => Some(statement),
            ExtractionOutcome::Failed(_) => None,
        }
    }

    fn error(&self) -> Option<&str> {
        match &self.outcome {
            ExtractionOutcome::Statement(_) => None,
            ExtractionOutcome::Failed(message) => Some(message),
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = if let Some(path) = config_path {
        StexConfig::from_file(Path::new(path))?
    } else {
        StexConfig::default()
    };
    config.apply_env();

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt" | "text")
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

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // One backend for the whole run; files are submitted sequentially
    let backend = OllamaBackend::new(
        &config.inference.host,
        config.inference.port,
        config.inference.timeout(),
    )?;
    let extractor = StatementExtractor::new(backend, config.inference.model.as_str());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let outcome = submit_file(&path, &extractor, &config).await;
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        if let ExtractionOutcome::Failed(message) = &outcome {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", path.display(), message);
            } else {
                error!("Failed to process {}: {}", path.display(), message);
                anyhow::bail!("Processing failed: {}", message);
            }
        }

        results.push(FileResult {
            path,
            outcome,
            processing_time_ms,
        });

        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    // Write per-file outputs
    if let Some(output_dir) = &args.output_dir {
        for result in &results {
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("statement");

            // The JSON export is written for failed submissions too.
            let (content, extension) = match (args.format, result.statement()) {
                (OutputFormat::Json, _) => (result.outcome.to_export_string(), "json"),
                (OutputFormat::Csv, Some(statement)) => {
                    (super::process::format_csv(statement)?, "csv")
                }
                (OutputFormat::Text, Some(statement)) => {
                    (super::process::format_text(statement), "txt")
                }
                (_, None) => continue,
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
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

    // Print summary
    let successful = results.iter().filter(|r| r.outcome.is_success()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error().is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Run one file through the pipeline as an independent submission.
///
/// Pre-submission failures (unreadable file, no text layer) fold into
/// `ExtractionOutcome::Failed` so every file ends in an exportable result.
async fn submit_file(
    path: &Path,
    extractor: &StatementExtractor<OllamaBackend>,
    config: &StexConfig,
) -> ExtractionOutcome {
    match super::process::extract_input_text(path, config) {
        Ok(text) if text.trim().is_empty() => {
            ExtractionOutcome::Failed("no text extracted from the document".to_string())
        }
        Ok(text) => extractor.extract_outcome(&text).await,
        Err(e) => ExtractionOutcome::Failed(e.to_string()),
    }
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "account_holder",
        "account_number",
        "transactions",
        "credits",
        "debits",
        "net_change",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        if let Some(statement) = result.statement() {
            let count = statement.transactions.len().to_string();
            let credits = statement.credit_count().to_string();
            let debits = statement.debit_count().to_string();
            let net_change = format!("{:.2}", statement.net_change());

            wtr.write_record([
                filename,
                "success",
                statement.account_holder.name.as_str(),
                statement.account_holder.account_number.as_str(),
                count.as_str(),
                credits.as_str(),
                debits.as_str(),
                net_change.as_str(),
                time_ms.as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                time_ms.as_str(),
                result.error().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
