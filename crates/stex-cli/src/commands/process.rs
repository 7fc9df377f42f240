//! Process command - extract transactions from statement files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use stex_core::OllamaBackend;
use stex_core::models::config::StexConfig;
use stex_core::models::statement::BankStatement;
use stex_core::pdf::{PdfExtractor, PdfProcessor};
use stex_core::statement::{EXPORT_FILE_NAME, ExtractionOutcome, StatementExtractor};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input statement files (PDF or plain text), combined in order into
    /// one submission
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output file or directory (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the extracted document text to a file
    #[arg(long)]
    save_text: Option<PathBuf>,

    /// Show credit/debit counts and the net change after extraction
    #[arg(long)]
    stats: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON export artifact
    Json,
    /// CSV transaction table
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let mut config = if let Some(path) = config_path {
        StexConfig::from_file(Path::new(path))?
    } else {
        StexConfig::default()
    };
    config.apply_env();

    // Check input files exist
    for input in &args.input {
        if !input.exists() {
            anyhow::bail!("Input file not found: {}", input.display());
        }
    }

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    // Gather document text, files combined in upload order
    pb.set_message("Extracting text...");
    pb.set_position(10);

    let mut document_text = String::new();
    for input in &args.input {
        let text = extract_input_text(input, &config)
            .map_err(|e| anyhow::anyhow!("{}: {}", input.display(), e))?;
        if text.trim().is_empty() {
            warn!("No text extracted from {}", input.display());
        }
        document_text.push_str(&text);
    }

    pb.set_position(40);

    if let Some(path) = &args.save_text {
        fs::write(path, &document_text)?;
        debug!("Extracted text written to {}", path.display());
    }

    if document_text.trim().is_empty() {
        pb.finish_and_clear();
        anyhow::bail!("No text could be extracted from the submitted files");
    }

    // Submit to the inference service
    pb.set_message(format!("Querying model '{}'...", config.inference.model));
    pb.set_position(50);

    let backend = OllamaBackend::new(
        &config.inference.host,
        config.inference.port,
        config.inference.timeout(),
    )?;
    let extractor = StatementExtractor::new(backend, config.inference.model.as_str());
    let outcome = extractor.extract_outcome(&document_text).await;

    pb.set_position(90);
    pb.finish_with_message("Done");

    match &outcome {
        ExtractionOutcome::Statement(statement) => {
            let output = match args.format {
                OutputFormat::Json => outcome.to_export_string(),
                OutputFormat::Csv => format_csv(statement)?,
                OutputFormat::Text => format_text(statement),
            };

            if let Some(output_path) = &args.output {
                let output_path = resolve_output(output_path);
                fs::write(&output_path, &output)?;
                println!(
                    "{} Output written to {}",
                    style("✓").green(),
                    output_path.display()
                );
            } else {
                println!("{}", output);
            }

            if statement.is_empty() {
                println!(
                    "{} No transactions were extracted from the document",
                    style("⚠").yellow()
                );
            } else if args.stats {
                print_stats(statement);
            }
        }
        ExtractionOutcome::Failed(message) => {
            // Failed submissions still produce the export artifact.
            let export = outcome.to_export_string();

            if let Some(output_path) = &args.output {
                let output_path = resolve_output(output_path);
                fs::write(&output_path, &export)?;
                eprintln!(
                    "{} Error report written to {}",
                    style("✗").red(),
                    output_path.display()
                );
            } else {
                println!("{}", export);
            }

            anyhow::bail!("Extraction failed: {}", message);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read one input file as document text.
///
/// PDFs go through the text-layer extractor; plain-text files pass through
/// unchanged, which keeps the extraction pipeline usable on pre-converted
/// statements.
pub(crate) fn extract_input_text(path: &Path, config: &StexConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new().with_min_text_length(config.pdf.min_text_length);
            extractor.load(&data)?;

            debug!("{}: {} pages", path.display(), extractor.page_count());

            Ok(extractor.statement_text()?)
        }
        "txt" | "text" => Ok(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// Resolve the output argument to a file path.
///
/// Passing a directory drops the export there under its default name.
fn resolve_output(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(EXPORT_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}

fn print_stats(statement: &BankStatement) {
    println!();
    println!(
        "{} {} transactions extracted",
        style("ℹ").blue(),
        statement.transactions.len()
    );
    println!(
        "   {} credits, {} debits, net change {:+.2}",
        statement.credit_count(),
        statement.debit_count(),
        statement.net_change()
    );
}

pub(crate) fn format_csv(statement: &BankStatement) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "amount", "currency", "type", "description", "balance"])?;

    for tx in &statement.transactions {
        wtr.write_record([
            tx.date.clone(),
            tx.amount.to_string(),
            tx.currency.as_str().to_string(),
            tx.transaction_type.as_str().to_string(),
            tx.description.clone(),
            tx.balance.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub(crate) fn format_text(statement: &BankStatement) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account Holder: {}\n", statement.account_holder.name));
    output.push_str(&format!(
        "Account Number: {}\n",
        statement.account_holder.account_number
    ));
    output.push_str("\n");

    if statement.is_empty() {
        output.push_str("No transactions.\n");
        return output;
    }

    output.push_str("Transactions:\n");
    for tx in &statement.transactions {
        output.push_str(&format!(
            "  {}  {:>12.2} {}  {:<6}  {}  (balance {:.2})\n",
            tx.date,
            tx.amount,
            tx.currency.as_str(),
            tx.transaction_type.as_str(),
            tx.description,
            tx.balance
        ));
    }

    output.push_str(&format!(
        "\n{} transactions, net change {:+.2}\n",
        statement.transactions.len(),
        statement.net_change()
    ));

    output
}
