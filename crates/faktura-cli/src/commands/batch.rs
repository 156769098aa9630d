//! Batch processing command for multiple invoice files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, error, warn};

use faktura_core::invoice::RecordExtractor;
use faktura_core::models::{ExtractedRecord, FakturaConfig};

use super::parse::{csv_values, format_record, OutputFormat, CSV_FIELDS};
use super::{file_name_of, load_config, read_document_text};

/// Directory used for records without a comment.
const NO_COMMENT_DIR: &str = "no_comment";

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern (PDF and .txt files)
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

    /// Put each output in a subdirectory named after its comment
    #[arg(long, requires = "output_dir")]
    group_by_comment: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<ExtractedRecord>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();
    files.sort();

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

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let extractor = RecordExtractor::from_config(&config.extraction);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.max(1))
        .build()?;

    let results: Vec<ProcessResult> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let file_start = Instant::now();
                let result = process_single_file(path, &extractor, &config);
                overall_pb.inc(1);

                let processing_time_ms = file_start.elapsed().as_millis() as u64;
                match result {
                    Ok(record) => ProcessResult {
                        path: path.clone(),
                        record: Some(record),
                        error: None,
                        processing_time_ms,
                    },
                    Err(e) => ProcessResult {
                        path: path.clone(),
                        record: None,
                        error: Some(e.to_string()),
                        processing_time_ms,
                    },
                }
            })
            .collect()
    });

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.record.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(first) = failed.first() {
        let error_msg = first.error.as_deref().unwrap_or("unknown error");
        if args.continue_on_error {
            for result in &failed {
                warn!(
                    "Failed to process {}: {}",
                    result.path.display(),
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
        } else {
            error!("Failed to process {}: {}", first.path.display(), error_msg);
            anyhow::bail!("Processing failed: {}: {}", first.path.display(), error_msg);
        }
    }

    if let Some(output_dir) = &args.output_dir {
        let mut written = HashSet::new();
        for result in &successful {
            if let Some(record) = &result.record {
                write_output(output_dir, &result.path, record, &args, &mut written)?;
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

fn process_single_file(
    path: &Path,
    extractor: &RecordExtractor,
    config: &FakturaConfig,
) -> anyhow::Result<ExtractedRecord> {
    let text = read_document_text(path, config)?;
    Ok(extractor.extract(&text, &file_name_of(path))?)
}

fn write_output(
    output_dir: &Path,
    input: &Path,
    record: &ExtractedRecord,
    args: &BatchArgs,
    written: &mut HashSet<PathBuf>,
) -> anyhow::Result<()> {
    let target_dir = if args.group_by_comment {
        let comment = record.comment.as_ref().map(|m| m.value.as_str());
        output_dir.join(comment_dir_name(comment))
    } else {
        output_dir.to_path_buf()
    };
    fs::create_dir_all(&target_dir)?;

    let output_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    let output_path = unique_output_path(&target_dir, output_name, args.format.extension(), written);
    if output_path.file_stem().and_then(|s| s.to_str()) != Some(output_name) {
        warn!(
            "Output for {} already taken in this run, writing {} instead",
            input.display(),
            output_path.display()
        );
    }

    let content = format_record(&file_name_of(input), record, args.format)?;
    fs::write(&output_path, content)?;
    debug!("Wrote output to {}", output_path.display());

    Ok(())
}

/// `<dir>/<stem>.<ext>`, or `<stem>_2.<ext>` and so on when an earlier file
/// of the same batch already wrote there.
fn unique_output_path(
    dir: &Path,
    stem: &str,
    extension: &str,
    written: &mut HashSet<PathBuf>,
) -> PathBuf {
    let mut path = dir.join(format!("{}.{}", stem, extension));
    let mut n = 2;
    while written.contains(&path) {
        path = dir.join(format!("{}_{}.{}", stem, n, extension));
        n += 1;
    }
    written.insert(path.clone());
    path
}

/// Directory name for a comment: filesystem-unsafe characters become `_`.
fn comment_dir_name(comment: Option<&str>) -> String {
    let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) else {
        return NO_COMMENT_DIR.to_string();
    };

    let sanitized: String = comment
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match sanitized.as_str() {
        "." | ".." => "_".repeat(sanitized.len()),
        _ => sanitized,
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(CSV_FIELDS);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        let mut row = vec![filename.to_string()];
        match &result.record {
            Some(record) => {
                row.push("success".to_string());
                row.extend(csv_values(record));
            }
            None => {
                row.push("error".to_string());
                row.extend(CSV_FIELDS.iter().map(|_| String::new()));
            }
        }
        row.push(result.processing_time_ms.to_string());
        row.push(result.error.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
