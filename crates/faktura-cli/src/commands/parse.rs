//! Parse command - extract fields from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use serde_json::json;
use tracing::{debug, info};

use faktura_core::invoice::{Explanation, RecordExtractor};
use faktura_core::invoice::rules::ExtractionMatch;
use faktura_core::models::ExtractedRecord;

use super::{file_name_of, load_config, read_document_text};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (PDF, or already extracted text as .txt)
    #[arg(required = true)]
    input: PathBuf,

    /// File name fed to the extractor (default: the input's file name)
    #[arg(short, long)]
    name: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// List every candidate each heuristic found instead of the record
    #[arg(long)]
    explain: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON record with provenance per field
    Json,
    /// Flat record with sentinels, as `{ filename, extractedData }`
    Legacy,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for per-file outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json | OutputFormat::Legacy => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let text = read_document_text(&args.input, &config)?;
    let file_name = args.name.clone().unwrap_or_else(|| file_name_of(&args.input));
    let extractor = RecordExtractor::from_config(&config.extraction);

    let output = if args.explain {
        format_explanation(&extractor.explain(&text, &file_name)?)
    } else {
        let record = extractor.extract(&text, &file_name)?;
        format_record(&file_name, &record, args.format)?
    };

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

pub fn format_record(
    file_name: &str,
    record: &ExtractedRecord,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Legacy => Ok(serde_json::to_string_pretty(&json!({
            "filename": file_name,
            "extractedData": record.to_legacy(),
        }))?),
        OutputFormat::Csv => format_csv(file_name, record),
        OutputFormat::Text => Ok(format_text(file_name, record)),
    }
}

/// CSV header shared by single-file CSV output and the batch summary.
pub const CSV_FIELDS: [&str; 6] = [
    "date",
    "contractor",
    "amount",
    "incoming_number",
    "comment",
    "confidence",
];

/// Legacy field values in [`CSV_FIELDS`] order.
pub fn csv_values(record: &ExtractedRecord) -> [String; 6] {
    let legacy = record.to_legacy();
    [
        legacy.date,
        legacy.contractor,
        legacy.amount.to_string(),
        legacy.incoming_number,
        legacy.comment,
        format!("{:.2}", record.confidence()),
    ]
}

fn format_csv(file_name: &str, record: &ExtractedRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["filename"];
    header.extend(CSV_FIELDS);
    wtr.write_record(&header)?;

    let mut row = vec![file_name.to_string()];
    row.extend(csv_values(record));
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(file_name: &str, record: &ExtractedRecord) -> String {
    let mut output = String::new();

    output.push_str(&format!("File: {}\n\n", file_name));
    output.push_str(&text_line("Date", &record.date));
    output.push_str(&text_line("Contractor", &record.contractor));
    output.push_str(&text_line("Amount", &record.amount));
    output.push_str(&text_line("Incoming number", &record.incoming_number));
    output.push_str(&text_line("Comment", &record.comment));
    output.push_str(&format!("\nConfidence: {:.0}%\n", record.confidence() * 100.0));

    output
}

fn text_line<T: ToString>(label: &str, field: &Option<ExtractionMatch<T>>) -> String {
    match field {
        Some(m) => format!("{:<16} {}  ({:?})\n", format!("{}:", label), m.value.to_string(), m.strategy),
        None => format!("{:<16} -\n", format!("{}:", label)),
    }
}

fn format_explanation(explanation: &Explanation) -> String {
    let mut output = String::new();
    explain_field(&mut output, "date", &explanation.date);
    explain_field(&mut output, "contractor", &explanation.contractor);
    explain_field(&mut output, "amount", &explanation.amount);
    explain_field(&mut output, "incoming_number", &explanation.incoming_number);
    explain_field(&mut output, "comment", &explanation.comment);
    output
}

fn explain_field<T: ToString>(output: &mut String, name: &str, candidates: &[ExtractionMatch<T>]) {
    output.push_str(&format!("{}:\n", name));
    if candidates.is_empty() {
        output.push_str("  (no candidates)\n");
    }
    for (i, m) in candidates.iter().enumerate() {
        let marker = if i == 0 { "*" } else { " " };
        output.push_str(&format!(
            "  {} {:?} {} <- {:?}\n",
            marker,
            m.strategy,
            m.value.to_string(),
            m.source
        ));
    }
}
