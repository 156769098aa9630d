//! List command - show the PDF documents available in a directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::Args;
use console::style;
use glob::{glob_with, MatchOptions, Pattern};
use serde::Serialize;
use tracing::warn;

/// Arguments for the list command.
#[derive(Args)]
pub struct ListArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Also scan subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: ListFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ListFormat {
    /// JSON array
    Json,
    /// Aligned columns
    Table,
}

/// One PDF found on disk.
#[derive(Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Last modification time, RFC 3339.
    pub modified: Option<String>,
}

pub fn run(args: ListArgs) -> anyhow::Result<()> {
    if !args.dir.is_dir() {
        anyhow::bail!("Not a directory: {}", args.dir.display());
    }

    let files = list_pdfs(&args.dir, args.recursive)?;

    match args.format {
        ListFormat::Json => println!("{}", serde_json::to_string_pretty(&files)?),
        ListFormat::Table => print_table(&files),
    }

    Ok(())
}

/// PDFs under `dir`, sorted by path. The extension match ignores case.
pub fn list_pdfs(dir: &Path, recursive: bool) -> anyhow::Result<Vec<FileEntry>> {
    let base = Pattern::escape(&dir.to_string_lossy());
    let pattern = if recursive {
        format!("{}/**/*.pdf", base)
    } else {
        format!("{}/*.pdf", base)
    };
    let options = MatchOptions {
        case_sensitive: false,
        ..Default::default()
    };

    let mut files = Vec::new();
    for entry in glob_with(&pattern, options)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let metadata = path.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        files.push(FileEntry {
            name: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            size: metadata.len(),
            modified: metadata
                .modified()
                .ok()
                .map(|t| DateTime::<Local>::from(t).to_rfc3339()),
            path,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

fn print_table(files: &[FileEntry]) {
    if files.is_empty() {
        println!("{} No PDF files found", style("ℹ").blue());
        return;
    }

    let name_width = files
        .iter()
        .map(|f| f.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    println!(
        "{:<name_width$}  {:>10}  {:<25}",
        style("NAME").bold(),
        style("SIZE").bold(),
        style("MODIFIED").bold(),
    );
    for file in files {
        println!(
            "{:<name_width$}  {:>10}  {:<25}",
            file.name,
            file.size,
            file.modified.as_deref().unwrap_or("-"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_list_pdfs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"%PDF-1.5").unwrap();
        fs::write(dir.path().join("A.PDF"), b"%PDF-1.5 longer").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.pdf"), b"%PDF").unwrap();

        let names: Vec<String> = list_pdfs(dir.path(), false)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["A.PDF", "b.pdf"]);

        let all = list_pdfs(dir.path(), true).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|f| f.modified.is_some()));
    }
}
