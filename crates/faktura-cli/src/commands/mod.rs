//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod list;
pub mod parse;

use std::fs;
use std::path::Path;

use faktura_core::models::FakturaConfig;
use faktura_core::pdf::PdfExtractor;
use tracing::debug;

/// Load the config file given with `--config`, or the default one if it exists.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<FakturaConfig> {
    if let Some(path) = config_path {
        return Ok(FakturaConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(FakturaConfig::from_file(&default_path)?)
    } else {
        Ok(FakturaConfig::default())
    }
}

/// Read the text of a document: the PDF text layer, or a `.txt` file as-is.
pub fn read_document_text(path: &Path, config: &FakturaConfig) -> anyhow::Result<String> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => {
            let data = fs::read(path)?;
            let content = PdfExtractor::read(&data, config.pdf.min_text_length)?;
            debug!("{}: {} pages", path.display(), content.pages);
            Ok(content.text)
        }
        "txt" => Ok(fs::read_to_string(path)?),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

/// File name component of a path, used as the extractor's file-name input.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
