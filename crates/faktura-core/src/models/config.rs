//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{FakturaError, Result};

/// Main configuration for faktura.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FakturaConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Warn when a PDF yields less text than this (likely a scan).
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 50 }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum document text size in bytes (0 = unlimited).
    pub max_text_len: usize,

    /// A contractor must be longer than this many characters.
    pub contractor_min_len: usize,

    /// Exclusive lower bound for the largest-number amount fallback.
    pub amount_min: Decimal,

    /// Exclusive upper bound for the largest-number amount fallback.
    pub amount_max: Decimal,

    /// Literal text replacements applied before extraction, in order.
    pub replacements: Vec<(String, String)>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_text_len: 2 * 1024 * 1024,
            contractor_min_len: 5,
            amount_min: Decimal::from(10),
            amount_max: Decimal::from(1_000_000),
            replacements: Vec::new(),
        }
    }
}

impl FakturaConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| FakturaError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| FakturaError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
