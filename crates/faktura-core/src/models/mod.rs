//! Data models: extracted records and configuration.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, FakturaConfig, PdfConfig};
pub use record::{DocumentDate, ExtractedRecord, LegacyRecord, DATE_NOT_FOUND};
