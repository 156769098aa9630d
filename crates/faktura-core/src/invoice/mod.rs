//! Invoice field extraction module.

pub mod cleanup;
mod extractor;
pub mod rules;

pub use cleanup::{Passthrough, ReplacementTable, TextCleanup};
pub use extractor::{extract, Explanation, RecordExtractor};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
