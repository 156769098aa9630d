//! Core library for invoice PDF field extraction.
//!
//! This crate provides:
//! - PDF text layer extraction
//! - Field extraction (date, contractor, amount, incoming number, comment)
//!   from noisy invoice text and file names
//! - Record models with per-field provenance and a flat legacy view

pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;

pub use error::{ExtractionError, FakturaError, PdfError, Result};
pub use invoice::rules::{
    extract_amount, extract_comment, extract_contractor, extract_date, extract_incoming_number,
    Document, ExtractionMatch, FieldExtractor, Origin, Strategy,
};
pub use invoice::{extract, Explanation, RecordExtractor, TextCleanup};
pub use models::{DocumentDate, ExtractedRecord, FakturaConfig, LegacyRecord};
pub use pdf::{PdfExtractor, PdfProcessor, PdfText};
