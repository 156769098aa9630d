//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor.
///
/// lopdf parses the file and removes empty-password encryption, pdf-extract
/// then reads the text layer from the (decrypted) bytes.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

/// Text layer of a loaded PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    /// Number of pages.
    pub pages: u32,
    /// Extracted text of all pages.
    pub text: String,
}

impl PdfText {
    /// Whether the text layer is too thin to be anything but a scan.
    pub fn is_likely_scanned(&self, min_text_length: usize) -> bool {
        self.text.trim().chars().count() < min_text_length
    }
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF and read its text layer in one go.
    pub fn read(data: &[u8], min_text_length: usize) -> Result<PdfText> {
        let mut extractor = Self::new();
        extractor.load(data)?;

        let content = PdfText {
            pages: extractor.page_count(),
            text: extractor.extract_text()?,
        };
        if content.is_likely_scanned(min_text_length) {
            warn!(
                "PDF text layer has fewer than {} characters, it may be a scan",
                min_text_length
            );
        }
        Ok(content)
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }
        let text = pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        debug!("Extracted {} bytes of text", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Object};

    fn empty_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(matches!(extractor.extract_text(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(extractor.load(b"not a pdf"), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_empty_document_has_no_pages() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(extractor.load(&empty_pdf()), Err(PdfError::NoPages)));
    }

    #[test]
    fn test_scan_detection() {
        let content = PdfText {
            pages: 1,
            text: "  \n\n ".to_string(),
        };
        assert!(content.is_likely_scanned(50));
        assert!(!content.is_likely_scanned(0));
    }
}
