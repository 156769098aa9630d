//! Record extractor: runs the five field extractors over one document.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::{DocumentDate, ExtractedRecord};

use super::cleanup::{Passthrough, ReplacementTable, TextCleanup};
use super::rules::{
    AmountExtractor, CommentExtractor, ContractorExtractor, DateExtractor, Document,
    ExtractionMatch, FieldExtractor, IncomingNumberExtractor,
};
use super::Result;

/// Every candidate each matcher produced, in priority order.
///
/// The first entry of each list is what [`RecordExtractor::extract`] picks.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Explanation {
    pub date: Vec<ExtractionMatch<DocumentDate>>,
    pub contractor: Vec<ExtractionMatch<String>>,
    pub amount: Vec<ExtractionMatch<Decimal>>,
    pub incoming_number: Vec<ExtractionMatch<String>>,
    pub comment: Vec<ExtractionMatch<String>>,
}

/// Configurable extractor for whole records.
pub struct RecordExtractor {
    cleanup: Box<dyn TextCleanup>,
    /// Maximum text size in bytes (0 = unlimited).
    max_text_len: usize,
    dates: DateExtractor,
    contractor: ContractorExtractor,
    amount: AmountExtractor,
    incoming_number: IncomingNumberExtractor,
    comment: CommentExtractor,
}

impl RecordExtractor {
    /// Create an extractor with default settings and no text clean-up.
    pub fn new() -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            cleanup: Box::new(Passthrough),
            max_text_len: defaults.max_text_len,
            dates: DateExtractor::new(),
            contractor: ContractorExtractor::new(),
            amount: AmountExtractor::new(),
            incoming_number: IncomingNumberExtractor::new(),
            comment: CommentExtractor::new(),
        }
    }

    /// Build an extractor from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let extractor = Self::new()
            .with_max_text_len(config.max_text_len)
            .with_contractor_min_len(config.contractor_min_len)
            .with_amount_range(config.amount_min, config.amount_max);

        if config.replacements.is_empty() {
            extractor
        } else {
            let table: ReplacementTable = config.replacements.iter().cloned().collect();
            extractor.with_cleanup(Box::new(table))
        }
    }

    /// Set the text clean-up step.
    pub fn with_cleanup(mut self, cleanup: Box<dyn TextCleanup>) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Set the maximum accepted text size in bytes (0 = unlimited).
    pub fn with_max_text_len(mut self, limit: usize) -> Self {
        self.max_text_len = limit;
        self
    }

    /// Set the contractor minimum length.
    pub fn with_contractor_min_len(mut self, min_len: usize) -> Self {
        self.contractor = self.contractor.with_min_len(min_len);
        self
    }

    /// Set the plausible range for the largest-number amount fallback.
    pub fn with_amount_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.amount = self.amount.with_plausible_range(min, max);
        self
    }

    fn check_input(&self, text: &str, file_name: &str) -> Result<()> {
        if text.trim().is_empty() && file_name.trim().is_empty() {
            return Err(ExtractionError::EmptyInput);
        }
        self.check_len(text)
    }

    /// Applied to the raw text and again after cleanup, which may grow it.
    fn check_len(&self, text: &str) -> Result<()> {
        if self.max_text_len > 0 && text.len() > self.max_text_len {
            return Err(ExtractionError::TextTooLong {
                len: text.len(),
                limit: self.max_text_len,
            });
        }
        Ok(())
    }

    /// Extract all five fields from one document.
    pub fn extract(&self, text: &str, file_name: &str) -> Result<ExtractedRecord> {
        self.check_input(text, file_name)?;
        if text.trim().is_empty() {
            warn!("Document {:?} has no text, using file name only", file_name);
        }

        let cleaned = self.cleanup.clean(text);
        self.check_len(&cleaned)?;
        let doc = Document::new(&cleaned, file_name);
        info!("Extracting fields from {} bytes of text ({:?})", doc.text.len(), file_name);

        let record = ExtractedRecord {
            date: self.dates.extract(&doc),
            contractor: self.contractor.extract(&doc),
            amount: self.amount.extract(&doc),
            incoming_number: self.incoming_number.extract(&doc),
            comment: self.comment.extract(&doc),
        };

        debug!("date: {:?}", record.date.as_ref().map(|m| (m.value.to_string(), m.strategy)));
        debug!("contractor: {:?}", record.contractor.as_ref().map(|m| (&m.value, m.strategy)));
        debug!("amount: {:?}", record.amount.as_ref().map(|m| (m.value, m.strategy)));
        debug!(
            "incoming number: {:?}",
            record.incoming_number.as_ref().map(|m| (&m.value, m.strategy))
        );
        debug!("comment: {:?}", record.comment.as_ref().map(|m| (&m.value, m.strategy)));

        let missing = record.missing_fields();
        if !missing.is_empty() {
            debug!("Fields not found: {}", missing.join(", "));
        }

        Ok(record)
    }

    /// Run every matcher of every field and collect all candidates.
    pub fn explain(&self, text: &str, file_name: &str) -> Result<Explanation> {
        self.check_input(text, file_name)?;

        let cleaned = self.cleanup.clean(text);
        self.check_len(&cleaned)?;
        let doc = Document::new(&cleaned, file_name);

        Ok(Explanation {
            date: self.dates.extract_all(&doc),
            contractor: self.contractor.extract_all(&doc),
            amount: self.amount.extract_all(&doc),
            incoming_number: self.incoming_number.extract_all(&doc),
            comment: self.comment.extract_all(&doc),
        })
    }
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract all five fields with default settings.
pub fn extract(text: &str, file_name: &str) -> Result<ExtractedRecord> {
    RecordExtractor::new().extract(text, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::Strategy;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const INVOICE: &str = "Счет-фактура № 58138246/26547 от 16 ноября 2025 г.\n\
        Продавец: ООО \"Ромашка\",\n\
        Покупатель: ИП Иванов\n\
        Основание: Счет-Оферта № 0134086922-0566\n\
        Гвозди 3 шт. 150,00 450,00\n\
        Всего к оплате: 450,00 руб.\n";

    #[test]
    fn test_extract_full_invoice() {
        let record = extract(INVOICE, "invoice.pdf").unwrap();
        let legacy = record.to_legacy();

        assert_eq!(legacy.date, "16.11.2025");
        assert_eq!(legacy.contractor, "ООО \"Ромашка\"");
        assert_eq!(legacy.amount, dec!(450.00));
        assert_eq!(legacy.incoming_number, "58138246/26547");
        assert_eq!(legacy.comment, "0566");
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn test_file_name_only() {
        let record = extract("", "Счет 16.11.25=1234.56.pdf").unwrap();
        assert_eq!(record.to_legacy().date, "16.11.2025");
        assert_eq!(record.amount.unwrap().value, dec!(1234.56));
        assert!(record.contractor.is_none());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_eq!(extract("  \n", ""), Err(ExtractionError::EmptyInput));
    }

    #[test]
    fn test_text_too_long() {
        let extractor = RecordExtractor::new().with_max_text_len(10);
        assert_eq!(
            extractor.extract("Всего к оплате: 450,00 руб.", "a.pdf"),
            Err(ExtractionError::TextTooLong { len: "Всего к оплате: 450,00 руб.".len(), limit: 10 })
        );
        assert!(RecordExtractor::new().with_max_text_len(0).extract(INVOICE, "").is_ok());
    }

    #[test]
    fn test_text_too_long_after_cleanup() {
        let extractor = RecordExtractor::new()
            .with_max_text_len(10)
            .with_cleanup(Box::new(ReplacementTable::new().with("x", "xxxxxxxxxx")));

        assert_eq!(
            extractor.extract("x 1", "a.pdf"),
            Err(ExtractionError::TextTooLong { len: 12, limit: 10 })
        );
        assert!(matches!(
            extractor.explain("x 1", "a.pdf"),
            Err(ExtractionError::TextTooLong { len: 12, limit: 10 })
        ));
    }

    #[test]
    fn test_fullwidth_digits_do_not_panic() {
        let record = extract("Счет-Оферта № １２３４５", "a.pdf").unwrap();
        assert!(record.comment.is_none());
    }

    #[test]
    fn test_cleanup_runs_before_matching() {
        // Latin "C" in place of the Cyrillic letter.
        let text = "Cчет-фактура № 77";
        assert!(extract(text, "").unwrap().incoming_number.is_none());

        let extractor = RecordExtractor::new()
            .with_cleanup(Box::new(ReplacementTable::new().with("Cчет", "Счет")));
        let number = extractor.extract(text, "").unwrap().incoming_number.unwrap();
        assert_eq!(number.value, "77");
        assert_eq!(number.strategy, Strategy::InvoiceLabel);
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            contractor_min_len: 3,
            replacements: vec![("Cчет".to_string(), "Счет".to_string())],
            ..Default::default()
        };
        let record = RecordExtractor::from_config(&config)
            .extract("Продавец: Лист\nCчет-фактура № 77", "")
            .unwrap();
        assert_eq!(record.contractor.unwrap().value, "Лист");
        assert_eq!(record.incoming_number.unwrap().value, "77");
    }

    #[test]
    fn test_explain_lists_all_candidates() {
        let explanation = RecordExtractor::new().explain(INVOICE, "scan_16.11.25.pdf").unwrap();

        let date_strategies: Vec<Strategy> = explanation.date.iter().map(|m| m.strategy).collect();
        assert_eq!(
            date_strategies,
            vec![Strategy::DateLongForm, Strategy::DateFromFileName]
        );
        assert_eq!(explanation.comment[0].value, "0566");
        assert!(explanation.amount.len() > 1);
    }
}
