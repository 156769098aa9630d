//! Incoming (invoice) number extraction.

use regex::Regex;

use super::patterns::{
    INVOICE_NUMBER_PLAIN, INVOICE_NUMBER_SLASHED, LONG_DIGIT_RUN, NUMBER_BEFORE_DATE,
    SHIPMENT_DOCUMENT, SLASHED_RUN,
};
use super::{Document, ExtractionMatch, FieldExtractor, Matcher, Strategy};

/// Incoming number extractor. Numbers are returned verbatim.
pub struct IncomingNumberExtractor;

impl IncomingNumberExtractor {
    const MATCHERS: &'static [Matcher<Self, String>] = &[
        Self::invoice_label,
        Self::number_before_date,
        Self::shipment_document,
        Self::slashed_run,
        Self::long_digit_run,
    ];

    pub fn new() -> Self {
        Self
    }

    /// "Счет-фактура № 58138246/26547", then "Счет-фактура № 145".
    fn invoice_label(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        first_capture(&INVOICE_NUMBER_SLASHED, doc.text, Strategy::InvoiceLabel)
            .or_else(|| first_capture(&INVOICE_NUMBER_PLAIN, doc.text, Strategy::InvoiceLabel))
    }

    /// "№ 77/3 от …"
    fn number_before_date(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        first_capture(&NUMBER_BEFORE_DATE, doc.text, Strategy::NumberBeforeDate)
    }

    fn shipment_document(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        first_capture(&SHIPMENT_DOCUMENT, doc.text, Strategy::ShipmentDocument)
    }

    fn slashed_run(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        first_capture(&SLASHED_RUN, doc.text, Strategy::SlashedRun)
    }

    fn long_digit_run(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        first_capture(&LONG_DIGIT_RUN, doc.text, Strategy::LongDigitRun)
    }
}

impl Default for IncomingNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IncomingNumberExtractor {
    type Output = String;

    fn matchers(&self) -> &[Matcher<Self, Self::Output>] {
        Self::MATCHERS
    }
}

/// Extract the incoming number from invoice text.
pub fn extract_incoming_number(text: &str) -> Option<ExtractionMatch<String>> {
    IncomingNumberExtractor::new().extract(&Document::new(text, ""))
}

fn first_capture(pattern: &Regex, text: &str, strategy: Strategy) -> Option<ExtractionMatch<String>> {
    let m = pattern.captures(text)?.get(1)?;
    Some(ExtractionMatch::new(m.as_str().to_string(), strategy, m.as_str()).with_position(m.start(), m.end()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(text: &str) -> Option<(String, Strategy)> {
        extract_incoming_number(text).map(|m| (m.value, m.strategy))
    }

    #[test]
    fn test_invoice_label_slashed() {
        assert_eq!(
            number("Счет-фактура № 58138246/26547 от 16 ноября 2025 г."),
            Some(("58138246/26547".to_string(), Strategy::InvoiceLabel))
        );
    }

    #[test]
    fn test_invoice_label_plain() {
        assert_eq!(
            number("Счёт-фактура N 145 от 16.11.2025"),
            Some(("145".to_string(), Strategy::InvoiceLabel))
        );
    }

    #[test]
    fn test_number_before_date() {
        assert_eq!(
            number("Универсальный передаточный документ № 77/3 от 01.02.2025"),
            Some(("77/3".to_string(), Strategy::NumberBeforeDate))
        );
    }

    #[test]
    fn test_shipment_document() {
        assert_eq!(
            number("Документ об отгрузке: товарная накладная № 4512"),
            Some(("4512".to_string(), Strategy::ShipmentDocument))
        );
    }

    #[test]
    fn test_bare_runs() {
        assert_eq!(
            number("Ref 123456/78"),
            Some(("123456/78".to_string(), Strategy::SlashedRun))
        );
        assert_eq!(
            number("Платёж 20251116 принят"),
            Some(("20251116".to_string(), Strategy::LongDigitRun))
        );
    }

    #[test]
    fn test_label_beats_bare_run() {
        let m = extract_incoming_number("Код 9876543210\nСчет-фактура № 12").unwrap();
        assert_eq!(m.value, "12");
        assert_eq!(m.strategy, Strategy::InvoiceLabel);
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(number("Накладная 12"), None);
        assert_eq!(number(""), None);
    }

    #[test]
    fn test_position() {
        let text = "Счет-фактура № 58138246/26547";
        let (start, end) = extract_incoming_number(text).unwrap().position.unwrap();
        assert_eq!(&text[start..end], "58138246/26547");
    }
}
