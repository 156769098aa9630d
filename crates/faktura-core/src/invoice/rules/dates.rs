//! Date extraction for invoices.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use tracing::trace;

use super::patterns::{month_number, DATE_FILE_NAME, DATE_LONG_RU, DATE_NUMERIC};
use super::{resuming_captures, Document, ExtractionMatch, FieldExtractor, Matcher, Strategy};
use crate::models::record::DocumentDate;

/// Date field extractor.
pub struct DateExtractor;

impl DateExtractor {
    const MATCHERS: &'static [Matcher<Self, DocumentDate>] =
        &[Self::long_form, Self::numeric, Self::file_name];

    pub fn new() -> Self {
        Self
    }

    /// "16 ноября 2025 г."
    fn long_form(&self, doc: &Document<'_>) -> Option<ExtractionMatch<DocumentDate>> {
        first_valid(&DATE_LONG_RU, doc.text, Strategy::DateLongForm, |caps| {
            let day = caps[1].parse().ok()?;
            let month = month_number(&caps[2])?;
            let year = caps[3].parse().ok()?;
            Some((year, month, day))
        })
    }

    /// "16.11.2025" or "5.3.2025"
    fn numeric(&self, doc: &Document<'_>) -> Option<ExtractionMatch<DocumentDate>> {
        first_valid(&DATE_NUMERIC, doc.text, Strategy::DateNumeric, |caps| {
            Some((caps[3].parse().ok()?, caps[2].parse().ok()?, caps[1].parse().ok()?))
        })
    }

    /// "…_16.11.25.pdf"
    fn file_name(&self, doc: &Document<'_>) -> Option<ExtractionMatch<DocumentDate>> {
        first_valid(
            &DATE_FILE_NAME,
            doc.file_name,
            Strategy::DateFromFileName,
            |caps| {
                Some((
                    parse_year(&caps[3])?,
                    caps[2].parse().ok()?,
                    caps[1].parse().ok()?,
                ))
            },
        )
        .map(ExtractionMatch::from_file_name)
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = DocumentDate;

    fn matchers(&self) -> &[Matcher<Self, Self::Output>] {
        Self::MATCHERS
    }
}

/// Extract the document date from text, falling back to the file name.
pub fn extract_date(text: &str, file_name: &str) -> Option<ExtractionMatch<DocumentDate>> {
    DateExtractor::new().extract(&Document::new(text, file_name))
}

/// First occurrence of `pattern` that is a real calendar date.
fn first_valid(
    pattern: &Regex,
    haystack: &str,
    strategy: Strategy,
    ymd: impl Fn(&Captures<'_>) -> Option<(i32, u32, u32)>,
) -> Option<ExtractionMatch<DocumentDate>> {
    resuming_captures(pattern, haystack, 1).find_map(|caps| {
        let (year, month, day) = ymd(&caps)?;
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            trace!("Skipping impossible date {:02}.{:02}.{}", day, month, year);
            return None;
        };
        // Span without the digit guards on either side.
        let start = caps.get(1)?.start();
        let end = caps.get(3)?.end();
        Some(
            ExtractionMatch::new(DocumentDate(date), strategy, &haystack[start..end])
                .with_position(start, end),
        )
    })
}

/// Two-digit years in file names are always 20xx.
fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 { Some(2000 + year) } else { Some(year) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(text: &str, file_name: &str) -> Option<String> {
        extract_date(text, file_name).map(|m| m.value.to_string())
    }

    #[test]
    fn test_extract_date_long_form() {
        assert_eq!(
            date("Счет-фактура № 12 от 16 ноября 2025 г.", ""),
            Some("16.11.2025".to_string())
        );
        assert_eq!(date("от 3 Марта, 2024", ""), Some("03.03.2024".to_string()));
    }

    #[test]
    fn test_extract_date_numeric_is_padded() {
        assert_eq!(date("Дата: 5.3.2025", ""), Some("05.03.2025".to_string()));
        assert_eq!(date("16.11.2025", ""), Some("16.11.2025".to_string()));
    }

    #[test]
    fn test_long_form_wins_over_numeric() {
        let m = extract_date("Оплатить до 01.12.2025\nот 16 ноября 2025 г.", "").unwrap();
        assert_eq!(m.value.to_string(), "16.11.2025");
        assert_eq!(m.strategy, Strategy::DateLongForm);
    }

    #[test]
    fn test_file_name_fallback_expands_year() {
        let m = extract_date("без даты", "С-фактура_16.11.25.pdf").unwrap();
        assert_eq!(m.value.to_string(), "16.11.2025");
        assert_eq!(m.strategy, Strategy::DateFromFileName);
        assert_eq!(m.origin, super::super::Origin::FileName);

        assert_eq!(date("", "scan 01.02.2024.pdf"), Some("01.02.2024".to_string()));
    }

    #[test]
    fn test_no_date_anywhere() {
        assert_eq!(date("Товарная накладная", "invoice.pdf"), None);
    }

    #[test]
    fn test_impossible_date_is_skipped() {
        assert_eq!(
            date("31.02.2025 и 28.02.2025", ""),
            Some("28.02.2025".to_string())
        );
    }

    #[test]
    fn test_impossible_date_directly_followed_by_valid_one() {
        assert_eq!(date("31.02.2025 28.02.2025", ""), Some("28.02.2025".to_string()));
        assert_eq!(
            date("31 февраля 2025 1 марта 2025", ""),
            Some("01.03.2025".to_string())
        );
        assert_eq!(date("", "31.02.25_01.03.25.pdf"), Some("01.03.2025".to_string()));
    }

    #[test]
    fn test_fullwidth_digits_are_not_dates() {
        assert_eq!(date("１６.１１.２０２５", ""), None);
    }

    #[test]
    fn test_digit_run_is_not_a_date() {
        assert_eq!(date("код 115.03.20251", ""), None);
    }

    #[test]
    fn test_position_points_at_match() {
        let text = "от 16 ноября 2025 г.";
        let m = extract_date(text, "").unwrap();
        let (start, end) = m.position.unwrap();
        assert_eq!(&text[start..end], "16 ноября 2025");
    }
}
