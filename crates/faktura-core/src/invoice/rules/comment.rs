//! Comment extraction: the four-digit suffix of an offer invoice number.

use super::patterns::{FOUR_DIGITS, OFFER_NEARBY, OFFER_NUMBER, OFFER_SUFFIX};
use super::{Document, ExtractionMatch, FieldExtractor, Matcher, Strategy};

/// Comment field extractor.
pub struct CommentExtractor;

impl CommentExtractor {
    const MATCHERS: &'static [Matcher<Self, String>] = &[
        Self::offer_suffix,
        Self::offer_number_tail,
        Self::offer_nearby,
        Self::standalone_digits,
        Self::file_name,
    ];

    pub fn new() -> Self {
        Self
    }

    /// "Счет-Оферта № 0134086922-0566" gives "0566".
    fn offer_suffix(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        let m = OFFER_SUFFIX.captures(doc.text)?.get(2)?;
        Some(
            ExtractionMatch::new(m.as_str().to_string(), Strategy::OfferSuffix, m.as_str())
                .with_position(m.start(), m.end()),
        )
    }

    /// "Счет-Оферта № 0134086922" gives "6922".
    fn offer_number_tail(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        let m = OFFER_NUMBER.captures(doc.text)?.get(1)?;
        // The group is ASCII digits only.
        let start = m.end() - 4;
        let tail = &doc.text[start..m.end()];
        Some(
            ExtractionMatch::new(tail.to_string(), Strategy::OfferNumberTail, m.as_str())
                .with_position(start, m.end()),
        )
    }

    fn offer_nearby(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        let m = OFFER_NEARBY.captures(doc.text)?.get(1)?;
        Some(
            ExtractionMatch::new(m.as_str().to_string(), Strategy::OfferNearby, m.as_str())
                .with_position(m.start(), m.end()),
        )
    }

    fn standalone_digits(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        let m = FOUR_DIGITS.captures(doc.text)?.get(1)?;
        Some(
            ExtractionMatch::new(m.as_str().to_string(), Strategy::StandaloneDigits, m.as_str())
                .with_position(m.start(), m.end()),
        )
    }

    fn file_name(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        let m = FOUR_DIGITS.captures(doc.file_name)?.get(1)?;
        Some(
            ExtractionMatch::new(m.as_str().to_string(), Strategy::CommentFromFileName, m.as_str())
                .with_position(m.start(), m.end())
                .from_file_name(),
        )
    }
}

impl Default for CommentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CommentExtractor {
    type Output = String;

    fn matchers(&self) -> &[Matcher<Self, Self::Output>] {
        Self::MATCHERS
    }
}

/// Extract the comment from invoice text, falling back to the file name.
pub fn extract_comment(text: &str, file_name: &str) -> Option<ExtractionMatch<String>> {
    CommentExtractor::new().extract(&Document::new(text, file_name))
}
