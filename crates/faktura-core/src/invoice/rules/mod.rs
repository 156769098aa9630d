//! Rule-based field extractors for invoice text.
//!
//! Every field is an ordered list of matcher functions. The first matcher
//! that returns a value wins; later matchers are never consulted.

pub mod amounts;
pub mod comment;
pub mod contractor;
pub mod dates;
pub mod numbers;
pub mod patterns;

pub use amounts::{extract_amount, parse_amount, AmountExtractor};
pub use comment::{extract_comment, CommentExtractor};
pub use contractor::{extract_contractor, normalize_contractor, ContractorExtractor};
pub use dates::{extract_date, DateExtractor};
pub use numbers::{extract_incoming_number, IncomingNumberExtractor};
pub use patterns::*;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// The two inputs every extractor looks at.
#[derive(Debug, Clone, Copy)]
pub struct Document<'a> {
    /// Text layer of the document.
    pub text: &'a str,
    /// Original file name, which often encodes date, amount and ids.
    pub file_name: &'a str,
}

impl<'a> Document<'a> {
    pub fn new(text: &'a str, file_name: &'a str) -> Self {
        Self { text, file_name }
    }
}

/// One matcher in a field's priority list.
pub type Matcher<E, T> = fn(&E, &Document<'_>) -> Option<ExtractionMatch<T>>;

/// Trait for field extractors.
pub trait FieldExtractor: Sized {
    /// The type of value this extractor produces.
    type Output;

    /// Matchers in priority order.
    fn matchers(&self) -> &[Matcher<Self, Self::Output>];

    /// Run matchers in order and return the first hit.
    fn extract(&self, doc: &Document<'_>) -> Option<ExtractionMatch<Self::Output>> {
        self.matchers().iter().find_map(|matcher| matcher(self, doc))
    }

    /// Run every matcher and return all hits in priority order.
    fn extract_all(&self, doc: &Document<'_>) -> Vec<ExtractionMatch<Self::Output>> {
        self.matchers()
            .iter()
            .filter_map(|matcher| matcher(self, doc))
            .collect()
    }
}

/// Which heuristic produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// "16 ноября 2025 г."
    DateLongForm,
    /// "16.11.2025"
    DateNumeric,
    /// "…16.11.25…" in the file name.
    DateFromFileName,
    /// "Продавец: …" / "Поставщик: …"
    SellerLabel,
    /// "ООО …", "АО …", "ПАО …", "ИП …"
    LegalEntity,
    /// A quoted organisation name.
    QuotedName,
    /// "…=1234.56…" in the file name.
    AmountFromFileName,
    /// Number after a total label ("Всего к оплате", "Итого", …).
    TotalLabel,
    /// Rightmost number of the lowest product/total row.
    TableRow,
    /// Line total recognised as price times integer quantity.
    PriceTimesQuantity,
    /// Largest plausible number in the document.
    LargestPlausible,
    /// "Счет-фактура № …"
    InvoiceLabel,
    /// "№ … от"
    NumberBeforeDate,
    /// "документ об отгрузке … № …"
    ShipmentDocument,
    /// Bare "NNNNN/NN".
    SlashedRun,
    /// Bare run of six or more digits.
    LongDigitRun,
    /// Second group of "Оферта № NNN-NNNN".
    OfferSuffix,
    /// Last four digits of "Оферта № NNNNNNNN".
    OfferNumberTail,
    /// First four-digit group after "Оферта".
    OfferNearby,
    /// Any standalone four-digit group in the text.
    StandaloneDigits,
    /// Four-digit group in the file name.
    CommentFromFileName,
}

impl Strategy {
    /// Rough reliability of the heuristic (0.0 - 1.0).
    pub fn confidence(&self) -> f32 {
        match self {
            Strategy::DateLongForm
            | Strategy::AmountFromFileName
            | Strategy::InvoiceLabel
            | Strategy::OfferSuffix
            | Strategy::SellerLabel => 0.95,
            Strategy::DateNumeric
            | Strategy::TotalLabel
            | Strategy::OfferNumberTail
            | Strategy::NumberBeforeDate
            | Strategy::ShipmentDocument => 0.85,
            Strategy::DateFromFileName | Strategy::LegalEntity | Strategy::OfferNearby => 0.7,
            Strategy::TableRow | Strategy::PriceTimesQuantity | Strategy::QuotedName => 0.6,
            Strategy::SlashedRun | Strategy::LargestPlausible => 0.5,
            Strategy::LongDigitRun
            | Strategy::StandaloneDigits
            | Strategy::CommentFromFileName => 0.3,
        }
    }
}

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Text,
    FileName,
}

/// An extracted value with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Heuristic that fired.
    pub strategy: Strategy,
    /// Whether the value was read from the text or the file name.
    pub origin: Origin,
    /// Source text that was matched.
    pub source: String,
    /// Byte span of `source` in the text or file name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<(usize, usize)>,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, strategy: Strategy, source: impl Into<String>) -> Self {
        Self {
            value,
            strategy,
            origin: Origin::Text,
            source: source.into(),
            position: None,
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn from_file_name(mut self) -> Self {
        self.origin = Origin::FileName;
        self
    }

    /// Confidence of the strategy that produced this value.
    pub fn confidence(&self) -> f32 {
        self.strategy.confidence()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            value: f(self.value),
            strategy: self.strategy,
            origin: self.origin,
            source: self.source,
            position: self.position,
        }
    }
}

/// Check that a match isn't glued to more digits on either side.
pub(crate) fn stands_alone(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
}

/// Every match of `pattern`, resuming one character past the start of capture
/// `group` instead of at the end of the match.
///
/// Digit guards consume the separator after a match, so plain `captures_iter`
/// misses a candidate that directly follows a rejected one (`31.02.2025 28.02.2025`).
pub(crate) fn resuming_captures<'h>(
    pattern: &Regex,
    haystack: &'h str,
    group: usize,
) -> impl Iterator<Item = Captures<'h>> {
    let mut at = 0;
    std::iter::from_fn(move || {
        if at > haystack.len() {
            return None;
        }
        let caps = pattern.captures_at(haystack, at)?;
        let anchor = caps.get(group).or_else(|| caps.get(0))?;
        let step = haystack[anchor.start()..].chars().next().map_or(1, char::len_utf8);
        at = anchor.start() + step;
        Some(caps)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stands_alone() {
        let text = "999999.99 и 450.00";
        // "999.99" inside the first run
        assert!(!stands_alone(text, 3, 9));
        assert!(stands_alone(text, 0, 9));
        let start = text.find("450").unwrap();
        assert!(stands_alone(text, start, start + 6));
    }

    #[test]
    fn test_stands_alone_ignores_non_ascii_digits() {
        // Fullwidth digits are not part of any number.
        let text = "１450.00２";
        let start = text.find("450").unwrap();
        assert!(stands_alone(text, start, start + 6));
    }

    #[test]
    fn test_resuming_captures_reuses_separator() {
        let values: Vec<String> = resuming_captures(&DATE_NUMERIC, "31.02.2025 28.02.2025", 1)
            .map(|caps| caps[1].to_string())
            .collect();
        assert_eq!(values, vec!["31", "28"]);

        // The second date still has to stand alone.
        let values: Vec<String> = resuming_captures(&FOUR_DIGITS, "1234 56789", 1)
            .map(|caps| caps[1].to_string())
            .collect();
        assert_eq!(values, vec!["1234"]);
    }

    #[test]
    fn test_match_provenance() {
        let m = ExtractionMatch::new(1, Strategy::DateNumeric, "01.01.2025")
            .with_position(3, 13)
            .from_file_name();
        assert_eq!(m.origin, Origin::FileName);
        assert_eq!(m.position, Some((3, 13)));
        assert_eq!(m.map(|v| v + 1).value, 2);
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::PriceTimesQuantity).unwrap();
        assert_eq!(json, "\"price_times_quantity\"");
    }
}
