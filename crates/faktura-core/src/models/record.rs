//! Extracted invoice record and its legacy flat form.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::invoice::rules::ExtractionMatch;

/// Sentinel the legacy record uses for a missing date.
pub const DATE_NOT_FOUND: &str = "not found";

/// Display format for document dates.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// A document date, always rendered as `DD.MM.YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentDate(pub NaiveDate);

impl fmt::Display for DocumentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for DocumentDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, DATE_FORMAT).map(DocumentDate)
    }
}

impl Serialize for DocumentDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Fields extracted from one document.
///
/// `None` means no heuristic found the field; a found field carries the
/// strategy that produced it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Document date.
    pub date: Option<ExtractionMatch<DocumentDate>>,

    /// Seller / supplier name.
    pub contractor: Option<ExtractionMatch<String>>,

    /// Total amount, strictly positive.
    pub amount: Option<ExtractionMatch<Decimal>>,

    /// Incoming (invoice) number, `N` or `N/M`.
    pub incoming_number: Option<ExtractionMatch<String>>,

    /// Comment, normally the four-digit offer suffix.
    pub comment: Option<ExtractionMatch<String>>,
}

impl ExtractedRecord {
    /// Names of the fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.contractor.is_none() {
            missing.push("contractor");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if self.incoming_number.is_none() {
            missing.push("incoming_number");
        }
        if self.comment.is_none() {
            missing.push("comment");
        }
        missing
    }

    /// Mean strategy confidence over all five fields, missing ones count as 0.
    pub fn confidence(&self) -> f32 {
        let found = [
            self.date.as_ref().map(|m| m.confidence()),
            self.contractor.as_ref().map(|m| m.confidence()),
            self.amount.as_ref().map(|m| m.confidence()),
            self.incoming_number.as_ref().map(|m| m.confidence()),
            self.comment.as_ref().map(|m| m.confidence()),
        ];
        found.iter().map(|c| c.unwrap_or(0.0)).sum::<f32>() / found.len() as f32
    }

    /// Flatten into the sentinel-valued form older consumers expect.
    pub fn to_legacy(&self) -> LegacyRecord {
        LegacyRecord {
            date: self
                .date
                .as_ref()
                .map(|m| m.value.to_string())
                .unwrap_or_else(|| DATE_NOT_FOUND.to_string()),
            contractor: value_or_empty(&self.contractor),
            amount: self.amount.as_ref().map(|m| m.value).unwrap_or(Decimal::ZERO),
            incoming_number: value_or_empty(&self.incoming_number),
            comment: value_or_empty(&self.comment),
        }
    }
}

fn value_or_empty(field: &Option<ExtractionMatch<String>>) -> String {
    field.as_ref().map(|m| m.value.clone()).unwrap_or_default()
}

/// Flat record with sentinels: `"not found"` date, empty strings, zero amount.
///
/// A zero amount here cannot be told apart from a missing one; use
/// [`ExtractedRecord`] when that matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRecord {
    pub date: String,
    pub contractor: String,
    pub amount: Decimal,
    pub incoming_number: String,
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::Strategy;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_document_date_format() {
        let date = DocumentDate(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(date.to_string(), "05.03.2025");
        assert_eq!("05.03.2025".parse::<DocumentDate>().unwrap(), date);
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"05.03.2025\"");
    }

    #[test]
    fn test_empty_record_legacy_sentinels() {
        let legacy = ExtractedRecord::default().to_legacy();
        assert_eq!(
            legacy,
            LegacyRecord {
                date: "not found".to_string(),
                contractor: String::new(),
                amount: Decimal::ZERO,
                incoming_number: String::new(),
                comment: String::new(),
            }
        );
        assert_eq!(ExtractedRecord::default().missing_fields().len(), 5);
        assert_eq!(ExtractedRecord::default().confidence(), 0.0);
    }

    #[test]
    fn test_legacy_json_shape() {
        let record = ExtractedRecord {
            amount: Some(ExtractionMatch::new(dec!(1050.00), Strategy::TotalLabel, "1 050.00 ₽")),
            comment: Some(ExtractionMatch::new("0566".to_string(), Strategy::OfferSuffix, "0566")),
            ..Default::default()
        };

        let json = serde_json::to_value(record.to_legacy()).unwrap();
        assert_eq!(json["date"], "not found");
        assert_eq!(json["amount"].as_f64(), Some(1050.0));
        assert_eq!(json["incomingNumber"], "");
        assert_eq!(json["comment"], "0566");
        assert_eq!(record.missing_fields(), vec!["date", "contractor", "incoming_number"]);
    }
}
