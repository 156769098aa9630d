//! Amount extraction for invoices.
//!
//! Labels and file-name hints are tried before any of the numeric
//! heuristics; the heuristics only guess which number is the total.

use regex::Match;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::trace;

use super::patterns::{AMOUNT_FILE_NAME, AMOUNT_PATTERN, NUMERIC_TOKEN, TOTAL_AMOUNT, UNIT_TOKEN};
use super::{stands_alone, Document, ExtractionMatch, FieldExtractor, Matcher, Strategy};

/// Amount field extractor.
pub struct AmountExtractor {
    /// Exclusive lower bound for the largest-number fallback.
    min_plausible: Decimal,
    /// Exclusive upper bound for the largest-number fallback.
    max_plausible: Decimal,
}

impl AmountExtractor {
    const MATCHERS: &'static [Matcher<Self, Decimal>] = &[
        Self::file_name,
        Self::total_label,
        Self::table_row,
        Self::price_times_quantity,
        Self::largest_plausible,
    ];

    pub fn new() -> Self {
        Self {
            min_plausible: Decimal::from(10),
            max_plausible: Decimal::from(1_000_000),
        }
    }

    /// Set the plausible range used by the largest-number fallback.
    pub fn with_plausible_range(mut self, min: Decimal, max: Decimal) -> Self {
        self.min_plausible = min;
        self.max_plausible = max;
        self
    }

    /// "…=1234.56…" in the file name.
    fn file_name(&self, doc: &Document<'_>) -> Option<ExtractionMatch<Decimal>> {
        AMOUNT_FILE_NAME.captures_iter(doc.file_name).find_map(|caps| {
            let m = caps.get(1)?;
            let amount = parse_amount(m.as_str())?;
            Some(
                ExtractionMatch::new(amount, Strategy::AmountFromFileName, m.as_str())
                    .with_position(m.start(), m.end())
                    .from_file_name(),
            )
        })
    }

    /// "Всего к оплате: 1 050,00 руб." and the other total labels.
    fn total_label(&self, doc: &Document<'_>) -> Option<ExtractionMatch<Decimal>> {
        for (label, with_marker, without_marker) in TOTAL_AMOUNT.iter() {
            for pattern in [with_marker, without_marker] {
                let found = pattern.captures_iter(doc.text).find_map(|caps| {
                    let m = caps.get(1)?;
                    let amount = parse_amount(m.as_str())?;
                    Some(
                        ExtractionMatch::new(amount, Strategy::TotalLabel, m.as_str())
                            .with_position(m.start(), m.end()),
                    )
                });
                if found.is_some() {
                    trace!("Total amount found after label {:?}", label);
                    return found;
                }
            }
        }
        None
    }

    /// Rightmost decimal of the lowest row that looks like a product or total row.
    fn table_row(&self, doc: &Document<'_>) -> Option<ExtractionMatch<Decimal>> {
        lines_with_offsets(doc.text).rev().find_map(|(offset, line)| {
            let numbers = decimal_numbers(line);
            if !UNIT_TOKEN.is_match(line) && numbers.len() < 2 {
                return None;
            }
            let last = numbers.last()?;
            let amount = parse_amount(last.as_str())?;
            Some(
                ExtractionMatch::new(amount, Strategy::TableRow, line.trim())
                    .with_position(offset + last.start(), offset + last.end()),
            )
        })
    }

    /// On a unit-of-measure row, a number that is an exact multiple of another
    /// number is taken as the line total (price times integer quantity).
    fn price_times_quantity(&self, doc: &Document<'_>) -> Option<ExtractionMatch<Decimal>> {
        let tolerance = Decimal::new(1, 2);

        lines_with_offsets(doc.text).rev().find_map(|(offset, line)| {
            if !UNIT_TOKEN.is_match(line) {
                return None;
            }
            let tokens: Vec<(Match<'_>, Decimal)> = NUMERIC_TOKEN
                .find_iter(line)
                .filter_map(|m| parse_amount(m.as_str()).map(|v| (m, v)))
                .collect();

            let mut best: Option<(Match<'_>, Decimal)> = None;
            for (i, (ma, a)) in tokens.iter().enumerate() {
                for (mb, b) in &tokens[i + 1..] {
                    let (hi, lo) = if a >= b { ((ma, a), b) } else { ((mb, b), a) };
                    let Some(rem) = hi.1.checked_rem(*lo) else {
                        continue;
                    };
                    if rem < tolerance && best.is_none_or(|(_, v)| *hi.1 > v) {
                        best = Some((*hi.0, *hi.1));
                    }
                }
            }

            let (m, value) = best?;
            Some(
                ExtractionMatch::new(value, Strategy::PriceTimesQuantity, line.trim())
                    .with_position(offset + m.start(), offset + m.end()),
            )
        })
    }

    /// Largest decimal in the document inside the plausible range.
    fn largest_plausible(&self, doc: &Document<'_>) -> Option<ExtractionMatch<Decimal>> {
        decimal_numbers(doc.text)
            .into_iter()
            .filter_map(|m| parse_amount(m.as_str()).map(|v| (m, v)))
            .filter(|(_, v)| *v > self.min_plausible && *v < self.max_plausible)
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(m, v)| {
                ExtractionMatch::new(v, Strategy::LargestPlausible, m.as_str())
                    .with_position(m.start(), m.end())
            })
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = Decimal;

    fn matchers(&self) -> &[Matcher<Self, Self::Output>] {
        Self::MATCHERS
    }
}

/// Extract the invoice total, file-name hint first.
pub fn extract_amount(text: &str, file_name: &str) -> Option<ExtractionMatch<Decimal>> {
    AmountExtractor::new().extract(&Document::new(text, file_name))
}

/// Parse an amount like "1 234,56" or "1234.56"; zero and negatives are rejected.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match Decimal::from_str(&cleaned) {
        Ok(amount) if amount > Decimal::ZERO => Some(amount),
        Ok(_) => None,
        Err(e) => {
            trace!("Skipping malformed amount {:?}: {}", s, e);
            None
        }
    }
}

/// Thousands-aware decimals that aren't glued to further digits.
///
/// A rejected match is retried one character later so that a real amount
/// right after a digit run (`2025 450,00`) is still found.
fn decimal_numbers(text: &str) -> Vec<Match<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(m) = AMOUNT_PATTERN.find_at(text, pos) {
        if stands_alone(text, m.start(), m.end()) {
            found.push(m);
            pos = m.end();
        } else {
            pos = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

/// Lines paired with their byte offset in `text`.
fn lines_with_offsets(text: &str) -> impl DoubleEndedIterator<Item = (usize, &str)> {
    text.split_inclusive('\n')
        .scan(0, |offset, line| {
            let start = *offset;
            *offset += line.len();
            Some((start, line))
        })
        .collect::<Vec<_>>()
        .into_iter()
}
