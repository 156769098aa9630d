//! Common regex patterns for invoice field extraction.
//!
//! Digits are ASCII only (`[0-9]`), matching [`super::stands_alone`].
//!
//! Patterns that must not match inside a longer run of digits use an explicit
//! `(?:^|[^0-9])` / `(?:[^0-9]|$)` guard rather than `\b`: Cyrillic letters and
//! `_` are word characters, so `\b` fails on `итого1 050,00руб` or `scan_16.11.25`.
//! The guards consume a character, so iterate with [`super::resuming_captures`].

use lazy_static::lazy_static;
use regex::Regex;

/// Thousands-aware decimal amount, e.g. `1 050,00` or `450.00`.
pub const AMOUNT_NUMBER: &str = r"[0-9]{1,3}(?:[ \u{00a0}][0-9]{3})*[.,][0-9]{2}";

/// Genitive month names in calendar order.
pub const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

/// Total labels in priority order.
pub const TOTAL_LABELS: [&str; 5] = [
    r"Всего\s+к\s+оплате",
    r"Сумма",
    r"Итого",
    r"К\s+оплате",
    r"Стоимость\s+с\s+налогом",
];

fn total_with_marker(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?i){label}(?:[\s\S]*?[^0-9.,])?({AMOUNT_NUMBER})\s*(?:₽|руб|р\.)"
    ))
    .unwrap()
}

fn total_without_marker(label: &str) -> Regex {
    Regex::new(&format!(
        r"(?i){label}(?:[\s\S]*?[^0-9.,])?({AMOUNT_NUMBER})(?:[^0-9]|$)"
    ))
    .unwrap()
}

lazy_static! {
    // Dates
    pub static ref DATE_LONG_RU: Regex = Regex::new(&format!(
        r"(?i)(?:^|[^0-9])([0-9]{{1,2}})\s+({})[\s\p{{P}}]*([0-9]{{4}})(?:[^0-9]|$)",
        MONTHS_GENITIVE.join("|")
    ))
    .unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"(?:^|[^0-9])([0-9]{1,2})\.([0-9]{1,2})\.([0-9]{4})(?:[^0-9]|$)"
    ).unwrap();

    pub static ref DATE_FILE_NAME: Regex = Regex::new(
        r"(?:^|[^0-9])([0-9]{2})\.([0-9]{2})\.([0-9]{4}|[0-9]{2})(?:[^0-9]|$)"
    ).unwrap();

    // Contractor
    pub static ref SELLER_LABEL: Regex = Regex::new(
        r"(?i)(?:Продавец|Поставщик)\s*:?\s*(.+)"
    ).unwrap();

    pub static ref OTHER_PARTY_LABEL: Regex = Regex::new(
        r"(?i)Покупатель|Грузоотправитель|Грузополучатель"
    ).unwrap();

    pub static ref LEGAL_ENTITY: Regex = Regex::new(
        r#"(?:^|[^\p{L}\p{N}])((?:ООО|ПАО|АО|ИП)[\s"«“„][^,;\r\n]+)"#
    ).unwrap();

    pub static ref QUOTED_NAME: Regex = Regex::new(
        r#"["«“„]([^"«»“”„\r\n]{6,})["»”“]"#
    ).unwrap();

    // Amounts
    pub static ref AMOUNT_FILE_NAME: Regex = Regex::new(
        r"=\s*([0-9]+[.,][0-9]+)"
    ).unwrap();

    pub static ref AMOUNT_PATTERN: Regex = Regex::new(AMOUNT_NUMBER).unwrap();

    /// `(label, number before a currency marker, any number)` per total label.
    pub static ref TOTAL_AMOUNT: Vec<(&'static str, Regex, Regex)> = TOTAL_LABELS
        .iter()
        .map(|label| (*label, total_with_marker(label), total_without_marker(label)))
        .collect();

    pub static ref UNIT_TOKEN: Regex = Regex::new(
        r"(?i)(?:^|[^\p{L}])(?:шт|кг|уп|ед)(?:[^\p{L}]|$)"
    ).unwrap();

    pub static ref NUMERIC_TOKEN: Regex = Regex::new(
        r"[0-9]+(?:[.,][0-9]+)?"
    ).unwrap();

    // Incoming number
    pub static ref INVOICE_NUMBER_SLASHED: Regex = Regex::new(
        r"(?i)Сч[её]т[\s-]*фактур[аы]?\s*(?:№|N[oо]?\.?)?\s*([0-9]+/[0-9]+)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_PLAIN: Regex = Regex::new(
        r"(?i)Сч[её]т[\s-]*фактур[аы]?\s*(?:№|N[oо]?\.?)?\s*([0-9]+)"
    ).unwrap();

    pub static ref NUMBER_BEFORE_DATE: Regex = Regex::new(
        r"(?:№|N[oо]\.?)\s*([0-9]+(?:/[0-9]+)?)\s*(?i:от)(?:[^\p{L}]|$)"
    ).unwrap();

    pub static ref SHIPMENT_DOCUMENT: Regex = Regex::new(
        r"(?i)документ\w*\s+об\s+отгрузке[\s\S]*?(?:№|N[oо]\.?)\s*([0-9]+(?:/[0-9]+)?)"
    ).unwrap();

    pub static ref SLASHED_RUN: Regex = Regex::new(
        r"(?:^|[^0-9])([0-9]{5,}/[0-9]{2,})"
    ).unwrap();

    pub static ref LONG_DIGIT_RUN: Regex = Regex::new(
        r"(?:^|[^0-9])([0-9]{6,})"
    ).unwrap();

    // Comment
    pub static ref OFFER_SUFFIX: Regex = Regex::new(
        r"(?i)Оферт[аы]\s*(?:№|N[oо]?\.?)?\s*([0-9]+)[-–]([0-9]+)"
    ).unwrap();

    pub static ref OFFER_NUMBER: Regex = Regex::new(
        r"(?i)Оферт[аы]\s*(?:№|N[oо]?\.?)?\s*([0-9]{4,})"
    ).unwrap();

    pub static ref OFFER_NEARBY: Regex = Regex::new(
        r"(?i)Оферт[аы](?:[\s\S]*?[^0-9])?([0-9]{4})(?:[^0-9]|$)"
    ).unwrap();

    pub static ref FOUR_DIGITS: Regex = Regex::new(
        r"(?:^|[^0-9])([0-9]{4})(?:[^0-9]|$)"
    ).unwrap();
}

/// Month number (1-12) for a genitive month name, case-insensitive.
pub fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS_GENITIVE
        .iter()
        .position(|m| *m == name)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_number() {
        assert_eq!(month_number("января"), Some(1));
        assert_eq!(month_number("НОЯБРЯ"), Some(11));
        assert_eq!(month_number("декабря"), Some(12));
        assert_eq!(month_number("ноябрь"), None);
    }

    #[test]
    fn test_total_patterns_compile_in_order() {
        let labels: Vec<&str> = TOTAL_AMOUNT.iter().map(|(l, _, _)| *l).collect();
        assert_eq!(labels, TOTAL_LABELS.to_vec());
    }

    #[test]
    fn test_digit_guards() {
        assert!(DATE_FILE_NAME.is_match("scan_16.11.25_final.pdf"));
        assert!(!DATE_FILE_NAME.is_match("116.11.253"));
        assert!(FOUR_DIGITS.is_match("заказ 0566."));
        assert!(!FOUR_DIGITS.is_match("12345"));
    }

    #[test]
    fn test_unit_token() {
        assert!(UNIT_TOKEN.is_match("Гвозди 2 шт. 100,00"));
        assert!(UNIT_TOKEN.is_match("Сахар 5 кг"));
        assert!(!UNIT_TOKEN.is_match("Грузоотправитель"));
        assert!(!UNIT_TOKEN.is_match("единица"));
    }
}
