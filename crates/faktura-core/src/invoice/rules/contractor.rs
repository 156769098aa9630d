//! Contractor (seller) extraction.

use super::patterns::{LEGAL_ENTITY, OTHER_PARTY_LABEL, QUOTED_NAME, SELLER_LABEL};
use super::{resuming_captures, Document, ExtractionMatch, FieldExtractor, Matcher, Strategy};

/// Opening and closing quote characters seen around organisation names.
const QUOTES: &[char] = &['"', '«', '»', '“', '”', '„'];

/// Contractor field extractor.
pub struct ContractorExtractor {
    /// A candidate must be longer than this many characters.
    min_len: usize,
}

impl ContractorExtractor {
    const MATCHERS: &'static [Matcher<Self, String>] =
        &[Self::seller_label, Self::legal_entity, Self::quoted_name];

    /// Create a contractor extractor with the default minimum length of 5.
    pub fn new() -> Self {
        Self { min_len: 5 }
    }

    /// Set the minimum length a contractor must exceed.
    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    fn accept(&self, candidate: &str) -> Option<String> {
        let name = normalize_contractor(candidate);
        (name.chars().count() > self.min_len).then_some(name)
    }

    /// "Продавец: ООО «Ромашка»" on a line that names no other party.
    fn seller_label(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        let mut offset = 0;
        for line in doc.text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();

            if OTHER_PARTY_LABEL.is_match(line) {
                continue;
            }
            let Some(rest) = SELLER_LABEL.captures(line).and_then(|caps| caps.get(1)) else {
                continue;
            };
            if let Some(name) = self.accept(rest.as_str()) {
                return Some(
                    ExtractionMatch::new(name, Strategy::SellerLabel, rest.as_str().trim_end())
                        .with_position(line_start + rest.start(), line_start + rest.end()),
                );
            }
        }
        None
    }

    /// "ООО «Ромашка», ИНН …"
    fn legal_entity(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        resuming_captures(&LEGAL_ENTITY, doc.text, 1).find_map(|caps| {
            let m = caps.get(1)?;
            let name = self.accept(m.as_str())?;
            Some(
                ExtractionMatch::new(name, Strategy::LegalEntity, m.as_str())
                    .with_position(m.start(), m.end()),
            )
        })
    }

    /// «Ромашка плюс»
    fn quoted_name(&self, doc: &Document<'_>) -> Option<ExtractionMatch<String>> {
        QUOTED_NAME.captures_iter(doc.text).find_map(|caps| {
            let m = caps.get(1)?;
            let name = self.accept(m.as_str())?;
            let whole = caps.get(0)?;
            Some(
                ExtractionMatch::new(name, Strategy::QuotedName, whole.as_str())
                    .with_position(whole.start(), whole.end()),
            )
        })
    }
}

impl Default for ContractorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ContractorExtractor {
    type Output = String;

    fn matchers(&self) -> &[Matcher<Self, Self::Output>] {
        Self::MATCHERS
    }
}

/// Extract the contractor from invoice text.
pub fn extract_contractor(text: &str) -> Option<ExtractionMatch<String>> {
    ContractorExtractor::new().extract(&Document::new(text, ""))
}

/// Trim, drop one trailing comma, then drop a surrounding pair of quotes.
pub fn normalize_contractor(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed).trim();

    let mut chars = trimmed.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if QUOTES.contains(&first) && QUOTES.contains(&last) => {
            chars.as_str().trim().to_string()
        }
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_contractor() {
        assert_eq!(normalize_contractor("  ООО «Ромашка», "), "ООО «Ромашка»");
        assert_eq!(normalize_contractor("«Ромашка плюс»"), "Ромашка плюс");
        assert_eq!(normalize_contractor("\"Вектор\","), "Вектор");
        assert_eq!(normalize_contractor("\""), "\"");
    }

    #[test]
    fn test_seller_label() {
        let text = "Счет-фактура № 1\nПродавец: ООО \"Ромашка\",\nИНН 7701234567";
        let m = extract_contractor(text).unwrap();
        assert_eq!(m.value, "ООО \"Ромашка\"");
        assert_eq!(m.strategy, Strategy::SellerLabel);
        let (start, end) = m.position.unwrap();
        assert_eq!(&text[start..end], "ООО \"Ромашка\",");
    }

    #[test]
    fn test_label_without_colon() {
        let m = extract_contractor("Поставщик АО Вектор-Строй").unwrap();
        assert_eq!(m.value, "АО Вектор-Строй");
    }

    #[test]
    fn test_other_party_lines_skipped() {
        let text = "Грузоотправитель и Продавец: он же\nПокупатель: ИП Иванов\nПродавец: ПАО Северсталь";
        let m = extract_contractor(text).unwrap();
        assert_eq!(m.value, "ПАО Северсталь");
    }

    #[test]
    fn test_legal_entity_fallback() {
        let text = "Исполнитель\nООО «Техснаб», 160000 г. Вологда";
        let m = extract_contractor(text).unwrap();
        assert_eq!(m.value, "ООО «Техснаб»");
        assert_eq!(m.strategy, Strategy::LegalEntity);
    }

    #[test]
    fn test_legal_entity_after_rejected_one() {
        let m = extract_contractor("ИП А\nООО «Техснаб»").unwrap();
        assert_eq!(m.value, "ООО «Техснаб»");
        assert_eq!(m.strategy, Strategy::LegalEntity);
    }

    #[test]
    fn test_legal_entity_needs_standalone_token() {
        // "АО" inside a word is not a legal form.
        assert!(extract_contractor("САОРИ 12345").is_none());
    }

    #[test]
    fn test_quoted_fallback() {
        let m = extract_contractor("Исполнитель «Газпром межрегионгаз»").unwrap();
        assert_eq!(m.value, "Газпром межрегионгаз");
        assert_eq!(m.strategy, Strategy::QuotedName);
    }

    #[test]
    fn test_short_candidates_rejected() {
        assert!(extract_contractor("Продавец: ИП А").is_none());

        let relaxed = ContractorExtractor::new().with_min_len(3);
        let m = relaxed.extract(&Document::new("Продавец: Лист", "")).unwrap();
        assert_eq!(m.value, "Лист");
    }

    #[test]
    fn test_nothing_found() {
        assert!(extract_contractor("").is_none());
    }
}
