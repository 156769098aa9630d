//! Text clean-up applied before field extraction.

use std::borrow::Cow;

use tracing::trace;

/// Pre-normalisation step run over document text before any matcher sees it.
pub trait TextCleanup: Send + Sync {
    /// Return the cleaned text, borrowing when nothing changed.
    fn clean<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Uses the text as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl TextCleanup for Passthrough {
    fn clean<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// Ordered literal substring replacements.
///
/// Meant for patching known mis-decoded glyph sequences in PDF text layers.
/// Replacements are applied in order, each one over the output of the
/// previous one.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    pairs: Vec<(String, String)>,
}

impl ReplacementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a replacement. Empty patterns are ignored.
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        if !from.is_empty() {
            self.pairs.push((from, to.into()));
        }
        self
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for ReplacementTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |table, (from, to)| table.with(from, to))
    }
}

impl TextCleanup for ReplacementTable {
    fn clean<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(text);
        for (from, to) in &self.pairs {
            if out.contains(from.as_str()) {
                trace!("Replacing {:?} with {:?}", from, to);
                out = Cow::Owned(out.replace(from.as_str(), to));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_borrows() {
        assert!(matches!(Passthrough.clean("Счет"), Cow::Borrowed("Счет")));
    }

    #[test]
    fn test_replacements_in_order() {
        let table = ReplacementTable::new().with("Cчет", "Счет").with("Счет", "Счёт");
        assert_eq!(table.clean("Cчет-фактура"), "Счёт-фактура");
    }

    #[test]
    fn test_untouched_text_is_borrowed() {
        let table: ReplacementTable = vec![("x".to_string(), "y".to_string())].into_iter().collect();
        assert!(matches!(table.clean("Итого"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_empty_patterns_dropped() {
        let table = ReplacementTable::new().with("", "x");
        assert!(table.is_empty());
        assert_eq!(table.clean("abc"), "abc");
    }
}
