//! Deterministic pattern-based field extraction.
//!
//! The fallback path when AI extraction is unavailable or exhausted:
//! each field kind maps to a text pattern, and the first match in the
//! document wins.

use regex::Regex;

use super::schema::FieldKind;

/// Compiled patterns for the fallback extractor.
pub struct PatternExtractor {
    date: Regex,
    a_number: Regex,
    generic_id: Regex,
    email: Regex,
    phone: Regex,
    name: Regex,
}

impl Default for PatternExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternExtractor {
    pub fn new() -> Self {
        Self {
            // Numeric dates: 12/31/2023, 31-12-23, 2023-12-31.
            date: Regex::new(
                r"\b(?:\d{1,2}[-/]\d{1,2}[-/]\d{2,4}|\d{4}[-/]\d{1,2}[-/]\d{1,2})\b",
            )
            .expect("invalid date pattern"),
            // Alien registration numbers: A12345678, A-123456789.
            a_number: Regex::new(r"\bA[\s-]?\d{8,9}\b").expect("invalid a-number pattern"),
            // Receipt-style identifiers: MSC2190012345, EAC-12-345-67890.
            generic_id: Regex::new(r"\b[A-Z]{2,4}[-]?\d{2}[-]?\d{3}[-]?\d{5}\b|\b[A-Z]{2,4}\d{6,12}\b")
                .expect("invalid identifier pattern"),
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("invalid email pattern"),
            phone: Regex::new(r"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
                .expect("invalid phone pattern"),
            // Two or three capitalized words in a row.
            name: Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+(?: [A-Z][a-z]+)?\b")
                .expect("invalid name pattern"),
        }
    }

    /// First match for a field of the given kind, or `None`.
    ///
    /// Free-text fields have no deterministic pattern and always come
    /// back `None` on this path.
    pub fn extract(&self, kind: FieldKind, text: &str) -> Option<String> {
        let matched = match kind {
            FieldKind::Date => self.date.find(text),
            FieldKind::Identifier => self.a_number.find(text).or_else(|| self.generic_id.find(text)),
            FieldKind::Email => self.email.find(text),
            FieldKind::Phone => self.phone.find(text),
            FieldKind::Name => self.name.find(text),
            FieldKind::FreeText => None,
        };
        matched.map(|m| m.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dates() {
        let patterns = PatternExtractor::new();
        assert_eq!(
            patterns.extract(FieldKind::Date, "Filed on 03/15/2023 in court."),
            Some("03/15/2023".to_string())
        );
        assert_eq!(
            patterns.extract(FieldKind::Date, "DOB: 1990-01-07"),
            Some("1990-01-07".to_string())
        );
        assert_eq!(patterns.extract(FieldKind::Date, "no dates here"), None);
    }

    #[test]
    fn extracts_a_numbers() {
        let patterns = PatternExtractor::new();
        assert_eq!(
            patterns.extract(FieldKind::Identifier, "Alien number A12345678 on file"),
            Some("A12345678".to_string())
        );
        assert_eq!(
            patterns.extract(FieldKind::Identifier, "A-123456789"),
            Some("A-123456789".to_string())
        );
    }

    #[test]
    fn extracts_receipt_numbers() {
        let patterns = PatternExtractor::new();
        assert_eq!(
            patterns.extract(FieldKind::Identifier, "Receipt MSC2190012345 received"),
            Some("MSC2190012345".to_string())
        );
    }

    #[test]
    fn extracts_contact_info() {
        let patterns = PatternExtractor::new();
        assert_eq!(
            patterns.extract(FieldKind::Email, "Contact maria@example.org today"),
            Some("maria@example.org".to_string())
        );
        assert_eq!(
            patterns.extract(FieldKind::Phone, "Call (555) 123-4567 now"),
            Some("(555) 123-4567".to_string())
        );
    }

    #[test]
    fn extracts_names() {
        let patterns = PatternExtractor::new();
        assert_eq!(
            patterns.extract(FieldKind::Name, "submitted by Maria Lopez Garcia on behalf"),
            Some("Maria Lopez Garcia".to_string())
        );
    }

    #[test]
    fn free_text_has_no_pattern() {
        let patterns = PatternExtractor::new();
        assert_eq!(
            patterns.extract(FieldKind::FreeText, "anything at all"),
            None
        );
    }

    #[test]
    fn empty_text_matches_nothing() {
        let patterns = PatternExtractor::new();
        for kind in [
            FieldKind::Date,
            FieldKind::Identifier,
            FieldKind::Email,
            FieldKind::Phone,
            FieldKind::Name,
            FieldKind::FreeText,
        ] {
            assert_eq!(patterns.extract(kind, ""), None);
        }
    }
}
