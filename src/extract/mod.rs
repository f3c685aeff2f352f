//! Schema-driven structured extraction.
//!
//! Two-tier strategy: an AI-backed extraction call when a provider
//! credential is configured, and a deterministic pattern fallback
//! otherwise. Extraction always produces a record; provider
//! unavailability is never an error at this level.

mod patterns;
mod schema;

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use tracing::{debug, warn};

use crate::llm::LlmClient;
use crate::models::{ExtractionMethod, ExtractionRecord};

pub use patterns::PatternExtractor;
pub use schema::{FieldKind, Schema, SchemaField};

/// Converts free-form document text into typed records.
pub struct SchemaExtractor {
    llm: Option<LlmClient>,
    patterns: PatternExtractor,
}

impl SchemaExtractor {
    /// Build an extractor; `llm` is `None` when no credential is
    /// configured, which pins every record to the pattern path.
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self {
            llm,
            patterns: PatternExtractor::new(),
        }
    }

    /// Extractor that never touches the AI path.
    pub fn pattern_only() -> Self {
        Self::new(None)
    }

    /// True when the AI path is configured.
    pub fn ai_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Produce one record for one document.
    ///
    /// Empty input text is a normal outcome: every field comes back
    /// null and every required field is flagged missing.
    pub async fn extract(
        &self,
        source_path: &str,
        text: &str,
        schema: &Schema,
    ) -> ExtractionRecord {
        let (fields, method) = match (&self.llm, text.trim().is_empty()) {
            // Nothing to send; skip the provider round-trip.
            (_, true) => (self.pattern_fields("", schema), ExtractionMethod::Pattern),
            (Some(client), false) => match client.extract_fields(text, schema).await {
                Ok(fields) => (fields, ExtractionMethod::Ai),
                Err(e) => {
                    warn!(
                        "AI extraction failed for {} ({}), falling back to patterns",
                        source_path, e
                    );
                    (self.pattern_fields(text, schema), ExtractionMethod::Pattern)
                }
            },
            (None, false) => (self.pattern_fields(text, schema), ExtractionMethod::Pattern),
        };

        let missing_required_fields: BTreeSet<String> = schema
            .required()
            .iter()
            .filter(|name| {
                fields
                    .get(**name)
                    .and_then(|v| v.as_deref())
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true)
            })
            .map(|name| name.to_string())
            .collect();

        if !missing_required_fields.is_empty() {
            debug!(
                "{}: {} required field(s) missing",
                source_path,
                missing_required_fields.len()
            );
        }

        ExtractionRecord {
            source_path: source_path.to_string(),
            schema_name: schema.name().to_string(),
            extraction_timestamp: Utc::now(),
            extraction_method: method,
            fields,
            missing_required_fields,
        }
    }

    fn pattern_fields(&self, text: &str, schema: &Schema) -> BTreeMap<String, Option<String>> {
        schema
            .fields()
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    self.patterns.extract(field.kind, text),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_credential_always_uses_pattern_path() {
        let extractor = SchemaExtractor::pattern_only();
        let schema = Schema::by_name("client").unwrap();
        let text = "Case of Maria Lopez, A12345678, filed 03/15/2023.";

        let record = extractor.extract("/docs/a.pdf", text, schema).await;
        assert_eq!(record.extraction_method, ExtractionMethod::Pattern);
        assert_eq!(record.fields["a_number"].as_deref(), Some("A12345678"));
        assert_eq!(record.fields["dob"].as_deref(), Some("03/15/2023"));
    }

    #[tokio::test]
    async fn empty_text_yields_all_null_record() {
        let extractor = SchemaExtractor::pattern_only();
        let schema = Schema::by_name("client").unwrap();

        let record = extractor.extract("/docs/scan.pdf", "", schema).await;
        assert_eq!(record.extraction_method, ExtractionMethod::Pattern);
        assert!(record.fields.values().all(|v| v.is_none()));
        let expected: BTreeSet<String> = schema
            .required()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(record.missing_required_fields, expected);
    }

    #[tokio::test]
    async fn unrecognizable_text_flags_full_required_set() {
        let extractor = SchemaExtractor::pattern_only();
        let schema = Schema::by_name("client").unwrap();
        // No dates, identifiers, emails, phones or capitalized name pairs.
        let text = "lorem ipsum dolor sit amet consectetur adipiscing elit";

        let record = extractor.extract("/docs/b.pdf", text, schema).await;
        assert!(record
            .fields
            .values()
            .all(|v| v.is_none()));
        let expected: BTreeSet<String> = schema
            .required()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(record.missing_required_fields, expected);
    }

    #[tokio::test]
    async fn record_carries_every_schema_field() {
        let extractor = SchemaExtractor::pattern_only();
        let schema = Schema::by_name("legal").unwrap();
        let record = extractor.extract("/docs/memo.pdf", "some text", schema).await;
        assert_eq!(record.fields.len(), schema.fields().len());
        assert_eq!(record.schema_name, "legal");
    }
}
