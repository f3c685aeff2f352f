//! Built-in extraction schemas.
//!
//! A schema is read-only configuration: a named set of fields with
//! extraction hints plus the subset of fields a complete record must
//! carry. Adding a schema is a data change, not a code change.

/// What kind of value a field holds; drives the pattern fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Date,
    Identifier,
    Email,
    Phone,
    Name,
    FreeText,
}

/// One field of a schema.
#[derive(Debug, Clone, Copy)]
pub struct SchemaField {
    pub name: &'static str,
    /// Hint passed to the AI extractor, describing what to look for.
    pub hint: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, hint: &'static str, kind: FieldKind) -> SchemaField {
    SchemaField { name, hint, kind }
}

/// A named, immutable extraction schema.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    name: &'static str,
    description: &'static str,
    fields: &'static [SchemaField],
    required: &'static [&'static str],
}

impl Schema {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn fields(&self) -> &'static [SchemaField] {
        self.fields
    }

    pub fn required(&self) -> &'static [&'static str] {
        self.required
    }

    /// All built-in schemas.
    pub fn builtin() -> &'static [Schema] {
        &[CLIENT, IMMIGRATION, LEGAL]
    }

    /// Look up a built-in schema by name.
    pub fn by_name(name: &str) -> Option<&'static Schema> {
        Self::builtin().iter().find(|s| s.name == name)
    }
}

/// Client case details, focused on information relevant for
/// prosecutorial discretion requests.
const CLIENT: Schema = Schema {
    name: "client",
    description: "Client case details for immigration casework",
    fields: &[
        field("full_name", "Client's full legal name", FieldKind::Name),
        field("dob", "Date of birth (YYYY-MM-DD)", FieldKind::Date),
        field("country_of_origin", "Country of origin", FieldKind::FreeText),
        field(
            "immigration_status",
            "Current immigration status",
            FieldKind::FreeText,
        ),
        field(
            "a_number",
            "Alien registration number (e.g., A12345678)",
            FieldKind::Identifier,
        ),
        field("date_of_entry", "Date entered US (YYYY-MM-DD)", FieldKind::Date),
        field(
            "case_type",
            "Type of case (e.g., asylum, removal, PD request)",
            FieldKind::FreeText,
        ),
        field("case_number", "Court or agency case number", FieldKind::Identifier),
        field("filing_date", "Date case filed (YYYY-MM-DD)", FieldKind::Date),
        field("court_or_agency", "Court or agency handling the case", FieldKind::FreeText),
        field(
            "next_hearing_date",
            "Next scheduled hearing (YYYY-MM-DD)",
            FieldKind::Date,
        ),
        field("phone", "Client's phone number", FieldKind::Phone),
        field("email", "Client's email address", FieldKind::Email),
    ],
    required: &["full_name", "a_number", "case_type"],
};

/// Immigration forms and notices.
const IMMIGRATION: Schema = Schema {
    name: "immigration",
    description: "Immigration documents (I-130, I-589, notices)",
    fields: &[
        field(
            "document_type",
            "Type of immigration document (e.g., I-130, I-589)",
            FieldKind::FreeText,
        ),
        field("full_name", "Applicant's full name", FieldKind::Name),
        field("dob", "Date of birth (YYYY-MM-DD)", FieldKind::Date),
        field("country_of_birth", "Country of birth", FieldKind::FreeText),
        field("nationality", "Nationality", FieldKind::FreeText),
        field("gender", "Gender as stated on the document", FieldKind::FreeText),
        field(
            "a_number",
            "Alien registration number (e.g., A12345678)",
            FieldKind::Identifier,
        ),
        field("ssn", "Social Security Number if present", FieldKind::Identifier),
        field("address", "Mailing address", FieldKind::FreeText),
        field("phone", "Phone number", FieldKind::Phone),
        field("email", "Email address", FieldKind::Email),
        field("receipt_number", "USCIS receipt number", FieldKind::Identifier),
        field("filing_date", "Date filed (YYYY-MM-DD)", FieldKind::Date),
        field("status", "Current application status", FieldKind::FreeText),
        field(
            "priority_date",
            "Priority date if applicable (YYYY-MM-DD)",
            FieldKind::Date,
        ),
    ],
    required: &["document_type", "full_name", "a_number"],
};

/// Legal memoranda.
const LEGAL: Schema = Schema {
    name: "legal",
    description: "Legal memos and correspondence",
    fields: &[
        field("title", "Title of the memo", FieldKind::FreeText),
        field("date", "Date of memo (YYYY-MM-DD)", FieldKind::Date),
        field("author", "Author's full name", FieldKind::Name),
        field("recipients", "Recipients of the memo", FieldKind::FreeText),
        field("subject", "Subject line", FieldKind::FreeText),
        field("case_identifier", "Case or matter identifier", FieldKind::Identifier),
        field("summary", "Brief summary of the memo content", FieldKind::FreeText),
        field("conclusion", "Conclusion or recommendation", FieldKind::FreeText),
    ],
    required: &["title", "date", "author"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_schemas_resolve_by_name() {
        for schema in Schema::builtin() {
            let found = Schema::by_name(schema.name()).unwrap();
            assert_eq!(found.name(), schema.name());
        }
        assert!(Schema::by_name("nonexistent").is_none());
    }

    #[test]
    fn required_fields_exist_in_field_set() {
        for schema in Schema::builtin() {
            for required in schema.required() {
                assert!(
                    schema.fields().iter().any(|f| f.name == *required),
                    "{}: required field {} not in field set",
                    schema.name(),
                    required
                );
            }
        }
    }

    #[test]
    fn field_names_are_unique() {
        for schema in Schema::builtin() {
            let mut names: Vec<_> = schema.fields().iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.fields().len(), "{}", schema.name());
        }
    }
}
