use regex::Regex;

use crate::models::{Gender, IdentityRecord, ValidationOutcome};

pub struct FormatValidator;

impl FormatValidator {
    pub fn validate(record: &IdentityRecord, document_number_format: &Regex, outcome: &mut ValidationOutcome) {
        // Check that required fields are present
        if record.document_number.trim().is_empty() {
            outcome.error("Document number is missing");
        } else if !document_number_format.is_match(&record.document_number) {
            outcome.error(format!(
                "Document number '{}' does not match the expected format",
                record.document_number
            ));
        }

        if record.surname.trim().is_empty() {
            outcome.error("Surname is missing");
        }

        if record.given_names.trim().is_empty() {
            outcome.error("Given names are missing");
        }

        if record.nationality.trim().is_empty() {
            outcome.error("Nationality is missing");
        }

        if record.gender == Gender::Unspecified {
            outcome.warning("Gender is unspecified");
        }
    }
}
