pub mod birth;
pub mod confidence;
pub mod dates;
pub mod expiry;
pub mod format;

pub use birth::BirthDateValidator;
pub use confidence::ConfidenceValidator;
pub use expiry::ExpiryValidator;
pub use format::FormatValidator;

use chrono::{Local, NaiveDate};
use log::info;
use regex::Regex;

use crate::models::{IdentityRecord, ValidationOutcome, ValidationRules};
use crate::utils::PassportError;

/// Applies the business rules to a decoded record. Never fails: problems are
/// reported as errors (blocking) and warnings in the outcome.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: ValidationRules,
    document_number_format: Regex,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Result<Self, PassportError> {
        let document_number_format = Regex::new(&rules.document_number_format).map_err(|e| {
            PassportError::ConfigError(format!(
                "Invalid document number format '{}': {}",
                rules.document_number_format, e
            ))
        })?;
        Ok(Validator {
            rules,
            document_number_format,
        })
    }

    pub fn validate(&self, record: &IdentityRecord, confidence: Option<f32>) -> ValidationOutcome {
        self.validate_at(record, confidence, Local::now().date_naive())
    }

    /// Same as [`Validator::validate`] with an explicit evaluation date.
    pub fn validate_at(
        &self,
        record: &IdentityRecord,
        confidence: Option<f32>,
        today: NaiveDate,
    ) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::new();

        FormatValidator::validate(record, &self.document_number_format, &mut outcome);
        BirthDateValidator::validate(record, &self.rules, today, &mut outcome);
        ExpiryValidator::validate(record, &self.rules, today, &mut outcome);
        ConfidenceValidator::validate(confidence, &self.rules, &mut outcome);

        info!(
            "Validation of {}: {} error(s), {} warning(s)",
            record.document_number,
            outcome.errors.len(),
            outcome.warnings.len()
        );
        outcome
    }
}
