use chrono::NaiveDate;

use crate::models::{IdentityRecord, ValidationOutcome, ValidationRules};
use crate::validation::dates::parse_record_date;

pub struct ExpiryValidator;

impl ExpiryValidator {
    pub fn validate(
        record: &IdentityRecord,
        rules: &ValidationRules,
        today: NaiveDate,
        outcome: &mut ValidationOutcome,
    ) {
        if record.expiry_date.trim().is_empty() {
            outcome.error("Expiry date is missing");
            return;
        }
        let expiry = match parse_record_date(&record.expiry_date) {
            Some(date) => date,
            None => {
                outcome.error(format!("Invalid expiry date: {}", record.expiry_date));
                return;
            }
        };

        // Check if passport is expired
        if expiry < today {
            outcome.error(format!("Passport has expired on {}", record.expiry_date));
            return;
        }

        let days_left = (expiry - today).num_days();
        if days_left <= rules.expiry_warning_days {
            outcome.warning(format!("Passport expires in {} day(s)", days_left));
        }
    }
}
