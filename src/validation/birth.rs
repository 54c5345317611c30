use chrono::NaiveDate;

use crate::models::{IdentityRecord, ValidationOutcome, ValidationRules};
use crate::validation::dates::{full_years_between, parse_record_date};

pub struct BirthDateValidator;

impl BirthDateValidator {
    pub fn validate(
        record: &IdentityRecord,
        rules: &ValidationRules,
        today: NaiveDate,
        outcome: &mut ValidationOutcome,
    ) {
        if record.date_of_birth.trim().is_empty() {
            outcome.error("Date of birth is missing");
            return;
        }
        let birth = match parse_record_date(&record.date_of_birth) {
            Some(date) => date,
            None => {
                outcome.error(format!("Invalid date of birth: {}", record.date_of_birth));
                return;
            }
        };

        if birth > today {
            outcome.error(format!("Date of birth {} is in the future", record.date_of_birth));
            return;
        }

        let age = full_years_between(birth, today);
        if age > rules.max_age_years as i32 {
            outcome.error(format!(
                "Holder age of {} years exceeds {} years",
                age, rules.max_age_years
            ));
        } else if age < rules.min_age_years as i32 {
            outcome.warning(format!(
                "Holder is younger than {} year(s)",
                rules.min_age_years
            ));
        }
    }
}
