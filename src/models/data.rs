use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::PassportError;

/// Width of each line in a TD3 (passport) machine readable zone.
pub const MRZ_LINE_LENGTH: usize = 44;

/// Padding character used inside MRZ fields.
pub const FILLER: char = '<';

/// Returns true for characters allowed in an MRZ line (A-Z, 0-9 and the filler).
pub fn is_mrz_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == FILLER
}

/// Output of a single OCR engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScanResult {
    pub text: String,
    /// Mean recognition confidence, 0-100.
    pub confidence: f32,
}

/// The two 44-character lines of a passport MRZ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePair {
    line1: String,
    line2: String,
}

impl LinePair {
    pub fn new(line1: impl Into<String>, line2: impl Into<String>) -> Result<Self, PassportError> {
        let line1 = line1.into();
        let line2 = line2.into();
        for (index, line) in [&line1, &line2].iter().enumerate() {
            if line.chars().count() != MRZ_LINE_LENGTH {
                return Err(PassportError::MrzParsingError(format!(
                    "MRZ line {} has {} characters, expected {}",
                    index + 1,
                    line.chars().count(),
                    MRZ_LINE_LENGTH
                )));
            }
            if let Some(bad) = line.chars().find(|c| !is_mrz_char(*c)) {
                return Err(PassportError::MrzParsingError(format!(
                    "MRZ line {} contains invalid character '{}'",
                    index + 1,
                    bad
                )));
            }
        }
        Ok(LinePair { line1, line2 })
    }

    /// Builds a pair from detector output; fewer than two lines is a parse failure.
    pub fn from_lines(lines: &[String]) -> Result<Self, PassportError> {
        match lines {
            [first, second, ..] => Self::new(first.clone(), second.clone()),
            _ => Err(PassportError::MrzParsingError(format!(
                "Expected two MRZ lines, got {}",
                lines.len()
            ))),
        }
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Unspecified,
}

impl Gender {
    pub fn from_mrz_code(code: char) -> Self {
        match code {
            'M' => Gender::Male,
            'F' => Gender::Female,
            _ => Gender::Unspecified,
        }
    }
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Unspecified
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
            Gender::Unspecified => write!(f, "Unspecified"),
        }
    }
}

/// Structured identity data read from one passport image.
///
/// Zone fields are filled once by the decoder. `birth_place`, `place_of_issue`
/// and `issue_date` start empty and are filled from the visual zone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub document_type: String,
    pub surname: String,
    pub given_names: String,
    pub full_name: String,
    pub document_number: String,
    pub nationality: String,
    pub issuing_country: String,
    /// DD/MM/YYYY
    pub date_of_birth: String,
    /// DD/MM/YYYY
    pub expiry_date: String,
    pub gender: Gender,
    pub personal_number: String,
    pub birth_place: String,
    pub place_of_issue: String,
    pub issue_date: String,
    pub raw_line1: String,
    pub raw_line2: String,
}

impl IdentityRecord {
    pub fn compose_full_name(given_names: &str, surname: &str) -> String {
        format!("{} {}", given_names.trim(), surname.trim())
            .trim()
            .to_string()
    }
}

/// Pass/fail state of every check digit in line 2.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneChecks {
    pub document_number: bool,
    /// Set when the document number only verified after O/0, I/1 correction.
    pub document_number_corrected: bool,
    pub date_of_birth: bool,
    pub expiry_date: bool,
    pub personal_number: bool,
    pub composite: bool,
}

impl ZoneChecks {
    pub fn all_passed(&self) -> bool {
        self.document_number
            && self.date_of_birth
            && self.expiry_date
            && self.personal_number
            && self.composite
    }
}

/// Itemised result of the business rules. `valid` is false as soon as one
/// error is recorded; warnings never affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn new() -> Self {
        ValidationOutcome {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

impl Default for ValidationOutcome {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_pair_rejects_short_line() {
        let short = "P<UTOERIKSSON<<ANNA<MARIA";
        let full = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";
        match LinePair::new(short, full) {
            Err(PassportError::MrzParsingError(msg)) => assert!(msg.contains("line 1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_line_pair_rejects_lowercase() {
        let line = "p<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
        let full = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";
        assert!(LinePair::new(line, full).is_err());
    }

    #[test]
    fn test_line_pair_needs_two_lines() {
        let lines = vec!["P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<".to_string()];
        assert!(matches!(
            LinePair::from_lines(&lines),
            Err(PassportError::MrzParsingError(_))
        ));
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_mrz_code('M'), Gender::Male);
        assert_eq!(Gender::from_mrz_code('F'), Gender::Female);
        assert_eq!(Gender::from_mrz_code('<'), Gender::Unspecified);
        assert_eq!(Gender::from_mrz_code('X'), Gender::Unspecified);
    }

    #[test]
    fn test_outcome_tracks_validity() {
        let mut outcome = ValidationOutcome::new();
        outcome.warning("Gender is unspecified");
        assert!(outcome.valid);
        outcome.error("Passport has expired");
        assert!(!outcome.valid);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_record_serializes_with_camel_case_names() {
        let record = IdentityRecord {
            given_names: "ANNA MARIA".to_string(),
            place_of_issue: String::new(),
            ..IdentityRecord::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["givenNames"], "ANNA MARIA");
        assert_eq!(json["placeOfIssue"], "");
        assert_eq!(json["gender"], "Unspecified");
    }
}
