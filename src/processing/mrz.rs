use chrono::{Datelike, Local};
use log::{debug, info, warn};

use crate::models::{Gender, IdentityRecord, LinePair, NameConfusion, ZoneChecks, FILLER};
use crate::processing::checksum;
use crate::processing::name_recovery::NameRecovery;
use crate::utils::PassportError;

/// Result of decoding a two-line zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedZone {
    pub record: IdentityRecord,
    pub checks: ZoneChecks,
    /// True when the name split came from [`NameRecovery`].
    pub name_recovered: bool,
}

/// Decodes a TD3 (passport) MRZ into an [`IdentityRecord`].
///
/// Line 1: type (1-2), issuing state (3-5), names (6-44).
/// Line 2: document number (1-9) + check, nationality (11-13), birth date (14-19)
/// + check, sex (21), expiry (22-27) + check, optional data (29-42) + check,
/// composite check (44).
#[derive(Debug, Clone)]
pub struct ZoneDecoder {
    confusion: NameConfusion,
    recovery: NameRecovery,
    reference_year: Option<i32>,
}

impl ZoneDecoder {
    pub fn new(confusion: NameConfusion) -> Self {
        ZoneDecoder {
            recovery: NameRecovery::new(confusion.clone()),
            confusion,
            reference_year: None,
        }
    }

    /// Fixes the calendar year used for the two-digit century pivot.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn decode_lines(&self, lines: &[String]) -> Result<DecodedZone, PassportError> {
        let pair = LinePair::from_lines(lines)?;
        self.decode(&pair)
    }

    /// Field content problems never fail here; they surface in [`ZoneChecks`]
    /// and in validation. Only a malformed line pair is rejected.
    pub fn decode(&self, lines: &LinePair) -> Result<DecodedZone, PassportError> {
        let line1: Vec<char> = lines.line1().chars().collect();
        let line2: Vec<char> = lines.line2().chars().collect();

        let document_type = letter_field(&line1[0..2], "document type");
        let issuing_country = letter_field(&line1[2..5], "issuing country");
        let nationality = letter_field(&line2[10..13], "nationality");

        let mut checks = ZoneChecks::default();

        let raw_number: String = line2[0..9].iter().collect();
        let number_check = line2[9];
        let document_number = if checksum::verify(&raw_number, number_check) {
            checks.document_number = true;
            raw_number
        } else {
            match checksum::correct_document_number(&raw_number, number_check) {
                Some(corrected) => {
                    info!(
                        "Corrected document number {} -> {} using check digit {}",
                        raw_number, corrected, number_check
                    );
                    checks.document_number = true;
                    checks.document_number_corrected = true;
                    corrected
                }
                None => {
                    warn!(
                        "Document number {} does not match check digit {}, keeping as read",
                        raw_number, number_check
                    );
                    raw_number
                }
            }
        };

        let birth: String = line2[13..19].iter().collect();
        let expiry: String = line2[21..27].iter().collect();
        let optional: String = line2[28..42].iter().collect();
        checks.date_of_birth = checksum::verify(&birth, line2[19]);
        checks.expiry_date = checksum::verify(&expiry, line2[27]);
        checks.personal_number = if optional.chars().all(|c| c == FILLER) {
            line2[42] == FILLER || line2[42] == '0'
        } else {
            checksum::verify(&optional, line2[42])
        };
        let composite: String = line2[0..10]
            .iter()
            .chain(&line2[13..20])
            .chain(&line2[21..43])
            .collect();
        checks.composite = checksum::verify(&composite, line2[43]);
        if !checks.all_passed() {
            warn!("MRZ check digit mismatch: {:?}", checks);
        }

        let (mut surname, mut given_names) = self.split_names(&line1[5..]);
        let mut name_recovered = false;
        if surname == given_names {
            debug!("Degenerate name split ({}), trying name recovery", surname);
            if let Some(recovered) = self.recovery.recover(lines.line1()) {
                surname = recovered.surname;
                given_names = recovered.given_names;
                name_recovered = true;
            }
        }

        let current_year = self.reference_year.unwrap_or_else(|| Local::now().year());
        let record = IdentityRecord {
            document_type,
            full_name: IdentityRecord::compose_full_name(&given_names, &surname),
            surname,
            given_names,
            document_number: document_number.trim_end_matches(FILLER).replace(FILLER, ""),
            nationality,
            issuing_country,
            date_of_birth: convert_mrz_date(&birth, current_year % 100),
            expiry_date: convert_mrz_date(&expiry, current_year % 100),
            gender: Gender::from_mrz_code(line2[20]),
            personal_number: optional.trim_end_matches(FILLER).replace(FILLER, " "),
            birth_place: String::new(),
            place_of_issue: String::new(),
            issue_date: String::new(),
            raw_line1: lines.line1().to_string(),
            raw_line2: lines.line2().to_string(),
        };

        Ok(DecodedZone {
            record,
            checks,
            name_recovered,
        })
    }

    /// Splits the name field on its first `<<`. Without a separator both parts
    /// carry the whole field, which the caller treats as a degenerate split.
    fn split_names(&self, field: &[char]) -> (String, String) {
        let field: String = field.iter().collect();
        let field = field.trim_end_matches(FILLER);
        match field.split_once("<<") {
            Some((surname, given)) => {
                let surname = join_tokens(surname.split(FILLER));
                let given = given
                    .split(FILLER)
                    .filter(|token| !token.is_empty())
                    .filter(|token| !self.is_filler_noise(token))
                    .collect::<Vec<_>>()
                    .join(" ");
                (surname, given)
            }
            None => {
                let whole = join_tokens(field.split(FILLER));
                (whole.clone(), whole)
            }
        }
    }

    /// A given-name token made only of filler misreadings, or containing three
    /// or more of them in a row, is recognition noise.
    fn is_filler_noise(&self, token: &str) -> bool {
        if token.chars().all(|c| self.confusion.is_substitute(c)) {
            return true;
        }
        let mut run = 0;
        for c in token.chars() {
            if self.confusion.is_substitute(c) {
                run += 1;
                if run >= 3 {
                    return true;
                }
            } else {
                run = 0;
            }
        }
        false
    }
}

impl Default for ZoneDecoder {
    fn default() -> Self {
        Self::new(NameConfusion::default())
    }
}

/// Converts YYMMDD to DD/MM/YYYY.
///
/// `yy <= current_yy + 10` is read as 20yy, anything later as 19yy. This
/// misplaces documents more than 90 years old. Non-numeric input is returned
/// unchanged so the validator reports it as unparseable.
pub fn convert_mrz_date(yymmdd: &str, current_two_digit_year: i32) -> String {
    if yymmdd.len() != 6 || !yymmdd.chars().all(|c| c.is_ascii_digit()) {
        return yymmdd.to_string();
    }
    let (yy, mm, dd) = (&yymmdd[0..2], &yymmdd[2..4], &yymmdd[4..6]);
    let two_digit: i32 = yy.parse().unwrap_or(0);
    let year = if two_digit <= current_two_digit_year + 10 {
        2000 + two_digit
    } else {
        1900 + two_digit
    };
    format!("{}/{}/{:04}", dd, mm, year)
}

fn strip_filler(chars: &[char]) -> String {
    chars.iter().filter(|c| **c != FILLER).collect()
}

/// Reads a letters-only field, undoing the 0/O and 1/I confusions. Anything
/// else is kept as read and left for the validator to judge.
fn letter_field(chars: &[char], field: &str) -> String {
    let read = strip_filler(chars);
    let fixed: String = read
        .chars()
        .map(|c| match c {
            '0' => 'O',
            '1' => 'I',
            other => other,
        })
        .collect();
    if fixed != read {
        info!("Corrected {} {} -> {}", field, read, fixed);
    }
    if fixed.chars().any(|c| !c.is_ascii_uppercase()) {
        warn!("{} {} contains non-letter characters", field, fixed);
    }
    fixed
}

fn join_tokens<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
