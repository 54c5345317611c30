use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::PassportError;

/// Thresholds used by the business-rule validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub document_number_format: String,
    /// Expiry this many days away or fewer produces a warning.
    pub expiry_warning_days: i64,
    pub max_age_years: u32,
    pub min_age_years: u32,
    pub confidence_error_below: f32,
    pub confidence_warning_below: f32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            document_number_format: r"^[A-Z0-9]{6,9}$".to_string(),
            expiry_warning_days: 180,
            max_age_years: 120,
            min_age_years: 1,
            confidence_error_below: 50.0,
            confidence_warning_below: 75.0,
        }
    }
}

/// Characters OCR tends to produce in place of the `<` filler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameConfusion {
    pub filler_substitutes: Vec<char>,
}

impl Default for NameConfusion {
    fn default() -> Self {
        NameConfusion {
            filler_substitutes: vec!['K', 'L'],
        }
    }
}

impl NameConfusion {
    /// The filler itself or one of its usual misreadings.
    pub fn is_filler_like(&self, c: char) -> bool {
        c == '<' || self.filler_substitutes.contains(&c)
    }

    pub fn is_substitute(&self, c: char) -> bool {
        self.filler_substitutes.contains(&c)
    }
}

/// Raw (uncompiled) label patterns for the printed part of the page.
/// Extra entries from a config file are appended to the built-in ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelPatterns {
    pub birth_place: Vec<String>,
    pub place_of_issue: Vec<String>,
    pub issue_date: Vec<String>,
    /// Labels of fields this crate does not read from the visual zone. A line
    /// matching one of them is never taken as a value.
    pub other_labels: Vec<String>,
    /// Month abbreviation (upper case) to month number.
    pub months: BTreeMap<String, u32>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LabelPatterns {
    fn default() -> Self {
        let birth_place = strings(&[
            r"(?i)place\s+of\s+birth",
            r"(?i)birth\s*place",
            r"(?i)lieu\s+de\s+naissance",
            r"(?i)lugar\s+de\s+nacimiento",
            r"(?i)geburtsort",
            r"(?i)luogo\s+di\s+nascita",
            r"(?i)local\s+de\s+nascimento",
            r"(?i)naturalidade",
            r"(?i)geboorteplaats",
            r"(?i)miejsce\s+urodzenia",
            r"(?i)f[öo]delseort",
        ]);
        let place_of_issue = strings(&[
            r"(?i)place\s+of\s+issue",
            r"(?i)issuing\s+office",
            r"(?i)lieu\s+de\s+d[ée]livrance",
            r"(?i)lugar\s+de\s+(?:expedici[óo]n|emisi[óo]n)",
            r"(?i)ausstellungsort",
            r"(?i)luogo\s+di\s+rilascio",
            r"(?i)local\s+de\s+emiss[ãa]o",
            r"(?i)plaats\s+van\s+afgifte",
        ]);
        let issue_date = strings(&[
            r"(?i)date\s+of\s+issue",
            r"(?i)issue\s+date",
            r"(?i)date\s+de\s+d[ée]livrance",
            r"(?i)date\s+d'[ée]mission",
            r"(?i)fecha\s+de\s+(?:expedici[óo]n|emisi[óo]n)",
            r"(?i)ausstellungsdatum",
            r"(?i)data\s+di\s+rilascio",
            r"(?i)data\s+de\s+emiss[ãa]o",
            r"(?i)datum\s+van\s+afgifte",
        ]);
        let other_labels = strings(&[
            r"(?i)\bsurname\b",
            r"(?i)given\s+names?",
            r"(?i)\bnationality\b",
            r"(?i)date\s+of\s+birth",
            r"(?i)date\s+of\s+expiry",
            r"(?i)\bsex\b",
            r"(?i)\bauthority\b",
            r"(?i)passport\s+no",
            r"(?i)\btype\b",
            r"(?i)\bsignature\b",
            r"(?i)\bnom\b",
            r"(?i)pr[ée]noms?",
            r"(?i)nationalit[ée]",
            r"(?i)date\s+de\s+naissance",
            r"(?i)date\s+d'expiration",
            r"(?i)\bsexe\b",
            r"(?i)autorit[ée]",
            r"(?i)apellidos?",
            r"(?i)\bnombres?\b",
            r"(?i)nacionalidad",
            r"(?i)fecha\s+de\s+(?:nacimiento|caducidad|vencimiento)",
            r"(?i)\bsexo\b",
            r"(?i)\bautoridad\b",
            r"(?i)\bvornamen?\b",
            r"(?i)staatsangeh[öo]rigkeit",
            r"(?i)geburtsdatum",
            r"(?i)geschlecht",
            r"(?i)g[üu]ltig\s+bis",
            r"(?i)beh[öo]rde",
        ]);

        let months = [
            ("JAN", 1), ("ENE", 1), ("GEN", 1),
            ("FEB", 2), ("FEV", 2), ("FÉV", 2),
            ("MAR", 3), ("MRZ", 3), ("MÄR", 3),
            ("APR", 4), ("AVR", 4), ("ABR", 4),
            ("MAY", 5), ("MAI", 5), ("MAG", 5),
            ("JUN", 6), ("JUIN", 6), ("GIU", 6),
            ("JUL", 7), ("JUIL", 7), ("LUG", 7),
            ("AUG", 8), ("AOU", 8), ("AOÛ", 8), ("AGO", 8),
            ("SEP", 9), ("SET", 9),
            ("OCT", 10), ("OKT", 10), ("OTT", 10), ("OUT", 10),
            ("NOV", 11),
            ("DEC", 12), ("DÉC", 12), ("DEZ", 12), ("DIC", 12),
        ]
        .iter()
        .map(|(name, number)| (name.to_string(), *number))
        .collect();

        LabelPatterns {
            birth_place,
            place_of_issue,
            issue_date,
            other_labels,
            months,
        }
    }
}

/// User supplied additions to [`LabelPatterns`]; every list starts empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelExtensions {
    pub birth_place: Vec<String>,
    pub place_of_issue: Vec<String>,
    pub issue_date: Vec<String>,
    pub other_labels: Vec<String>,
    pub months: BTreeMap<String, u32>,
}

impl LabelPatterns {
    /// Appends `extra` to these patterns; month entries override.
    pub fn extended_with(mut self, extra: &LabelExtensions) -> Self {
        self.birth_place.extend(extra.birth_place.iter().cloned());
        self.place_of_issue.extend(extra.place_of_issue.iter().cloned());
        self.issue_date.extend(extra.issue_date.iter().cloned());
        self.other_labels.extend(extra.other_labels.iter().cloned());
        for (name, number) in &extra.months {
            self.months.insert(name.to_uppercase(), *number);
        }
        self
    }
}

/// Compiled label tables handed to the visual field scanner.
#[derive(Debug, Clone)]
pub struct LabelTables {
    pub birth_place: Vec<Regex>,
    pub place_of_issue: Vec<Regex>,
    pub issue_date: Vec<Regex>,
    pub other_labels: Vec<Regex>,
    pub months: BTreeMap<String, u32>,
}

impl LabelTables {
    pub fn from_patterns(patterns: &LabelPatterns) -> Result<Self, PassportError> {
        for (name, number) in &patterns.months {
            if !(1..=12).contains(number) {
                return Err(PassportError::ConfigError(format!(
                    "Month '{}' maps to {}, expected 1-12",
                    name, number
                )));
            }
        }
        Ok(LabelTables {
            birth_place: compile(&patterns.birth_place)?,
            place_of_issue: compile(&patterns.place_of_issue)?,
            issue_date: compile(&patterns.issue_date)?,
            other_labels: compile(&patterns.other_labels)?,
            months: patterns.months.clone(),
        })
    }

    /// True if the text contains any label this crate knows about.
    pub fn is_field_label(&self, text: &str) -> bool {
        self.birth_place
            .iter()
            .chain(&self.place_of_issue)
            .chain(&self.issue_date)
            .chain(&self.other_labels)
            .any(|pattern| pattern.is_match(text))
    }

    /// Resolves a month word ("MAR", "MARS", "JUILLET", "Dec") to 1-12.
    pub fn month_number(&self, word: &str) -> Option<u32> {
        let upper = word.trim_end_matches('.').to_uppercase();
        if let Some(number) = self.months.get(&upper) {
            return Some(*number);
        }
        for len in [4, 3] {
            let prefix: String = upper.chars().take(len).collect();
            if prefix.chars().count() == len {
                if let Some(number) = self.months.get(&prefix) {
                    return Some(*number);
                }
            }
        }
        None
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, PassportError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|e| {
                PassportError::ConfigError(format!("Invalid label pattern '{}': {}", pattern, e))
            })
        })
        .collect()
}
