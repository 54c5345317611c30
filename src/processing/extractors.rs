// Label-driven extraction of fields that only exist in the printed part of the page.
use log::debug;
use regex::Regex;

use crate::models::LabelTables;
use crate::utils::PassportError;

/// How many non-blank lines below a bare label are searched for its value.
const VALUE_LOOKAHEAD: usize = 2;

const SEPARATORS: &[char] = &[':', ';', '/', '|', '-', '.', ',', '\\'];

/// Fields found in the visual zone. `None` means the label was not found,
/// which is an expected outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisualFields {
    pub birth_place: Option<String>,
    pub place_of_issue: Option<String>,
    /// DD/MM/YYYY
    pub issue_date: Option<String>,
}

pub struct VisualFieldScanner {
    tables: LabelTables,
    numeric_date: Regex,
    month_date: Regex,
}

impl VisualFieldScanner {
    pub fn new(tables: LabelTables) -> Result<Self, PassportError> {
        let numeric_date = Regex::new(r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4})\b")
            .map_err(|e| PassportError::ConfigError(format!("Invalid date pattern: {}", e)))?;
        let month_date =
            Regex::new(r"\b(\d{1,2})\s*(\p{L}{3,9})\.?(?:\s*/\s*\p{L}{3,9}\.?)?\s*(\d{4})\b")
                .map_err(|e| PassportError::ConfigError(format!("Invalid date pattern: {}", e)))?;
        Ok(VisualFieldScanner {
            tables,
            numeric_date,
            month_date,
        })
    }

    pub fn scan(&self, text: &str) -> VisualFields {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        let fields = VisualFields {
            birth_place: self.find_labelled(&lines, &self.tables.birth_place, |v| self.place_value(v)),
            place_of_issue: self.find_labelled(&lines, &self.tables.place_of_issue, |v| self.place_value(v)),
            issue_date: self.find_labelled(&lines, &self.tables.issue_date, |v| self.extract_date(v)),
        };

        for (name, value) in [
            ("birth place", &fields.birth_place),
            ("place of issue", &fields.place_of_issue),
            ("issue date", &fields.issue_date),
        ] {
            match value {
                Some(value) => debug!("Visual field {}: {}", name, value),
                None => debug!("Visual field {} not found", name),
            }
        }
        fields
    }

    /// Finds a line matching one of `labels` and reads its value from the text
    /// after the label, or failing that from the next lines below it.
    fn find_labelled<F>(&self, lines: &[&str], labels: &[Regex], accept: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (index, line) in lines.iter().enumerate() {
            let label_end = match labels.iter().filter_map(|label| label.find(line)).next() {
                Some(found) => found.end(),
                None => continue,
            };

            let rest = self.strip_leading_labels(&line[label_end..]);
            if is_non_trivial(rest) {
                if let Some(value) = accept(rest) {
                    return Some(value);
                }
            }

            let below = lines
                .iter()
                .skip(index + 1)
                .filter(|candidate| !candidate.is_empty())
                .take(VALUE_LOOKAHEAD);
            for &candidate in below {
                if candidate.contains(':') || self.tables.is_field_label(candidate) {
                    continue;
                }
                if let Some(value) = accept(candidate) {
                    return Some(value);
                }
            }
        }
        None
    }

    /// Skips separators and further labels that directly follow a label, as in
    /// "Place of birth / Lieu de naissance  STOCKHOLM".
    fn strip_leading_labels<'a>(&self, text: &'a str) -> &'a str {
        let mut rest = text.trim_start_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c));
        loop {
            let next = self
                .tables
                .birth_place
                .iter()
                .chain(&self.tables.place_of_issue)
                .chain(&self.tables.issue_date)
                .chain(&self.tables.other_labels)
                .filter_map(|label| label.find(rest))
                .find(|found| found.start() == 0);
            match next {
                Some(found) if found.end() > 0 => {
                    rest = rest[found.end()..]
                        .trim_start_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c));
                }
                _ => return rest,
            }
        }
    }

    fn place_value(&self, text: &str) -> Option<String> {
        let value = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_matches(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
            .to_string();
        if value.chars().filter(|c| c.is_alphabetic()).count() < 2 {
            return None;
        }
        Some(value)
    }

    /// Reads the first date in `text` as DD/MM/YYYY. Accepts DD/MM/YYYY,
    /// DD-MM-YYYY, DD.MM.YYYY and DD MON YYYY (including bilingual "MAR/MARS").
    pub fn extract_date(&self, text: &str) -> Option<String> {
        for caps in self.numeric_date.captures_iter(text) {
            let (day, month) = match (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
                (Ok(day), Ok(month)) => (day, month),
                _ => continue,
            };
            if let Some(date) = format_date(day, month, &caps[3]) {
                return Some(date);
            }
        }
        for caps in self.month_date.captures_iter(text) {
            let day: u32 = match caps[1].parse() {
                Ok(day) => day,
                Err(_) => continue,
            };
            if let Some(month) = self.tables.month_number(&caps[2]) {
                if let Some(date) = format_date(day, month, &caps[3]) {
                    return Some(date);
                }
            }
        }
        None
    }
}

fn is_non_trivial(text: &str) -> bool {
    text.chars().filter(|c| c.is_alphanumeric()).count() >= 2
}

fn format_date(day: u32, month: u32, year: &str) -> Option<String> {
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{:02}/{:02}/{}", day, month, year))
}
