use log::debug;

use crate::models::NameConfusion;

/// Offset of the name field inside line 1 (after document type and issuing country).
const NAME_ZONE_START: usize = 5;

/// A run closer than this to the start of the name field is treated as part of
/// the surname (LLOYD, LLANOS) rather than the surname/given-name separator.
const MIN_SEPARATOR_OFFSET: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredName {
    pub surname: String,
    pub given_names: String,
}

/// Re-splits the name field when the `<<` separator was misread, looking for the
/// first run of filler-like characters instead.
#[derive(Debug, Clone)]
pub struct NameRecovery {
    confusion: NameConfusion,
}

impl NameRecovery {
    pub fn new(confusion: NameConfusion) -> Self {
        NameRecovery { confusion }
    }

    pub fn recover(&self, line1: &str) -> Option<RecoveredName> {
        let zone: Vec<char> = line1.chars().skip(NAME_ZONE_START).collect();
        let (start, end) = self.find_separator(&zone)?;

        let surname = zone[..start]
            .iter()
            .collect::<String>()
            .split('<')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if surname.is_empty() {
            return None;
        }

        let rest: String = zone[end..].iter().collect();
        let given_names = rest
            .split(|c: char| self.confusion.is_filler_like(c))
            .filter(|token| token.chars().count() >= 2)
            .collect::<Vec<_>>()
            .join(" ");
        if given_names.is_empty() {
            return None;
        }

        debug!(
            "Recovered name split at offset {}: surname={}, given names={}",
            start, surname, given_names
        );
        Some(RecoveredName {
            surname,
            given_names,
        })
    }

    /// First maximal run of two or more filler-like characters starting at or
    /// after `MIN_SEPARATOR_OFFSET`. Returns its [start, end) bounds.
    fn find_separator(&self, zone: &[char]) -> Option<(usize, usize)> {
        let mut i = 0;
        while i < zone.len() {
            if !self.confusion.is_filler_like(zone[i]) {
                i += 1;
                continue;
            }
            let start = i;
            while i < zone.len() && self.confusion.is_filler_like(zone[i]) {
                i += 1;
            }
            if i - start >= 2 && start >= MIN_SEPARATOR_OFFSET {
                return Some((start, i));
            }
        }
        None
    }
}

impl Default for NameRecovery {
    fn default() -> Self {
        Self::new(NameConfusion::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_canonical_line() {
        let recovered = NameRecovery::default()
            .recover("P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<")
            .unwrap();
        assert_eq!(recovered.surname, "ERIKSSON");
        assert_eq!(recovered.given_names, "ANNA MARIA");
    }

    #[test]
    fn test_splits_when_fillers_read_as_k() {
        let recovered = NameRecovery::default()
            .recover("P<UTOERIKSSONKKANNAKMARIAKKKKKKKKKKKKKKKKKKK")
            .unwrap();
        assert_eq!(recovered.surname, "ERIKSSON");
        assert_eq!(recovered.given_names, "ANNA MARIA");
    }

    #[test]
    fn test_double_consonant_prefix_is_not_a_separator() {
        let recovered = NameRecovery::default()
            .recover("P<GBRLLOYD<<OWEN<<<<<<<<<<<<<<<<<<<<<<<<<<<<")
            .unwrap();
        assert_eq!(recovered.surname, "LLOYD");
        assert_eq!(recovered.given_names, "OWEN");
    }

    #[test]
    fn test_compound_surname_keeps_single_fillers() {
        let recovered = NameRecovery::default()
            .recover("P<MEXDE<LA<CRUZ<<MARIA<INES<<<<<<<<<<<<<<<<<")
            .unwrap();
        assert_eq!(recovered.surname, "DE LA CRUZ");
        assert_eq!(recovered.given_names, "MARIA INES");
    }

    #[test]
    fn test_short_noise_tokens_are_dropped() {
        let recovered = NameRecovery::default()
            .recover("P<UTOERIKSSON<<ANNA<X<MARIA<<<<<<<<<<<<<<<<<")
            .unwrap();
        assert_eq!(recovered.given_names, "ANNA MARIA");
    }

    #[test]
    fn test_no_separator_yields_none() {
        assert_eq!(
            NameRecovery::default().recover("P<UTOABCDEFGHIJMNOPQRSTUVWXYZABCDEFGHIJMNOPQ"),
            None
        );
    }

    #[test]
    fn test_nothing_after_separator_yields_none() {
        assert_eq!(
            NameRecovery::default().recover("P<UTOERIKSSON<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<<"),
            None
        );
    }
}
