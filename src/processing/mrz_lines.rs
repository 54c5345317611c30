use log::debug;

use crate::models::{is_mrz_char, FILLER, MRZ_LINE_LENGTH};

const RELAXED_MIN_LENGTH: usize = 38;
const RELAXED_MAX_LENGTH: usize = 46;

/// Picks the two MRZ candidate lines out of raw OCR text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneLineDetector;

impl ZoneLineDetector {
    pub fn new() -> Self {
        ZoneLineDetector
    }

    /// Returns up to two 44-character lines. An empty result means nothing
    /// plausible was found and the caller should retry with another strategy.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let lines: Vec<String> = text
            .lines()
            .map(|line| line.trim().to_uppercase())
            .filter(|line| !line.is_empty())
            .collect();

        let strict: Vec<String> = lines
            .iter()
            .filter(|line| line.chars().count() == MRZ_LINE_LENGTH && line.chars().all(is_mrz_char))
            .cloned()
            .collect();
        if strict.len() >= 2 {
            debug!("Strict MRZ match found {} line(s)", strict.len());
            return strict.into_iter().take(2).collect();
        }

        let relaxed: Vec<String> = lines
            .iter()
            .filter(|line| {
                let len = line.chars().count();
                (RELAXED_MIN_LENGTH..=RELAXED_MAX_LENGTH).contains(&len)
            })
            .map(|line| Self::normalize_line(line))
            .take(2)
            .collect();
        debug!("Relaxed MRZ match found {} line(s)", relaxed.len());
        relaxed
    }

    /// Maps stray characters to the filler and pads or truncates to 44.
    fn normalize_line(line: &str) -> String {
        let mut normalized: String = line
            .chars()
            .map(|c| if is_mrz_char(c) { c } else { FILLER })
            .take(MRZ_LINE_LENGTH)
            .collect();
        while normalized.chars().count() < MRZ_LINE_LENGTH {
            normalized.push(FILLER);
        }
        normalized
    }
}
