//! ICAO 9303 check digits and the O/0, I/1 correction search built on them.

const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Upper bound on ambiguous positions tried by [`correct_document_number`].
/// A 9-character field can never exceed it, so at most 512 candidates are checked.
pub const MAX_AMBIGUOUS_POSITIONS: usize = 9;

/// Numeric value of an MRZ character: filler 0, digits face value, A=10 .. Z=35.
pub fn char_value(c: char) -> u32 {
    match c {
        '0'..='9' => c as u32 - '0' as u32,
        'A'..='Z' => c as u32 - 55,
        _ => 0,
    }
}

pub fn compute_check_digit(field: &str) -> u32 {
    field
        .chars()
        .enumerate()
        .map(|(i, c)| char_value(c) * WEIGHTS[i % 3])
        .sum::<u32>()
        % 10
}

/// True if `check` is a digit equal to the checksum of `field`.
pub fn verify(field: &str, check: char) -> bool {
    check
        .to_digit(10)
        .map(|digit| digit == compute_check_digit(field))
        .unwrap_or(false)
}

fn swap_ambiguous(c: char) -> Option<char> {
    match c {
        'O' => Some('0'),
        '0' => Some('O'),
        'I' => Some('1'),
        '1' => Some('I'),
        _ => None,
    }
}

/// Tries every O/0 and I/1 combination of `field` until one reproduces `check`.
///
/// Returns the first matching candidate (the field itself when it already
/// verifies) or `None` when no combination matches or the field holds more
/// than [`MAX_AMBIGUOUS_POSITIONS`] ambiguous characters.
pub fn correct_document_number(field: &str, check: char) -> Option<String> {
    if verify(field, check) {
        return Some(field.to_string());
    }
    let chars: Vec<char> = field.chars().collect();
    let ambiguous: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, c)| swap_ambiguous(**c).is_some())
        .map(|(i, _)| i)
        .collect();
    if ambiguous.is_empty() || ambiguous.len() > MAX_AMBIGUOUS_POSITIONS {
        return None;
    }

    for mask in 1u32..(1u32 << ambiguous.len()) {
        let mut candidate = chars.clone();
        for (bit, &position) in ambiguous.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                if let Some(swapped) = swap_ambiguous(candidate[position]) {
                    candidate[position] = swapped;
                }
            }
        }
        let candidate: String = candidate.into_iter().collect();
        if verify(&candidate, check) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digit(field: &str) -> char {
        std::char::from_digit(compute_check_digit(field), 10).unwrap()
    }

    #[test]
    fn test_char_values() {
        assert_eq!(char_value('<'), 0);
        assert_eq!(char_value('7'), 7);
        assert_eq!(char_value('A'), 10);
        assert_eq!(char_value('Z'), 35);
    }

    #[test]
    fn test_icao_sample_check_digits() {
        assert_eq!(compute_check_digit("L898902C3"), 6);
        assert_eq!(compute_check_digit("740812"), 2);
        assert_eq!(compute_check_digit("120415"), 9);
        assert_eq!(compute_check_digit("ZE184226B<<<<<"), 1);
        // Composite: document number + check, birth date + check, expiry + check, optional + check.
        assert_eq!(compute_check_digit("L898902C3674081221204159ZE184226B<<<<<1"), 0);
    }

    #[test]
    fn test_checksum_self_consistency() {
        for field in ["L898902C3", "AB1234567", "X00000000", "ZZZZZZZZZ", "123<<<<<<"] {
            assert!(verify(field, digit(field)), "field {}", field);
        }
    }

    #[test]
    fn test_verify_rejects_non_digit() {
        assert!(!verify("L898902C3", '<'));
        assert!(!verify("L898902C3", '5'));
    }

    #[test]
    fn test_correction_restores_zero_read_as_o() {
        // True number C01X00T47, check digit computed from it.
        let check = digit("C01X00T47");
        let corrupted = "CO1XO0T47";
        assert_eq!(
            correct_document_number(corrupted, check),
            Some("C01X00T47".to_string())
        );
    }

    #[test]
    fn test_correction_restores_one_read_as_i() {
        let check = digit("A1B2C3D4E");
        assert_eq!(
            correct_document_number("AIB2C3D4E", check),
            Some("A1B2C3D4E".to_string())
        );
    }

    #[test]
    fn test_correction_gives_up_without_ambiguity() {
        assert_eq!(correct_document_number("ABCDEFGH2", '0'), None);
    }

    #[test]
    fn test_correction_keeps_failing_value() {
        // ABCDEFGH0 checks to 6, ABCDEFGHO to 0; nothing produces 3.
        assert_eq!(correct_document_number("ABCDEFGH0", '3'), None);
        assert_eq!(
            correct_document_number("ABCDEFGH0", '0'),
            Some("ABCDEFGHO".to_string())
        );
        assert_eq!(
            correct_document_number("ABCDEFGH0", '6'),
            Some("ABCDEFGH0".to_string())
        );
    }
}
