//! Semantic checks applied to syntactic matches.
//!
//! Each validator is a pure predicate over the matched substring. Anything a
//! validator cannot parse is rejected, so an uncertain match is left in place
//! rather than reported as a redaction.

/// Predicate deciding whether a matched substring is real PII
pub type Validator = fn(&str) -> bool;

const CARD_MIN_DIGITS: usize = 13;
const CARD_MAX_DIGITS: usize = 19;

/// Luhn checksum over a card-like number, ignoring space and dash separators
pub fn luhn_valid(candidate: &str) -> bool {
    let mut digits = Vec::with_capacity(CARD_MAX_DIGITS);
    for c in candidate.chars() {
        match c {
            ' ' | '-' => continue,
            _ => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return false,
            },
        }
    }

    if !(CARD_MIN_DIGITS..=CARD_MAX_DIGITS).contains(&digits.len()) {
        return false;
    }

    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

/// Reject SSNs in ranges that are never assigned
///
/// Expects `AAA-GG-SSSS`. Area 000, 666 and 900-999, group 00 and serial
/// 0000 are invalid.
pub fn ssn_valid(candidate: &str) -> bool {
    let mut parts = candidate.split('-');
    let (Some(area), Some(group), Some(serial), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let well_formed = [(area, 3), (group, 2), (serial, 4)]
        .iter()
        .all(|(part, len)| part.len() == *len && part.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return false;
    }

    let (Ok(area), Ok(group), Ok(serial)) = (
        area.parse::<u16>(),
        group.parse::<u8>(),
        serial.parse::<u16>(),
    ) else {
        return false;
    };

    area != 0 && area != 666 && area < 900 && group != 0 && serial != 0
}
