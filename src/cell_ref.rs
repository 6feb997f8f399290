//! Utilities for converting between spreadsheet-style addresses ("AA12") and
//! 1-based (row, col) pairs.
//!
//! Column labels use bijective base-26: there is no zero digit, so A=1, Z=26,
//! AA=27, ZZ=702, ZZZ=18278.

use crate::types::Address;

/// Convert a 1-based column index to its letter label (1 -> "A", 27 -> "AA").
///
/// Column 0 has no label and yields an empty string.
pub fn column_to_label(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = col;
    while n > 0 {
        n -= 1;
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Convert a column label to its 1-based index. Case-insensitive.
///
/// Returns `None` for an empty label, any non-letter character, or a label
/// too long to fit in `u32`.
pub fn label_to_column(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }
    let mut col: u32 = 0;
    for b in label.bytes() {
        if !b.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(b.to_ascii_uppercase() - b'A') + 1;
        col = col.checked_mul(26)?.checked_add(digit)?;
    }
    Some(col)
}

/// Parse an address of the form "one or more letters, one or more digits".
///
/// Surrounding whitespace is ignored; anything else that does not match the
/// grammar (including `$` anchors, sheet prefixes, or row 0) yields `None`.
pub fn parse_address(text: &str) -> Option<Address> {
    let text = text.trim();
    let split = text.find(|c: char| !c.is_ascii_alphabetic())?;
    let (letters, digits) = text.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let col = label_to_column(letters)?;
    let row: u32 = digits.parse().ok()?;
    Address::new(row, col)
}

/// Parse an address into 0-based (row, col), the form the layout layer uses.
pub fn parse_address_zero_based(text: &str) -> Option<(u32, u32)> {
    parse_address(text).map(Address::zero_based)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_label_boundaries() {
        assert_eq!(column_to_label(1), "A");
        assert_eq!(column_to_label(26), "Z");
        assert_eq!(column_to_label(27), "AA");
        assert_eq!(column_to_label(702), "ZZ");
        assert_eq!(column_to_label(703), "AAA");
        assert_eq!(column_to_label(18278), "ZZZ");
        assert_eq!(column_to_label(0), "");
    }

    #[test]
    fn test_label_overflow_is_none() {
        assert_eq!(label_to_column("ZZZZZZZZZZ"), None);
    }

    #[test]
    fn test_zero_based() {
        assert_eq!(parse_address_zero_based("A1"), Some((0, 0)));
        assert_eq!(parse_address_zero_based("C10"), Some((9, 2)));
    }
}
