//! Two-letter suffix stepping
//!
//! The second letter moves first; the first letter only moves when the second
//! wraps around (`AZ` -> `BA`, `ZZ` -> `AA`, and back again for decrement).

fn increment_letter(letter: u8) -> u8 {
    if letter == b'Z' {
        b'A'
    } else {
        letter + 1
    }
}

fn decrement_letter(letter: u8) -> u8 {
    if letter == b'A' {
        b'Z'
    } else {
        letter - 1
    }
}

/// Steps a suffix forward by one
pub fn increment_suffix(suffix: [u8; 2]) -> [u8; 2] {
    if suffix[1] == b'Z' {
        [increment_letter(suffix[0]), b'A']
    } else {
        [suffix[0], increment_letter(suffix[1])]
    }
}

/// Steps a suffix backward by one
pub fn decrement_suffix(suffix: [u8; 2]) -> [u8; 2] {
    if suffix[1] == b'A' {
        [decrement_letter(suffix[0]), b'Z']
    } else {
        [suffix[0], decrement_letter(suffix[1])]
    }
}
