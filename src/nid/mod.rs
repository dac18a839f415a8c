//! Novel identifier (ncode) handling
//!
//! This module provides the identifier codec used to walk the site's novel space:
//! - Parsing and canonicalizing textual identifiers (`n0001a` -> `N0001AA`)
//! - The crawl ordering (suffix first, then number)
//! - An infinite, wrapping sequence of identifiers in either direction

mod sequence;
mod suffix;

pub use sequence::NidSequence;
pub use suffix::{decrement_suffix, increment_suffix};

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Leading letter shared by every identifier
pub const NID_PREFIX: char = 'N';

/// Largest value of the numeric field
pub const MAX_NUMBER: u16 = 9999;

/// Identifier construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NidError {
    #[error("Invalid nid: {0}")]
    InvalidFormat(String),
}

/// A canonical novel identifier: `N` + 4 digits + 2 uppercase letters
///
/// Ordering is suffix-major: `N0000AB` sorts after `N9999AA`. This is the order the
/// crawler walks the identifier space in, so it is not the natural string order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nid {
    number: u16,
    suffix: [u8; 2],
}

impl Nid {
    /// Parses an identifier, accepting lowercase input and the 6-character short form
    ///
    /// # Example
    ///
    /// ```
    /// use narou_crawl::nid::Nid;
    ///
    /// let nid = Nid::parse("n0001a").unwrap();
    /// assert_eq!(nid.to_string(), "N0001AA");
    /// ```
    pub fn parse(text: &str) -> Result<Self, NidError> {
        let invalid = || NidError::InvalidFormat(text.to_string());

        if !text.is_ascii() {
            return Err(invalid());
        }

        let mut id = text.to_ascii_uppercase().into_bytes();

        // N0000A -> N0000AA
        if id.len() == 6 {
            let last = id[5];
            id.push(last);
        }

        if id.len() != 7 || id[0] != NID_PREFIX as u8 {
            return Err(invalid());
        }

        let digits = &id[1..5];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(invalid());
        }

        let suffix = [id[5], id[6]];
        if !suffix.iter().all(u8::is_ascii_uppercase) {
            return Err(invalid());
        }

        let number = digits
            .iter()
            .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));

        Ok(Self { number, suffix })
    }

    pub(crate) fn from_parts(number: u16, suffix: [u8; 2]) -> Self {
        debug_assert!(number <= MAX_NUMBER);
        Self { number, suffix }
    }

    /// The 4-digit numeric field
    pub fn number(&self) -> u16 {
        self.number
    }

    /// The 2-letter suffix
    pub fn suffix(&self) -> &str {
        // Always two ASCII uppercase letters
        std::str::from_utf8(&self.suffix).unwrap_or("AA")
    }

    /// Lowercase form used in site URLs
    pub fn to_url_segment(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }

    /// Returns an endless sequence starting at (and including) this identifier
    pub fn sequence(self, reverse: bool) -> NidSequence {
        NidSequence::new(self, reverse)
    }
}

impl Ord for Nid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.suffix
            .cmp(&other.suffix)
            .then_with(|| self.number.cmp(&other.number))
    }
}

impl PartialOrd for Nid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Nid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}{}", NID_PREFIX, self.number, self.suffix())
    }
}

impl FromStr for Nid {
    type Err = NidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
