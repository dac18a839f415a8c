use crate::nid::suffix::{decrement_suffix, increment_suffix};
use crate::nid::{Nid, MAX_NUMBER};

/// Endless walk over the identifier space
///
/// Yields the current identifier, then moves the number by one. When the number
/// runs past `9999` (or below `0000`) it wraps and the suffix takes one step.
/// The iterator never ends; callers stop it themselves.
#[derive(Debug, Clone)]
pub struct NidSequence {
    next: Nid,
    reverse: bool,
}

impl NidSequence {
    pub fn new(start: Nid, reverse: bool) -> Self {
        Self {
            next: start,
            reverse,
        }
    }

    fn step(nid: Nid, reverse: bool) -> Nid {
        let (number, suffix) = (nid.number, nid.suffix);

        if reverse {
            if number == 0 {
                Nid::from_parts(MAX_NUMBER, decrement_suffix(suffix))
            } else {
                Nid::from_parts(number - 1, suffix)
            }
        } else if number == MAX_NUMBER {
            Nid::from_parts(0, increment_suffix(suffix))
        } else {
            Nid::from_parts(number + 1, suffix)
        }
    }
}

impl Iterator for NidSequence {
    type Item = Nid;

    fn next(&mut self) -> Option<Nid> {
        let current = self.next;
        self.next = Self::step(current, self.reverse);
        Some(current)
    }
}
