//! Decoded sensor readings.

use super::format::MAX_FIELDS;

/// Field values decoded from a single validated frame.
///
/// Values are kept in the order of the format's field layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    fields: [(&'static str, u32); MAX_FIELDS],
    len: usize,
}

impl Reading {
    pub(super) fn new() -> Self {
        Self {
            fields: [("", 0); MAX_FIELDS],
            len: 0,
        }
    }

    pub(super) fn push(&mut self, name: &'static str, value: u32) {
        self.fields[self.len] = (name, value);
        self.len += 1;
    }

    /// The value of a named field, if the format has one.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// The `distance` field, present in every known format.
    pub fn distance(&self) -> Option<u32> {
        self.get("distance")
    }

    /// Iterate over `(name, value)` pairs in layout order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.fields[..self.len].iter().copied()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
