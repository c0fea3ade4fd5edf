//! An in-memory `#Strings` heap.
//!
//! Identifiers are stored NUL-terminated and addressed by byte offset, offset 0 being the empty
//! string. Lookups return raw bytes as a [`Name`]; the heap does not require valid UTF-8.

use std::ffi::CStr;

use crate::metadata::streams::Name;

/// A growable string heap
#[derive(Debug, Clone)]
pub struct StringHeap {
    data: Vec<u8>,
}

impl Default for StringHeap {
    fn default() -> Self {
        StringHeap::new()
    }
}

impl StringHeap {
    /// Create a heap holding only the empty string at offset 0
    #[must_use]
    pub fn new() -> Self {
        StringHeap { data: vec![0] }
    }

    /// Append `value` and return its offset. The empty string always maps to offset 0.
    ///
    /// Bytes after an embedded NUL are not addressable and are dropped.
    pub fn add(&mut self, value: &[u8]) -> u32 {
        let value = value.split(|b| *b == 0).next().unwrap_or_default();
        if value.is_empty() {
            return 0;
        }

        #[allow(clippy::cast_possible_truncation)]
        let offset = self.data.len() as u32;
        self.data.extend_from_slice(value);
        self.data.push(0);
        offset
    }

    /// The name stored at `index`, `None` if the offset lies outside the heap or the string is
    /// not terminated
    #[must_use]
    pub fn get(&self, index: u32) -> Option<Name> {
        let start = index as usize;
        if start >= self.data.len() {
            return None;
        }

        CStr::from_bytes_until_nul(&self.data[start..])
            .ok()
            .map(|value| Name::new(value.to_bytes()))
    }

    /// The heap size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the heap only holds the empty string
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets() {
        let mut heap = StringHeap::new();
        let main = heap.add(b"<Main>$");
        let console = heap.add(b"System.Console");

        assert_eq!(main, 1);
        assert_eq!(console, 9);
        assert_eq!(heap.get(main).unwrap(), "<Main>$");
        assert_eq!(heap.get(console).unwrap(), "System.Console");
        // Suffix lookups are valid, the heap shares tails
        assert_eq!(heap.get(console + 7).unwrap(), "Console");
    }

    #[test]
    fn empty_and_out_of_bounds() {
        let mut heap = StringHeap::new();
        assert!(heap.is_empty());
        assert_eq!(heap.add(b""), 0);
        assert_eq!(heap.get(0).unwrap(), "");
        assert!(heap.get(100).is_none());
    }

    #[test]
    fn embedded_nul_truncates() {
        let mut heap = StringHeap::new();
        let index = heap.add(b"Ab\0cd");
        assert_eq!(heap.get(index).unwrap(), "Ab");
        assert_eq!(heap.len(), 4);
    }
}
