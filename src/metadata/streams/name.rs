use std::{fmt, sync::Arc};

/// A metadata name.
///
/// Names are byte strings: the format stores UTF-8, but obfuscated or damaged modules routinely
/// carry bytes that are not valid text, and those must survive a read/edit/write cycle untouched.
/// Cloning is cheap, the bytes are shared.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(Arc<[u8]>);

impl Name {
    /// Create a name from raw bytes
    #[must_use]
    pub fn new(bytes: &[u8]) -> Self {
        Name(Arc::from(bytes))
    }

    /// The empty name
    #[must_use]
    pub fn empty() -> Self {
        Name::default()
    }

    /// The raw bytes of this name
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns `true` if the name has no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode as UTF-8, replacing invalid sequences
    #[must_use]
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// ASCII case-insensitive comparison, as used for module and assembly names
    #[must_use]
    pub fn eq_ignore_ascii_case(&self, other: &Name) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value.as_bytes())
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name(Arc::from(value.into_bytes()))
    }
}

impl From<&[u8]> for Name {
    fn from(value: &[u8]) -> Self {
        Name::new(value)
    }
}

impl From<Vec<u8>> for Name {
    fn from(value: Vec<u8>) -> Self {
        Name(Arc::from(value))
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        *self.0 == *other.as_bytes()
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        *self.0 == *other.as_bytes()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_with_str() {
        let name = Name::from("Console");
        assert_eq!(name, "Console");
        assert_ne!(name, "console");
        assert!(name.eq_ignore_ascii_case(&Name::from("CONSOLE")));
    }

    #[test]
    fn invalid_utf8_survives() {
        let bytes = [0x41, 0xFF, 0x42];
        let name = Name::new(&bytes);

        assert_eq!(name.as_bytes(), &bytes);
        assert_eq!(name.to_string_lossy(), "A\u{FFFD}B");
    }

    #[test]
    fn empty() {
        assert!(Name::empty().is_empty());
        assert_eq!(Name::empty(), Name::from(""));
    }
}
