use std::{fmt, fmt::Write, str::FromStr};

use crate::{
    metadata::identity::{AssemblyHashAlgorithm, Identity},
    Error, Result,
};

/// Complete identity of an assembly: simple name, version, culture and strong name.
///
/// Equality and hashing ignore the strong name, so an identity carrying a full public key and one
/// carrying the derived token compare equal.
#[derive(Debug, Clone)]
pub struct AssemblyIdentity {
    /// The simple name, e.g. `System.Runtime`
    pub name: String,
    /// The four-part version
    pub version: AssemblyVersion,
    /// The culture, `None` for culture-neutral assemblies
    pub culture: Option<String>,
    /// The strong name, if any
    pub strong_name: Option<Identity>,
}

impl PartialEq for AssemblyIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.version == other.version && self.culture == other.culture
    }
}

impl Eq for AssemblyIdentity {}

impl std::hash::Hash for AssemblyIdentity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.culture.hash(state);
    }
}

/// A four-part assembly version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version
    pub major: u16,
    /// Minor version
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyIdentity {
    /// Create a new identity.
    ///
    /// A culture of `"neutral"` or `""` is normalized to `None`.
    pub fn new(
        name: impl Into<String>,
        version: AssemblyVersion,
        culture: Option<String>,
        strong_name: Option<Identity>,
    ) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture: culture.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("neutral")),
            strong_name,
        }
    }

    /// Parse a display name such as
    /// `mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089`.
    ///
    /// Unknown components are ignored.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for an empty name, an invalid version or an invalid token.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut version = AssemblyVersion::UNKNOWN;
        let mut culture = None;
        let mut strong_name = None;

        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                culture = Some(value.to_string());
            } else if let Some(value) = part.strip_prefix("PublicKeyToken=") {
                if value != "null" && !value.is_empty() {
                    strong_name = Some(Identity::Token(parse_token(value)?));
                }
            }
        }

        Ok(Self::new(name, version, culture, strong_name))
    }

    /// Format the identity as a display name
    #[must_use]
    pub fn display_name(&self) -> String {
        let mut result = String::with_capacity(self.name.len() + 80);

        result.push_str(&self.name);
        let _ = write!(result, ", Version={}", self.version);
        let _ = write!(
            result,
            ", Culture={}",
            self.culture.as_deref().unwrap_or("neutral")
        );

        result.push_str(", PublicKeyToken=");
        match &self.strong_name {
            Some(identity) => {
                for byte in identity.to_token(AssemblyHashAlgorithm::SHA1).to_le_bytes() {
                    let _ = write!(result, "{:02x}", byte);
                }
            }
            None => result.push_str("null"),
        }

        result
    }

    /// Returns `true` if this (available) identity can stand in for `required`.
    ///
    /// Names compare case-insensitively, cultures must be equal and the version must be
    /// compatible (see [`AssemblyVersion::is_compatible_with`]). If both sides carry a strong
    /// name, the tokens must match.
    #[must_use]
    pub fn satisfies(&self, required: &AssemblyIdentity) -> bool {
        if !self.name.eq_ignore_ascii_case(&required.name) {
            return false;
        }

        let culture_matches = match (&self.culture, &required.culture) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        };
        if !culture_matches {
            return false;
        }

        if let (Some(have), Some(want)) = (&self.strong_name, &required.strong_name) {
            if !have.matches(want) {
                return false;
            }
        }

        self.version.is_compatible_with(&required.version)
    }
}

impl AssemblyVersion {
    /// Version `0.0.0.0`, used when no version was specified
    pub const UNKNOWN: Self = Self {
        major: 0,
        minor: 0,
        build: 0,
        revision: 0,
    };

    /// Create a new version
    #[must_use]
    pub const fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Returns `true` for `0.0.0.0`
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.build == 0 && self.revision == 0
    }

    /// An unknown requirement accepts any version, otherwise the major versions must match and
    /// this version must be at least the required one
    #[must_use]
    pub fn is_compatible_with(&self, required: &AssemblyVersion) -> bool {
        if required.is_unknown() {
            return true;
        }

        self.major == required.major && *self >= *required
    }

    /// Returns `true` if `self` is a better candidate for `target` than `other`
    #[must_use]
    pub fn is_closer_to(&self, other: &AssemblyVersion, target: &AssemblyVersion) -> bool {
        let self_same_major = self.major == target.major;
        let other_same_major = other.major == target.major;

        match (self_same_major, other_same_major) {
            (true, false) => true,
            (false, true) => false,
            (true, true) => self > other,
            (false, false) => {
                self.major.abs_diff(target.major) < other.major.abs_diff(target.major)
            }
        }
    }

    /// Parse a dotted version with one to four components
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if a component is not a 16-bit number or there are more than
    /// four components.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

fn parse_token(value: &str) -> Result<u64> {
    if value.len() != 16 || !value.is_ascii() {
        return Err(malformed_error!(
            "PublicKeyToken must be 16 hex characters, got '{}'",
            value
        ));
    }

    let mut bytes = [0u8; 8];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&value[i * 2..i * 2 + 2], 16)
            .map_err(|e| malformed_error!("Invalid hex in PublicKeyToken '{}': {}", value, e))?;
    }

    Ok(u64::from_le_bytes(bytes))
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for AssemblyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl FromStr for AssemblyIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
