use std::sync::Arc;

use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion, Identity},
    streams::Name,
    tables::{AssemblyFlags, AssemblyRefRc, CustomAttributeList, TableId},
    token::Token,
};

/// A reference to another assembly
pub struct AssemblyRef {
    /// Row identifier, 0 when created in memory
    pub rid: u32,
    /// Token of this reference
    pub token: Token,
    /// Simple name of the referenced assembly
    pub name: Name,
    /// Requested version
    pub version: AssemblyVersion,
    /// Requested culture, `None` for culture-neutral
    pub culture: Option<String>,
    /// Public key or public key token, `None` if not strong named
    pub identifier: Option<Identity>,
    /// `AssemblyFlags` bitmask
    pub flags: u32,
    /// Hash of the referenced assembly, usually empty
    pub hash_value: Vec<u8>,
    /// Custom attributes applied to this reference
    pub custom_attributes: CustomAttributeList,
}

impl AssemblyRef {
    /// Create an assembly reference in memory from an identity
    #[must_use]
    pub fn new(identity: &AssemblyIdentity, flags: u32) -> AssemblyRefRc {
        let flags = match &identity.strong_name {
            Some(Identity::PubKey(_)) => flags | AssemblyFlags::PUBLIC_KEY,
            _ => flags & !AssemblyFlags::PUBLIC_KEY,
        };

        Arc::new(AssemblyRef {
            rid: 0,
            token: Token::from_parts(TableId::AssemblyRef, 0),
            name: Name::from(identity.name.as_str()),
            version: identity.version,
            culture: identity.culture.clone(),
            identifier: identity.strong_name.clone(),
            flags,
            hash_value: Vec::new(),
            custom_attributes: Arc::new(boxcar::Vec::new()),
        })
    }

    /// The identity a resolver has to satisfy
    #[must_use]
    pub fn identity(&self) -> AssemblyIdentity {
        AssemblyIdentity::new(
            self.name.to_string_lossy(),
            self.version,
            self.culture.clone(),
            self.identifier.clone(),
        )
    }

    /// Returns `true` if this references a Windows Runtime metadata file
    #[must_use]
    pub fn is_windows_runtime(&self) -> bool {
        self.flags & AssemblyFlags::CONTENT_TYPE_MASK == AssemblyFlags::WINDOWS_RUNTIME
    }
}

impl std::fmt::Debug for AssemblyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssemblyRef")
            .field("rid", &self.rid)
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_round_trip() {
        let identity = AssemblyIdentity::new(
            "System.Runtime",
            AssemblyVersion::new(4, 2, 1, 0),
            Some("en-US".to_string()),
            Some(Identity::Token(0xb03f_5f7f_11d5_0a3a)),
        );
        let reference = AssemblyRef::new(&identity, AssemblyFlags::PUBLIC_KEY);

        assert_eq!(reference.flags & AssemblyFlags::PUBLIC_KEY, 0);
        assert_eq!(reference.identity(), identity);
        assert!(!reference.is_windows_runtime());
    }

    #[test]
    fn windows_runtime_content_type() {
        let identity = AssemblyIdentity::new("Windows", AssemblyVersion::UNKNOWN, None, None);
        let reference = AssemblyRef::new(&identity, AssemblyFlags::WINDOWS_RUNTIME);
        assert!(reference.is_windows_runtime());
    }
}
