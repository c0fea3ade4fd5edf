use md5::{Digest, Md5};
use sha1::Sha1;

#[allow(non_snake_case)]
/// Hash algorithm identifiers used by the `Assembly` table
pub mod AssemblyHashAlgorithm {
    /// No hash algorithm
    pub const NONE: u32 = 0x0000;
    /// MD5
    pub const MD5: u32 = 0x8003;
    /// SHA1, the algorithm public key tokens are derived with
    pub const SHA1: u32 = 0x8004;
}

/// The strong name of an assembly.
///
/// Definitions carry the full public key, references usually only the token derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// The full public key
    PubKey(Vec<u8>),
    /// The 8-byte public key token, little-endian
    Token(u64),
}

impl Identity {
    /// Build an identity from the bytes stored in metadata.
    ///
    /// Returns `None` for an empty blob, or for a token blob that is not exactly 8 bytes.
    ///
    /// ## Arguments
    /// * `data`   - The public key or token bytes
    /// * `is_pub` - `true` if `data` holds a full public key
    #[must_use]
    pub fn from(data: &[u8], is_pub: bool) -> Option<Self> {
        if data.is_empty() {
            return None;
        }

        if is_pub {
            Some(Identity::PubKey(data.to_vec()))
        } else {
            let bytes: [u8; 8] = data.try_into().ok()?;
            Some(Identity::Token(u64::from_le_bytes(bytes)))
        }
    }

    /// The public key token: the last 8 bytes of the key's digest, read little-endian.
    ///
    /// `algo` selects MD5 when set to [`AssemblyHashAlgorithm::MD5`]; every other value uses SHA1.
    #[must_use]
    pub fn to_token(&self, algo: u32) -> u64 {
        match &self {
            Identity::PubKey(data) => {
                let digest = if algo == AssemblyHashAlgorithm::MD5 {
                    let mut hasher = Md5::new();
                    hasher.update(data);
                    hasher.finalize().to_vec()
                } else {
                    let mut hasher = Sha1::new();
                    hasher.update(data);
                    hasher.finalize().to_vec()
                };

                let mut tail = [0u8; 8];
                tail.copy_from_slice(&digest[digest.len() - 8..]);
                u64::from_le_bytes(tail)
            }
            Identity::Token(token) => *token,
        }
    }

    /// Returns `true` if both identities denote the same token
    #[must_use]
    pub fn matches(&self, other: &Identity) -> bool {
        self.to_token(AssemblyHashAlgorithm::SHA1) == other.to_token(AssemblyHashAlgorithm::SHA1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pubkey() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        assert_eq!(Identity::from(&data, true), Some(Identity::PubKey(data)));
    }

    #[test]
    fn from_token() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0];
        assert_eq!(
            Identity::from(&data, false),
            Some(Identity::Token(0xF0DEBC9A78563412))
        );
    }

    #[test]
    fn from_invalid() {
        assert_eq!(Identity::from(&[], true), None);
        assert_eq!(Identity::from(&[1, 2, 3], false), None);
    }

    #[test]
    fn token_from_sha1() {
        let key = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
        let identity = Identity::PubKey(key.clone());

        let mut hasher = Sha1::new();
        hasher.update(&key);
        let digest = hasher.finalize();
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&digest[12..20]);

        assert_eq!(
            identity.to_token(AssemblyHashAlgorithm::SHA1),
            u64::from_le_bytes(tail)
        );
    }

    #[test]
    fn token_from_md5_differs() {
        let identity = Identity::PubKey(vec![9; 32]);
        assert_ne!(
            identity.to_token(AssemblyHashAlgorithm::MD5),
            identity.to_token(AssemblyHashAlgorithm::SHA1)
        );
    }

    #[test]
    fn key_matches_own_token() {
        let key = Identity::PubKey(vec![7; 160]);
        let token = Identity::Token(key.to_token(AssemblyHashAlgorithm::SHA1));
        assert!(key.matches(&token));
        assert!(token.matches(&key));
        assert!(!token.matches(&Identity::Token(0)));
    }
}
