use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion, Identity},
    loader::LoaderContext,
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `Assembly` row (ECMA-335 §II.22.2), heap indices unresolved
pub struct AssemblyRaw {
    /// Row identifier, always 1
    pub rid: u32,
    /// Token of this row, `0x20000001`
    pub token: Token,
    /// `AssemblyHashAlgorithm` of the manifest file hashes
    pub hash_alg_id: u32,
    /// Major version
    pub major_version: u16,
    /// Minor version
    pub minor_version: u16,
    /// Build number
    pub build_number: u16,
    /// Revision number
    pub revision_number: u16,
    /// `AssemblyFlags` bitmask
    pub flags: u32,
    /// Index into the blob heap, the full public key
    pub public_key: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the string heap, 0 for culture-neutral
    pub culture: u32,
}

impl AssemblyRaw {
    /// The identity described by this row; an empty key blob means not strong named
    pub(crate) fn identity(&self, ctx: &LoaderContext) -> AssemblyIdentity {
        let culture = ctx.string(self.culture);
        AssemblyIdentity::new(
            ctx.string(self.name).to_string_lossy(),
            AssemblyVersion::new(
                self.major_version,
                self.minor_version,
                self.build_number,
                self.revision_number,
            ),
            (!culture.is_empty()).then(|| culture.to_string_lossy()),
            Identity::from(&ctx.blob(self.public_key), true),
        )
    }
}
