use std::sync::Arc;

use crate::metadata::{
    identity::{AssemblyVersion, Identity},
    loader::LoaderContext,
    tables::{AssemblyFlags, AssemblyRef, AssemblyRefRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `AssemblyRef` row (ECMA-335 §II.22.5), heap indices unresolved
pub struct AssemblyRefRaw {
    /// Row identifier within the `AssemblyRef` table
    pub rid: u32,
    /// Token of this row, `0x23??????`
    pub token: Token,
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
    /// Index into the blob heap, a public key or its token depending on `flags`
    pub public_key_or_token: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the string heap, 0 for culture-neutral
    pub culture: u32,
    /// Index into the blob heap
    pub hash_value: u32,
}

impl AssemblyRefRaw {
    /// Converts this row into an owned [`AssemblyRef`].
    ///
    /// An empty public key blob means the reference is not strong named.
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> AssemblyRefRc {
        let key = ctx.blob(self.public_key_or_token);
        let culture = ctx.string(self.culture);

        Arc::new(AssemblyRef {
            rid: self.rid,
            token: self.token,
            name: ctx.string(self.name),
            version: AssemblyVersion::new(
                self.major_version,
                self.minor_version,
                self.build_number,
                self.revision_number,
            ),
            culture: (!culture.is_empty()).then(|| culture.to_string_lossy()),
            identifier: Identity::from(&key, self.flags & AssemblyFlags::PUBLIC_KEY != 0),
            flags: self.flags,
            hash_value: ctx.blob(self.hash_value),
            custom_attributes: ctx.custom_attributes(self.token),
        })
    }
}
