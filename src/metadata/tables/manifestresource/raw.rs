use crate::metadata::{
    loader::LoaderContext,
    tables::{CodedIndex, ManifestResource, ManifestResourceRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `ManifestResource` row (ECMA-335 §II.22.24), heap indices unresolved
pub struct ManifestResourceRaw {
    /// Row identifier within the `ManifestResource` table
    pub rid: u32,
    /// Token of this row, `0x28??????`
    pub token: Token,
    /// Offset of an embedded resource within the resources directory
    pub offset: u32,
    /// `ManifestResourceAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub name: u32,
    /// `Implementation` coded index, null for embedded resources
    pub implementation: CodedIndex,
}

impl ManifestResourceRaw {
    /// Materialize a [`ManifestResource`] whose implementation and data load on first access
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> ManifestResourceRc {
        ManifestResource::materialized(ctx, self.rid, self.offset, self.flags, ctx.string(self.name))
    }
}
