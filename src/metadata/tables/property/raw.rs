use crate::metadata::{
    loader::LoaderContext,
    tables::{Property, PropertyRc},
    token::Token,
};

#[derive(Clone, Debug)]
/// Raw `Property` row (ECMA-335 §II.22.34), heap indices unresolved
pub struct PropertyRaw {
    /// Row identifier within the `Property` table
    pub rid: u32,
    /// Token of this row, `0x17??????`
    pub token: Token,
    /// `PropertyAttributes` bitmask
    pub flags: u32,
    /// Index into the string heap
    pub name: u32,
    /// Index into the blob heap
    pub signature: u32,
}

impl PropertyRaw {
    /// Materialize an unresolved [`Property`]
    pub(crate) fn to_owned(&self, ctx: &LoaderContext) -> PropertyRc {
        Property::materialized(ctx, self.rid, self.flags, ctx.string(self.name))
    }
}
